use std::path::Path;

use lot_core::{AccuracyReport, AccuracyService, ReferenceStore};
use lot_domain::VehicleCategory;

use crate::cli::core::{ensure_max_args, required_arg, CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{CommandEntry, CommandGroup};
use crate::cli::table::Table;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "detect",
            CommandGroup::Classifier,
            "Classify a vehicle photo and suggest its type",
            "detect <image.jpg|jpeg|png>",
            cmd_detect,
        ),
        CommandEntry::new(
            "accuracy",
            CommandGroup::Classifier,
            "Score the classifier against the ground-truth table",
            "accuracy",
            cmd_accuracy,
        ),
    ]
}

fn cmd_detect(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    // A stale suggestion must never outlive a later detection attempt.
    context.suggested_category = None;
    let image = required_arg(args, 0, "detect <image>")?;
    ensure_max_args(args, 1, "detect <image>")?;
    if !has_image_extension(image) {
        return Err(CommandError::InvalidArguments(format!(
            "`{}` is not an image; expected one of: {}",
            image,
            IMAGE_EXTENSIONS.join(", ")
        )));
    }
    if !context.classifier.is_enabled() {
        io::print_warning("No classifier configured; set one with `config set classifier <command>`.");
    }

    let category = match std::fs::read(image) {
        Ok(bytes) => context.classifier.classify(&bytes),
        Err(err) => {
            tracing::warn!(image, error = %err, "image unreadable; detection degraded to Unknown");
            io::print_warning(format!("Cannot read `{}`: {}", image, err));
            VehicleCategory::Unknown
        }
    };
    io::print_success(format!("Detected Vehicle Type: {}", category));
    if !category.is_unknown() {
        io::print_info("The next `entry` will default to this type.");
        context.suggested_category = Some(category);
    }
    Ok(())
}

fn cmd_accuracy(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    ensure_max_args(args, 0, "accuracy")?;
    let entries = context.data.store.load_ground_truth()?;
    let store = &context.data.store;
    let report = AccuracyService::evaluate(&entries, &context.classifier, |image| {
        store.read_image(image)
    });
    print_report(&report);
    Ok(())
}

fn print_report(report: &AccuracyReport) {
    output_section("Classifier Accuracy");
    match report.accuracy_percent() {
        Some(percent) => io::print_success(format!(
            "Model Accuracy: {:.2}% ({} of {} images)",
            percent, report.correct, report.total
        )),
        None => io::print_info("Model Accuracy: n/a (ground truth table is empty)"),
    }
    if report.mismatches.is_empty() {
        return;
    }

    let mut table = Table::new(Some("Mismatches"), &["Image", "Expected", "Predicted", "Note"]);
    for mismatch in &report.mismatches {
        table.add_row(vec![
            mismatch.image.clone(),
            mismatch.expected.to_string(),
            mismatch.predicted.to_string(),
            mismatch.error.clone().unwrap_or_default(),
        ]);
    }
    table.print();
    if report.unreadable() > 0 {
        io::print_warning(format!("{} image(s) could not be read.", report.unreadable()));
    }
}

fn has_image_extension(path: &str) -> bool {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}
