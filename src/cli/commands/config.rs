use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{CommandEntry, CommandGroup};

const USAGE: &str = "config [show | set <currency|color|data_dir|classifier|top_k> <value>]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        CommandGroup::System,
        "View and change shell preferences",
        USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match args.first().map(|value| value.to_lowercase()).as_deref() {
        None | Some("show") => show_config(context),
        Some("set") if args.len() >= 3 => {
            let value = args[2..].join(" ");
            set_config_value(context, args[1], &value)
        }
        _ => Err(CommandError::InvalidArguments(format!("usage: {USAGE}"))),
    }
}

fn show_config(context: &ShellContext) -> CommandResult {
    let rendered = serde_json::to_string_pretty(&context.config)
        .map_err(|err| CommandError::Message(err.to_string()))?;
    output_section("Configuration");
    io::print_info(format!(
        "  File      : {}",
        context.config_manager.config_path().display()
    ));
    io::print_info(format!(
        "  Data dir  : {}",
        context.data.store.paths().root.display()
    ));
    io::print_info(format!(
        "  Classifier: {}",
        if context.classifier.is_enabled() {
            "enabled"
        } else {
            "disabled"
        }
    ));
    io::print_info(rendered);
    Ok(())
}

/// Applies a change, saves the file, and only then swaps in whatever
/// depends on it. A change that cannot be opened or saved leaves the
/// running shell on its previous settings.
fn set_config_value(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let key = key.to_ascii_lowercase();
    let previous = context.config.clone();
    context.config.set(&key, value)?;

    let reopened = if key == "data_dir" {
        match context.open_data() {
            Ok(data) => Some(data),
            Err(err) => {
                context.config = previous;
                return Err(err.into());
            }
        }
    } else {
        None
    };

    if let Err(err) = context.config_manager.save(&context.config) {
        context.config = previous;
        return Err(err.into());
    }

    if let Some(data) = reopened {
        context.data = data;
    }
    match key.as_str() {
        "classifier" | "top_k" => context.rebuild_classifier(),
        "color" => context.apply_output_preferences(),
        _ => {}
    }
    tracing::info!(key = key.as_str(), "configuration updated");
    io::print_success(format!("Updated `{key}`."));
    Ok(())
}
