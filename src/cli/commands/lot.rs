use lot_core::{ReferenceStore, ReportingService};
use lot_domain::SlotStatus;

use crate::cli::core::{ensure_max_args, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{CommandEntry, CommandGroup};
use crate::cli::table::Table;

const BAR_WIDTH: usize = 30;

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "rates",
            CommandGroup::Lot,
            "Show hourly rates per vehicle type",
            "rates",
            cmd_rates,
        ),
        CommandEntry::new(
            "layout",
            CommandGroup::Lot,
            "Show the parking layout",
            "layout",
            cmd_layout,
        ),
        CommandEntry::new(
            "analytics",
            CommandGroup::Lot,
            "Summarise occupancy and revenue",
            "analytics",
            cmd_analytics,
        ),
    ]
}

fn cmd_rates(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    ensure_max_args(args, 0, "rates")?;
    let rates = &context.data.rates;
    if rates.is_empty() {
        io::print_warning(format!(
            "No rates configured. Add rows to {}.",
            context.data.store.paths().rates.display()
        ));
        return Ok(());
    }

    let mut table = Table::new(Some("Rent Rates"), &["Type", "Rate / hour"]);
    for entry in rates.entries() {
        table.add_row(vec![
            entry.category.to_string(),
            format!("{}{:.2}", context.currency(), entry.rate_per_hour),
        ]);
    }
    table.print();
    Ok(())
}

fn cmd_layout(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    ensure_max_args(args, 0, "layout")?;
    let layout = context.data.store.load_layout()?;
    if layout.is_empty() {
        io::print_info("No parking layout recorded.");
        return Ok(());
    }

    let mut table = Table::new(Some("Parking Layout"), &["Slot", "Status"]);
    for slot in &layout {
        table.add_row(vec![slot.slot_id.clone(), slot.status.to_string()]);
    }
    table.print();
    Ok(())
}

fn cmd_analytics(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    ensure_max_args(args, 0, "analytics")?;
    let layout = context.data.store.load_layout()?;
    let summary = ReportingService::summarize(&context.data.ledger, &layout);

    output_section("Parking Analytics");
    io::print_info(format!("Total Vehicles: {}", summary.total_vehicles));
    io::print_info(format!("Parked Now: {}", summary.open_sessions));
    io::print_info(format!("Occupied Slots: {}", summary.occupied_slots));
    io::print_info(format!("Vacant Slots: {}", summary.vacant_slots));
    io::print_info(format!(
        "Collected Revenue: {}{:.2}",
        context.currency(),
        summary.collected_revenue
    ));

    let counts = ReportingService::status_counts(&layout);
    if counts.is_empty() {
        return Ok(());
    }
    output_section("Slot Status");
    for line in status_bars(&counts) {
        io::print_info(line);
    }
    Ok(())
}

/// One text bar per status, scaled so the largest count fills the width.
fn status_bars(counts: &[(SlotStatus, usize)]) -> Vec<String> {
    let max = counts.iter().map(|(_, count)| *count).max().unwrap_or(0);
    let label_width = counts
        .iter()
        .map(|(status, _)| status.label().chars().count())
        .max()
        .unwrap_or(0);
    counts
        .iter()
        .map(|(status, count)| {
            let length = if max == 0 {
                0
            } else {
                (count * BAR_WIDTH).div_ceil(max)
            };
            format!(
                "{:<width$} | {} {}",
                status.label(),
                "#".repeat(length),
                count,
                width = label_width
            )
        })
        .collect()
}
