use lot_core::{CoreError, SessionService};
use lot_domain::{format_timestamp, Displayable, VehicleRecord};

use crate::cli::core::{
    ensure_max_args, parse_time_arg, required_arg, CliMode, CommandError, CommandResult,
    ShellContext,
};
use crate::cli::forms::{self, EntryDraft};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{CommandEntry, CommandGroup};
use crate::cli::table::Table;

const ENTRY_USAGE: &str = r#"entry <token> <license> <slot> [type] ["DD-MM-YYYY HH:MM"]"#;
const EXIT_USAGE: &str = r#"exit <token> ["DD-MM-YYYY HH:MM"]  (no token: leave the shell)"#;
const FIND_USAGE: &str = "find <token>";
const VEHICLES_USAGE: &str = "vehicles [open]";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new(
            "entry",
            CommandGroup::Sessions,
            "Record a vehicle entering the lot",
            ENTRY_USAGE,
            cmd_entry,
        ),
        CommandEntry::new(
            "exit",
            CommandGroup::Sessions,
            "Bill and close a parking session",
            EXIT_USAGE,
            cmd_exit,
        ),
        CommandEntry::new(
            "find",
            CommandGroup::Sessions,
            "Show the open session for a token",
            FIND_USAGE,
            cmd_find,
        ),
        CommandEntry::new(
            "vehicles",
            CommandGroup::Sessions,
            "List recorded vehicles",
            VEHICLES_USAGE,
            cmd_vehicles,
        ),
    ]
}

fn cmd_entry(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    ensure_max_args(args, 5, ENTRY_USAGE)?;
    let draft = EntryDraft::from_args(args)?;
    let entry = if draft.is_complete() || context.mode() == CliMode::Script {
        if !draft.is_complete() {
            return Err(CommandError::InvalidArguments(format!("usage: {ENTRY_USAGE}")));
        }
        draft.finish(context.suggested_category.as_ref(), context.now())?
    } else {
        forms::prompt_entry(context, draft)?
    };

    if !context.data.rates.contains(&entry.category) {
        io::print_warning(format!(
            "No hourly rate is configured for `{}`; billing will fail until one is added.",
            entry.category
        ));
    }

    let summary = format!(
        "Vehicle `{}` ({}) parked at slot {} since {}.",
        entry.token.trim(),
        entry.category,
        entry.slot.trim(),
        format_timestamp(&entry.entry_time)
    );
    SessionService::check_in(&mut context.data.ledger, entry)?;
    context.suggested_category = None;
    io::print_success(summary);
    Ok(())
}

fn cmd_exit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(token) = args.first().copied() else {
        return Err(CommandError::ExitRequested);
    };
    ensure_max_args(args, 2, EXIT_USAGE)?;
    let exit_time = parse_time_arg(args.get(1).copied(), context.now())?;

    let open = context
        .data
        .ledger
        .find_open_by_token(token)
        .cloned()
        .ok_or_else(|| CoreError::NotFound(token.trim().to_string()))?;
    print_record(&open, context.currency());

    let receipt =
        SessionService::check_out(&mut context.data.ledger, &context.data.rates, token, exit_time)?;
    io::print_info(format!("Exit Time: {}", format_timestamp(&exit_time)));
    io::print_info(format!("Hours Parked: {:.2}", receipt.hours));
    io::print_success(format!("Total Rent: {}{:.2}", context.currency(), receipt.rent));
    Ok(())
}

fn cmd_find(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let token = required_arg(args, 0, FIND_USAGE)?;
    ensure_max_args(args, 1, FIND_USAGE)?;
    let record = context
        .data
        .ledger
        .find_open_by_token(token)
        .ok_or_else(|| CoreError::NotFound(token.trim().to_string()))?;
    print_record(record, context.currency());

    let visits = context.data.ledger.history(token).len();
    if visits > 1 {
        io::print_info(format!("Previous visits: {}", visits - 1));
    }
    Ok(())
}

fn cmd_vehicles(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    ensure_max_args(args, 1, VEHICLES_USAGE)?;
    let open_only = match args.first() {
        None => false,
        Some(flag) if flag.eq_ignore_ascii_case("open") => true,
        Some(_) => {
            return Err(CommandError::InvalidArguments(format!(
                "usage: {VEHICLES_USAGE}"
            )))
        }
    };

    let ledger = &context.data.ledger;
    let records: Vec<&VehicleRecord> = if open_only {
        ledger.open_sessions().collect()
    } else {
        ledger.records().iter().collect()
    };
    if records.is_empty() {
        io::print_info("No vehicles recorded.");
        return Ok(());
    }

    let mut table = Table::new(
        None::<String>,
        &["Token", "License", "Type", "Slot", "Entry", "Exit", "Rent"],
    );
    for record in records {
        table.add_row(vec![
            record.token.clone(),
            record.license_number.clone(),
            record.category.to_string(),
            record.slot.clone(),
            format_timestamp(&record.entry_time),
            record
                .exit_time
                .as_ref()
                .map(format_timestamp)
                .unwrap_or_else(|| "-".into()),
            record
                .rent
                .map(|rent| format!("{}{:.2}", context.currency(), rent))
                .unwrap_or_else(|| "-".into()),
        ]);
    }
    output_section("Vehicles");
    table.print();
    Ok(())
}

fn print_record(record: &VehicleRecord, currency: &str) {
    output_section(record.display_label());
    io::print_info(format!("  License : {}", record.license_number));
    io::print_info(format!("  Type    : {}", record.category));
    io::print_info(format!("  Slot    : {}", record.slot));
    io::print_info(format!("  Entry   : {}", format_timestamp(&record.entry_time)));
    if let Some(exit) = &record.exit_time {
        io::print_info(format!("  Exit    : {}", format_timestamp(exit)));
    }
    if let Some(rent) = record.rent {
        io::print_info(format!("  Rent    : {}{:.2}", currency, rent));
    }
}
