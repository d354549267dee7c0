use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::{CommandEntry, CommandGroup, CommandRegistry};

pub fn print_overview(registry: &CommandRegistry) {
    output_section("Available commands");
    for group in CommandGroup::ALL {
        let entries: Vec<&CommandEntry> = registry.in_group(group).collect();
        if entries.is_empty() {
            continue;
        }
        io::print_info(format!("{}:", group.title()));
        for entry in entries {
            io::print_info(format!("  {:<10} {}", entry.name, entry.description));
        }
    }
    io::print_info("Use `help <command>` for details. Quote times: \"DD-MM-YYYY HH:MM\".");
}

pub fn print_command(entry: &CommandEntry) {
    output_section(format!("Help: {}", entry.name));
    io::print_info(format!("  Description: {}", entry.description));
    io::print_info(format!("  Usage: {}", entry.usage));
}
