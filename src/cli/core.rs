//! Command dispatch, error reporting, and argument parsing helpers.

use std::io;

use strsim::levenshtein;
use thiserror::Error;

use lot_config::ConfigError;
use lot_core::CoreError;
use lot_domain::{parse_timestamp, Timestamp};

pub use crate::cli::shell_context::{CliMode, ShellContext};
pub use crate::errors::CliError;

use super::io as cli_io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

impl From<CliError> for CommandError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Core(inner) => CommandError::Core(inner),
            CliError::Config(inner) => CommandError::Config(inner),
            CliError::Command(message) => CommandError::Message(message),
        }
    }
}

impl From<CommandError> for CliError {
    fn from(err: CommandError) -> Self {
        CliError::Command(err.to_string())
    }
}

impl ShellContext {
    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn process_line(&mut self, line: &str) -> Result<LoopControl, CommandError> {
        let tokens = match crate::cli::shell::parse_command_line(line) {
            Ok(tokens) => tokens,
            Err(err) => {
                cli_io::print_warning(&err);
                return Ok(LoopControl::Continue);
            }
        };

        let Some(raw) = tokens.first() else {
            return Ok(LoopControl::Continue);
        };

        let command = raw.to_lowercase();
        let args: Vec<&str> = tokens.iter().skip(1).map(String::as_str).collect();
        self.last_command = Some(line.trim().to_string());

        match self.dispatch(&command, raw, &args) {
            Ok(LoopControl::Exit) => {
                self.running = false;
                Ok(LoopControl::Exit)
            }
            other => other,
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let needle = input.to_lowercase();
        let best = self
            .registry
            .names()
            .map(|key| (levenshtein(key, &needle), key))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, best)) = best {
            if distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", best));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, "Exit shell?", true)
    }

    /// Prints a command failure. The ledger is untouched by failed commands,
    /// so the shell always continues.
    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(message);
                cli_io::print_info("Use `help <command>` for usage details.");
            }
            other => cli_io::print_error(other.to_string()),
        }
    }
}

/// Returns the positional argument at `index` or an usage error.
pub(crate) fn required_arg<'a>(
    args: &[&'a str],
    index: usize,
    usage: &str,
) -> Result<&'a str, CommandError> {
    args.get(index)
        .copied()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {}", usage)))
}

/// Parses an optional `DD-MM-YYYY HH:MM` argument, falling back to `default`.
pub(crate) fn parse_time_arg(
    value: Option<&str>,
    default: Timestamp,
) -> Result<Timestamp, CommandError> {
    match value {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => Ok(parse_timestamp(raw).map_err(CoreError::from)?),
    }
}

/// Rejects trailing arguments past `max`.
pub(crate) fn ensure_max_args(args: &[&str], max: usize, usage: &str) -> CommandResult {
    if args.len() > max {
        Err(CommandError::InvalidArguments(format!("usage: {}", usage)))
    } else {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn process_script(
    home: &std::path::Path,
    clock: lot_core::FixedClock,
    lines: &[&str],
) -> Result<ShellContext, CliError> {
    let mut app = ShellContext::with_home(
        CliMode::Script,
        home.to_path_buf(),
        std::sync::Arc::new(clock),
    )?;
    for line in lines {
        match app.process_line(line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => app.report_error(err),
        }
    }
    Ok(app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use lot_core::FixedClock;
    use lot_domain::VehicleCategory;
    use rust_decimal_macros::dec;
    use std::fs;
    use tempfile::TempDir;

    fn clock() -> FixedClock {
        FixedClock(
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .and_then(|date| date.and_hms_opt(12, 30, 0))
                .expect("valid time"),
        )
    }

    fn seeded_home() -> TempDir {
        let home = TempDir::new().expect("temp home");
        let data = home.path().join("data");
        fs::create_dir_all(&data).expect("data dir");
        fs::write(
            data.join("rent_rates.csv"),
            "Type,RatePerHour\nCar,20.00\nBike,10.00\nTruck,50.00\n",
        )
        .expect("rates");
        fs::write(
            data.join("parking_layout.csv"),
            "Slot,Status\nA1,Occupied\nA2,Vacant\nA3,Vacant\n",
        )
        .expect("layout");
        home
    }

    #[test]
    fn entry_then_exit_bills_and_closes_the_session() {
        let home = seeded_home();
        let app = process_script(
            home.path(),
            clock(),
            &[
                r#"entry T-1 KA01AB1234 A1 Car "01-01-2024 10:00""#,
                "exit T-1",
            ],
        )
        .expect("script runs");

        assert!(app.data.ledger.find_open_by_token("T-1").is_none());
        let record = &app.data.ledger.records()[0];
        assert_eq!(record.rent, Some(dec!(50.00)));
        assert_eq!(record.exit_time, Some(clock().0));
        assert_eq!(record.category, VehicleCategory::Car);
    }

    #[test]
    fn failed_commands_leave_the_ledger_untouched() {
        let home = seeded_home();
        let app = process_script(
            home.path(),
            clock(),
            &[
                r#"entry T-1 KA01AB1234 A1 Car "01-01-2024 10:00""#,
                r#"entry T-1 KA02CD5678 A2 Bike"#,
                "exit T-404",
                r#"exit T-1 "01-01-2024 09:00""#,
                r#"entry T-2 KA02CD5678 A2 Bike "2024-01-01""#,
            ],
        )
        .expect("script runs");

        assert_eq!(app.data.ledger.len(), 1);
        assert!(app.data.ledger.find_open_by_token("T-1").is_some());
    }

    #[test]
    fn unknown_commands_do_not_stop_the_script() {
        let home = seeded_home();
        let app = process_script(
            home.path(),
            clock(),
            &["entyr T-1 X A1", "entry T-1 KA01AB1234 A1 Car"],
        )
        .expect("script runs");
        assert_eq!(app.data.ledger.len(), 1);
        assert_eq!(app.last_command.as_deref(), Some("entry T-1 KA01AB1234 A1 Car"));
        assert!(app.running);
    }

    #[test]
    fn quit_stops_processing_further_lines() {
        let home = seeded_home();
        let app = process_script(
            home.path(),
            clock(),
            &["quit", "entry T-1 KA01AB1234 A1 Car"],
        )
        .expect("script runs");
        assert!(!app.running);
        assert!(app.data.ledger.is_empty());
    }

    #[test]
    fn sessions_persist_between_shells() {
        let home = seeded_home();
        process_script(
            home.path(),
            clock(),
            &[r#"entry T-9 KA09ZZ0001 A3 Truck "01-01-2024 11:00""#],
        )
        .expect("first shell");

        let app = process_script(home.path(), clock(), &["exit T-9"]).expect("second shell");
        assert_eq!(app.data.ledger.records()[0].rent, Some(dec!(75.00)));
    }

    #[test]
    fn config_set_currency_is_saved() {
        let home = seeded_home();
        process_script(home.path(), clock(), &["config set currency $"]).expect("script");
        let app = process_script(home.path(), clock(), &[]).expect("reload");
        assert_eq!(app.currency(), "$");
    }

    #[test]
    fn unsaved_config_changes_keep_the_running_settings() {
        let home = seeded_home();
        let mut app = process_script(home.path(), clock(), &[]).expect("shell");
        // A directory in place of the config file makes every save fail.
        fs::create_dir_all(app.config_manager.config_path()).expect("block config file");

        for line in ["config set data_dir elsewhere", "config set classifier cat"] {
            let err = app.process_line(line).expect_err("save fails");
            assert!(matches!(err, CommandError::Config(_)));
        }

        assert_eq!(app.data.store.paths().root, home.path().join("data"));
        assert_eq!(app.data.rates.len(), 3);
        assert!(app.config.data_dir.is_none());
        assert!(app.config.classifier.command.is_none());
        assert!(!app.classifier.is_enabled());
    }

    #[test]
    fn time_argument_uses_the_fixed_format() {
        let fallback = clock().0;
        assert_eq!(parse_time_arg(None, fallback).expect("default"), fallback);
        let parsed = parse_time_arg(Some("01-01-2024 10:00"), fallback).expect("parsed");
        assert_eq!(parsed.format("%H:%M").to_string(), "10:00");
        assert!(matches!(
            parse_time_arg(Some("2024-01-01 10:00"), fallback),
            Err(CommandError::Core(CoreError::TimeFormat(_)))
        ));
    }
}
