//! Shared runtime state for CLI interactions and command execution.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use dialoguer::theme::ColorfulTheme;

use lot_config::{Config, ConfigManager};
use lot_core::{ClassificationAdapter, Clock, RateTable, ReferenceStore, VehicleLedger};
use lot_domain::{Timestamp, VehicleCategory};
use lot_storage_csv::{CsvTableStore, TablePaths};

use super::{
    commands,
    output::{self, OutputPreferences},
    registry::CommandRegistry,
    system_clock::SystemClock,
};
use crate::{classifier::adapter_from_settings, errors::CliError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

/// Tables and services bound to one data directory.
pub struct LotData {
    pub store: CsvTableStore,
    pub ledger: VehicleLedger,
    pub rates: RateTable,
}

impl LotData {
    pub fn open(config: &Config, home: &Path) -> Result<Self, CliError> {
        let root = config.resolve_data_dir(home);
        let paths = TablePaths {
            vehicles: root.join(&config.tables.vehicles),
            rates: root.join(&config.tables.rates),
            layout: root.join(&config.tables.layout),
            ground_truth: root.join(&config.tables.ground_truth),
            root,
        };
        let store = CsvTableStore::new(paths)?;
        store.ensure_vehicle_table()?;
        let ledger = VehicleLedger::load(Box::new(store.clone()))?;
        let rates = RateTable::new(store.load_rates()?)?;
        tracing::debug!(
            root = %store.paths().root.display(),
            vehicles = ledger.len(),
            rates = rates.len(),
            "lot data opened"
        );
        Ok(Self {
            store,
            ledger,
            rates,
        })
    }
}

pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub home: PathBuf,
    pub config_manager: ConfigManager,
    pub config: Config,
    pub data: LotData,
    pub classifier: ClassificationAdapter,
    pub clock: Arc<dyn Clock>,
    /// Category from the most recent `detect`, offered as the entry default.
    pub suggested_category: Option<VehicleCategory>,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        Self::with_home(mode, Config::default_home(), Arc::new(SystemClock))
    }

    pub fn with_home(
        mode: CliMode,
        home: PathBuf,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, CliError> {
        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        let config_manager = ConfigManager::with_base_dir(&home)?;
        let config = config_manager.load()?;
        apply_output_preferences(&config, mode);

        let data = LotData::open(&config, &home)?;
        let classifier = adapter_from_settings(&config.classifier);

        Ok(ShellContext {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            home,
            config_manager,
            config,
            data,
            classifier,
            clock,
            suggested_category: None,
            last_command: None,
            running: true,
        })
    }

    pub fn mode(&self) -> CliMode {
        self.mode
    }

    pub fn theme(&self) -> &ColorfulTheme {
        &self.theme
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn currency(&self) -> &str {
        &self.config.currency_symbol
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn prompt(&self) -> String {
        format!("parking({} open)> ", self.data.ledger.open_sessions().count())
    }

    /// Opens the tables named by the current configuration without
    /// replacing the active ones.
    pub fn open_data(&self) -> Result<LotData, CliError> {
        LotData::open(&self.config, &self.home)
    }

    pub fn rebuild_classifier(&mut self) {
        self.classifier = adapter_from_settings(&self.config.classifier);
    }

    pub fn apply_output_preferences(&self) {
        apply_output_preferences(&self.config, self.mode);
    }
}

fn apply_output_preferences(config: &Config, mode: CliMode) {
    let color_enabled = config.ui_color_enabled && mode == CliMode::Interactive;
    output::set_preferences(OutputPreferences { color_enabled });
    colored::control::set_override(color_enabled);
}
