use serde::{Deserialize, Serialize};
use std::{
    env,
    path::{Path, PathBuf},
};

use crate::ConfigError;

/// Environment variable that overrides the application home directory.
pub const HOME_ENV: &str = "PARKING_CORE_HOME";
const DEFAULT_DIR_NAME: &str = ".parking_core";
const DATA_DIR: &str = "data";

/// Stores user-configurable CLI preferences and data locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional custom data directory. Defaults to `<home>/data`.
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub tables: TableFileNames,
    #[serde(default = "Config::default_currency_symbol")]
    pub currency_symbol: String,
    #[serde(default = "Config::default_ui_color_enabled")]
    pub ui_color_enabled: bool,
    #[serde(default)]
    pub classifier: ClassifierSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            tables: TableFileNames::default(),
            currency_symbol: Self::default_currency_symbol(),
            ui_color_enabled: Self::default_ui_color_enabled(),
            classifier: ClassifierSettings::default(),
        }
    }
}

impl Config {
    pub fn default_currency_symbol() -> String {
        "₹".into()
    }

    pub fn default_ui_color_enabled() -> bool {
        true
    }

    /// Application home: `$PARKING_CORE_HOME`, else `~/.parking_core`.
    pub fn default_home() -> PathBuf {
        if let Some(custom) = env::var_os(HOME_ENV) {
            return PathBuf::from(custom);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DIR_NAME)
    }

    pub fn resolve_data_dir(&self, home: &Path) -> PathBuf {
        match &self.data_dir {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => home.join(path),
            None => home.join(DATA_DIR),
        }
    }

    /// Keys accepted by [`Config::set`].
    pub const KEYS: [&'static str; 5] = ["currency", "color", "data_dir", "classifier", "top_k"];

    /// Applies a `config set <key> <value>` update.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match key.to_ascii_lowercase().as_str() {
            "currency" => {
                if value.is_empty() {
                    return Err(ConfigError::Invalid("currency symbol must not be empty".into()));
                }
                self.currency_symbol = value.to_string();
            }
            "color" => {
                self.ui_color_enabled = parse_switch(value)?;
            }
            "data_dir" => {
                self.data_dir = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "classifier" => {
                let mut parts = value.split_whitespace().map(str::to_string);
                self.classifier.command = parts.next();
                self.classifier.args = parts.collect();
            }
            "top_k" => {
                let parsed: usize = value
                    .parse()
                    .map_err(|_| ConfigError::Invalid(format!("top_k `{value}` is not a number")))?;
                if parsed == 0 {
                    return Err(ConfigError::Invalid("top_k must be at least 1".into()));
                }
                self.classifier.top_k = parsed;
            }
            other => {
                return Err(ConfigError::Invalid(format!(
                    "unknown key `{}` (expected one of: {})",
                    other,
                    Self::KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }
}

/// File names of the four tables inside the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableFileNames {
    pub vehicles: String,
    pub rates: String,
    pub layout: String,
    pub ground_truth: String,
}

impl Default for TableFileNames {
    fn default() -> Self {
        Self {
            vehicles: "vehicles.csv".into(),
            rates: "rent_rates.csv".into(),
            layout: "parking_layout.csv".into(),
            ground_truth: "ground_truth.csv".into(),
        }
    }
}

/// External image classifier invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierSettings {
    /// Program that reads image bytes on stdin and prints predictions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "ClassifierSettings::default_top_k")]
    pub top_k: usize,
}

impl ClassifierSettings {
    pub fn default_top_k() -> usize {
        3
    }
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            top_k: Self::default_top_k(),
        }
    }
}

fn parse_switch(value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        other => Err(ConfigError::Invalid(format!(
            "expected on/off, got `{other}`"
        ))),
    }
}
