//! lot-storage-csv
//!
//! Flat-file persistence: one CSV table per entity, header row first.
//! Saves rewrite the whole table through a temporary sibling file.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use chrono::NaiveDateTime;
use csv::{ReaderBuilder, Trim, WriterBuilder};
use lot_core::{CoreError, ReferenceStore, VehicleStore};
use lot_domain::{
    format_timestamp, parse_timestamp, GroundTruthEntry, LayoutSlot, RateEntry, SlotStatus,
    Timestamp, VehicleCategory, VehicleRecord,
};
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub const VEHICLES_FILE: &str = "vehicles.csv";
pub const RATES_FILE: &str = "rent_rates.csv";
pub const LAYOUT_FILE: &str = "parking_layout.csv";
pub const GROUND_TRUTH_FILE: &str = "ground_truth.csv";

const VEHICLE_HEADERS: [&str; 7] = [
    "Token",
    "LicenseNumber",
    "Type",
    "EntryTime",
    "ExitTime",
    "Slot",
    "Rent",
];
const TMP_SUFFIX: &str = "tmp";
/// Exit stamps written by older tooling, e.g. `2024-01-01 12:30:00`.
const LEGACY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Locations of the four tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePaths {
    /// Directory that relative image references are resolved against.
    pub root: PathBuf,
    pub vehicles: PathBuf,
    pub rates: PathBuf,
    pub layout: PathBuf,
    pub ground_truth: PathBuf,
}

impl TablePaths {
    /// Default file names inside `root`.
    pub fn in_dir(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            vehicles: root.join(VEHICLES_FILE),
            rates: root.join(RATES_FILE),
            layout: root.join(LAYOUT_FILE),
            ground_truth: root.join(GROUND_TRUTH_FILE),
            root,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct VehicleRow {
    token: String,
    license_number: String,
    #[serde(rename = "Type")]
    category: String,
    entry_time: String,
    #[serde(default)]
    exit_time: Option<String>,
    slot: String,
    #[serde(default)]
    rent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RateRow {
    #[serde(rename = "Type")]
    category: String,
    #[serde(rename = "RatePerHour")]
    rate_per_hour: String,
}

#[derive(Debug, Deserialize)]
struct LayoutRow {
    #[serde(rename = "Slot")]
    slot: String,
    #[serde(rename = "Status")]
    status: String,
}

#[derive(Debug, Deserialize)]
struct GroundTruthRow {
    #[serde(rename = "Image")]
    image: String,
    #[serde(rename = "Type")]
    label: String,
}

/// CSV-backed implementation of the storage traits.
#[derive(Debug, Clone)]
pub struct CsvTableStore {
    paths: TablePaths,
}

impl CsvTableStore {
    pub fn new(paths: TablePaths) -> Result<Self, CoreError> {
        fs::create_dir_all(&paths.root)?;
        Ok(Self { paths })
    }

    pub fn in_dir(root: impl Into<PathBuf>) -> Result<Self, CoreError> {
        Self::new(TablePaths::in_dir(root))
    }

    pub fn paths(&self) -> &TablePaths {
        &self.paths
    }

    /// Writes a header-only vehicles table if none exists yet.
    pub fn ensure_vehicle_table(&self) -> Result<(), CoreError> {
        if self.paths.vehicles.exists() {
            return Ok(());
        }
        self.save_vehicles(&[])
    }

    /// Resolves an image reference from the ground-truth table.
    pub fn resolve_image(&self, image: &str) -> PathBuf {
        let path = Path::new(image.trim());
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.paths.root.join(path)
        }
    }

    pub fn read_image(&self, image: &str) -> Result<Vec<u8>, CoreError> {
        let path = self.resolve_image(image);
        fs::read(&path)
            .map_err(|err| CoreError::Storage(format!("{}: {}", path.display(), err)))
    }
}

impl VehicleStore for CsvTableStore {
    fn load_vehicles(&self) -> Result<Vec<VehicleRecord>, CoreError> {
        let path = &self.paths.vehicles;
        read_rows::<VehicleRow>(path)?
            .into_iter()
            .map(|(line, row)| vehicle_from_row(row).map_err(|msg| row_error(path, line, msg)))
            .collect()
    }

    fn save_vehicles(&self, records: &[VehicleRecord]) -> Result<(), CoreError> {
        let path = &self.paths.vehicles;
        let tmp = tmp_path(path);
        {
            let mut writer = WriterBuilder::new()
                .has_headers(false)
                .from_path(&tmp)
                .map_err(|err| storage_error(&tmp, err))?;
            writer
                .write_record(VEHICLE_HEADERS)
                .map_err(|err| storage_error(&tmp, err))?;
            for record in records {
                writer
                    .serialize(vehicle_to_row(record))
                    .map_err(|err| storage_error(&tmp, err))?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, path)?;
        tracing::debug!(path = %path.display(), rows = records.len(), "vehicle table written");
        Ok(())
    }
}

impl ReferenceStore for CsvTableStore {
    fn load_rates(&self) -> Result<Vec<RateEntry>, CoreError> {
        let path = &self.paths.rates;
        read_rows::<RateRow>(path)?
            .into_iter()
            .map(|(line, row)| {
                let rate = Decimal::from_str(row.rate_per_hour.trim()).map_err(|_| {
                    row_error(
                        path,
                        line,
                        format!("invalid rate `{}`", row.rate_per_hour),
                    )
                })?;
                Ok(RateEntry::new(VehicleCategory::parse(&row.category), rate))
            })
            .collect()
    }

    fn load_layout(&self) -> Result<Vec<LayoutSlot>, CoreError> {
        Ok(read_rows::<LayoutRow>(&self.paths.layout)?
            .into_iter()
            .map(|(_, row)| LayoutSlot::new(row.slot, SlotStatus::parse(&row.status)))
            .collect())
    }

    fn load_ground_truth(&self) -> Result<Vec<GroundTruthEntry>, CoreError> {
        Ok(read_rows::<GroundTruthRow>(&self.paths.ground_truth)?
            .into_iter()
            .map(|(_, row)| GroundTruthEntry::new(row.image, VehicleCategory::parse(&row.label)))
            .collect())
    }
}

/// Reads every row of a table, tagging each with its 1-based file line.
/// A missing file is an empty table.
fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<(usize, T)>, CoreError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "table missing; treating as empty");
        return Ok(Vec::new());
    }
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_path(path)
        .map_err(|err| storage_error(path, err))?;

    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<T>().enumerate() {
        // +2: 1-indexed, plus the header row
        let line = idx + 2;
        let row = result.map_err(|err| row_error(path, line, err.to_string()))?;
        rows.push((line, row));
    }
    Ok(rows)
}

fn vehicle_from_row(row: VehicleRow) -> Result<VehicleRecord, String> {
    let entry_time = parse_stored_timestamp(&row.entry_time)?;
    let exit_time = match non_empty(row.exit_time) {
        Some(raw) => Some(parse_stored_timestamp(&raw)?),
        None => None,
    };
    let rent = match non_empty(row.rent) {
        Some(raw) => {
            Some(Decimal::from_str(&raw).map_err(|_| format!("invalid rent `{raw}`"))?)
        }
        None => None,
    };
    Ok(VehicleRecord {
        token: row.token,
        license_number: row.license_number,
        category: VehicleCategory::parse(&row.category),
        entry_time,
        exit_time,
        slot: row.slot,
        rent,
    })
}

fn vehicle_to_row(record: &VehicleRecord) -> VehicleRow {
    VehicleRow {
        token: record.token.clone(),
        license_number: record.license_number.clone(),
        category: record.category.to_string(),
        entry_time: format_timestamp(&record.entry_time),
        exit_time: record.exit_time.as_ref().map(format_timestamp),
        slot: record.slot.clone(),
        rent: record.rent.map(|rent| format!("{:.2}", rent)),
    }
}

fn parse_stored_timestamp(raw: &str) -> Result<Timestamp, String> {
    parse_timestamp(raw)
        .or_else(|err| {
            NaiveDateTime::parse_from_str(raw.trim(), LEGACY_TIMESTAMP_FORMAT).map_err(|_| err)
        })
        .map_err(|err| err.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

fn row_error(path: &Path, line: usize, message: impl std::fmt::Display) -> CoreError {
    CoreError::Storage(format!("{} line {}: {}", path.display(), line, message))
}

fn storage_error(path: &Path, err: csv::Error) -> CoreError {
    CoreError::Storage(format!("{}: {}", path.display(), err))
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}
