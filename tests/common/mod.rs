#![allow(dead_code)]

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub const RATES_CSV: &str = "Type,RatePerHour\nCar,20.00\nBike,10.00\nTruck,50.00\n";
pub const LAYOUT_CSV: &str = "Slot,Status\nA1,Occupied\nA2,Vacant\nA3,Vacant\n";

/// Creates an isolated application home with rates and layout seeded under
/// `<home>/data`.
pub fn seeded_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let home = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let data = data_dir(&home);
    fs::create_dir_all(&data).expect("create data dir");
    fs::write(data.join("rent_rates.csv"), RATES_CSV).expect("write rates");
    fs::write(data.join("parking_layout.csv"), LAYOUT_CSV).expect("write layout");
    home
}

pub fn data_dir(home: &Path) -> PathBuf {
    home.join("data")
}

pub fn read_vehicles(home: &Path) -> String {
    fs::read_to_string(data_dir(home).join("vehicles.csv")).expect("read vehicles table")
}
