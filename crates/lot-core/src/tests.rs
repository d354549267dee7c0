use lot_domain::{
    parse_timestamp, LayoutSlot, RateEntry, SlotStatus, Timestamp, VehicleCategory, VehicleRecord,
};
use rust_decimal_macros::dec;

use crate::{
    billing_service::RateTable,
    ledger_service::VehicleLedger,
    session_service::{NewEntry, SessionService},
    storage::MemoryVehicleStore,
    summary_service::ReportingService,
    CoreError,
};

fn ts(value: &str) -> Timestamp {
    parse_timestamp(value).expect("valid timestamp")
}

fn open_record(token: &str) -> VehicleRecord {
    VehicleRecord::new(
        token,
        "KA01AB1234",
        VehicleCategory::Car,
        ts("01-01-2024 10:00"),
        "A1",
    )
}

fn ledger_with_store() -> (VehicleLedger, MemoryVehicleStore) {
    let store = MemoryVehicleStore::new();
    let ledger = VehicleLedger::load(Box::new(store.clone())).expect("load ledger");
    (ledger, store)
}

fn rates() -> RateTable {
    RateTable::new(vec![
        RateEntry::new(VehicleCategory::Car, dec!(20.00)),
        RateEntry::new(VehicleCategory::Bike, dec!(10.00)),
    ])
    .expect("rates")
}

fn entry(token: &str, category: VehicleCategory) -> NewEntry {
    NewEntry {
        token: token.into(),
        license_number: "MH12XY0001".into(),
        category,
        entry_time: ts("01-01-2024 10:00"),
        slot: "B2".into(),
    }
}

#[test]
fn append_persists_the_whole_ledger() {
    let (mut ledger, store) = ledger_with_store();
    ledger.append(open_record("T1")).expect("append");
    ledger.append(open_record("T2")).expect("append");

    assert_eq!(ledger.len(), 2);
    assert_eq!(store.snapshot().len(), 2);
}

#[test]
fn append_rejects_empty_token() {
    let (mut ledger, store) = ledger_with_store();
    let err = ledger.append(open_record("   ")).unwrap_err();

    assert!(matches!(err, CoreError::Validation(_)));
    assert!(ledger.is_empty());
    assert!(store.snapshot().is_empty());
}

#[test]
fn append_rejects_duplicate_open_token() {
    let (mut ledger, _store) = ledger_with_store();
    ledger.append(open_record("T1")).expect("first append");

    let err = ledger.append(open_record(" T1 ")).unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
    assert_eq!(ledger.len(), 1);
}

#[test]
fn append_rejects_records_that_are_already_closed() {
    let (mut ledger, _store) = ledger_with_store();
    let mut record = open_record("T1");
    record.close(ts("01-01-2024 11:00"), dec!(20));

    assert!(matches!(
        ledger.append(record),
        Err(CoreError::Validation(_))
    ));
}

#[test]
fn token_can_be_reused_once_its_session_is_closed() {
    let (mut ledger, _store) = ledger_with_store();
    ledger.append(open_record("T1")).unwrap();
    ledger
        .close_session("T1", ts("01-01-2024 11:00"), dec!(20))
        .unwrap();

    ledger.append(open_record("T1")).expect("token free again");
    assert_eq!(ledger.history("T1").len(), 2);
    assert_eq!(ledger.open_sessions().count(), 1);
}

#[test]
fn close_session_round_trip() {
    let (mut ledger, store) = ledger_with_store();
    ledger.append(open_record("T1")).unwrap();
    let exit = ts("01-01-2024 12:30");

    let closed = ledger.close_session("T1", exit, dec!(50.00)).unwrap();
    assert_eq!(closed.exit_time, Some(exit));
    assert_eq!(closed.rent, Some(dec!(50.00)));

    assert!(ledger.find_open_by_token("T1").is_none());
    let stored = store.snapshot();
    assert_eq!(stored[0].exit_time, Some(exit));
}

#[test]
fn close_session_for_unknown_token_is_not_found() {
    let (mut ledger, store) = ledger_with_store();
    ledger.append(open_record("T1")).unwrap();
    let before = store.snapshot();

    let err = ledger
        .close_session("nope", ts("01-01-2024 12:00"), dec!(0))
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(token) if token == "nope"));
    assert_eq!(store.snapshot(), before);
    assert_eq!(ledger.records(), before.as_slice());
}

#[test]
fn close_session_rejects_exit_before_entry() {
    let (mut ledger, _store) = ledger_with_store();
    ledger.append(open_record("T1")).unwrap();

    let err = ledger
        .close_session("T1", ts("01-01-2024 09:59"), dec!(0))
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidInterval { .. }));
    assert!(ledger.find_open_by_token("T1").is_some());
}

#[test]
fn failed_persist_rolls_back_append_and_close() {
    let (mut ledger, store) = ledger_with_store();
    ledger.append(open_record("T1")).unwrap();
    store.set_fail_saves(true);

    assert!(matches!(
        ledger.append(open_record("T2")),
        Err(CoreError::Storage(_))
    ));
    assert_eq!(ledger.len(), 1);

    assert!(matches!(
        ledger.close_session("T1", ts("01-01-2024 11:00"), dec!(20)),
        Err(CoreError::Storage(_))
    ));
    assert!(ledger.find_open_by_token("T1").is_some());
}

#[test]
fn load_keeps_first_of_duplicate_open_tokens() {
    let mut second = open_record("T1");
    second.slot = "Z9".into();
    let store = MemoryVehicleStore::with_records(vec![open_record("T1"), second]);
    let ledger = VehicleLedger::load(Box::new(store)).expect("load");

    assert_eq!(ledger.find_open_by_token("T1").unwrap().slot, "A1");
    assert_eq!(crate::ledger_warnings(ledger.records()).len(), 1);
}

#[test]
fn check_out_bills_and_closes_the_session() {
    let (mut ledger, _store) = ledger_with_store();
    SessionService::check_in(&mut ledger, entry("T1", VehicleCategory::Car)).unwrap();

    let receipt =
        SessionService::check_out(&mut ledger, &rates(), "T1", ts("01-01-2024 12:30")).unwrap();
    assert_eq!(receipt.rent, dec!(50.00));
    assert_eq!(receipt.hours, dec!(2.5));
    assert_eq!(receipt.record.exit_time, Some(ts("01-01-2024 12:30")));
    assert!(ledger.find_open_by_token("T1").is_none());
}

#[test]
fn check_out_failures_leave_the_ledger_unchanged() {
    let (mut ledger, store) = ledger_with_store();
    SessionService::check_in(&mut ledger, entry("T1", VehicleCategory::Unknown)).unwrap();
    SessionService::check_in(&mut ledger, entry("T2", VehicleCategory::Bike)).unwrap();
    let before = store.snapshot();

    let unknown = SessionService::check_out(&mut ledger, &rates(), "T1", ts("01-01-2024 11:00"));
    assert!(matches!(unknown, Err(CoreError::UnknownCategory(_))));

    let early = SessionService::check_out(&mut ledger, &rates(), "T2", ts("31-12-2023 11:00"));
    assert!(matches!(early, Err(CoreError::InvalidInterval { .. })));

    let missing = SessionService::check_out(&mut ledger, &rates(), "T3", ts("01-01-2024 11:00"));
    assert!(matches!(missing, Err(CoreError::NotFound(_))));

    assert_eq!(store.snapshot(), before);
    assert_eq!(ledger.open_sessions().count(), 2);
}

#[test]
fn reporting_counts_ledger_and_layout_independently() {
    let (mut ledger, _store) = ledger_with_store();
    SessionService::check_in(&mut ledger, entry("T1", VehicleCategory::Car)).unwrap();
    SessionService::check_in(&mut ledger, entry("T2", VehicleCategory::Bike)).unwrap();
    SessionService::check_out(&mut ledger, &rates(), "T2", ts("01-01-2024 11:00")).unwrap();

    let layout = vec![
        LayoutSlot::new("A1", SlotStatus::Occupied),
        LayoutSlot::new("A2", SlotStatus::Vacant),
        LayoutSlot::new("A3", SlotStatus::Vacant),
        LayoutSlot::new("A4", SlotStatus::parse("Reserved")),
    ];
    let summary = ReportingService::summarize(&ledger, &layout);

    assert_eq!(summary.total_vehicles, 2);
    assert_eq!(summary.open_sessions, 1);
    assert_eq!(summary.occupied_slots, 1);
    assert_eq!(summary.vacant_slots, 2);
    assert_eq!(summary.collected_revenue, dec!(10.00));

    let counts = ReportingService::status_counts(&layout);
    assert_eq!(counts[0], (SlotStatus::Vacant, 2));
    assert_eq!(counts.len(), 3);
}

#[test]
fn stamps_with_seconds_are_rejected_so_reloads_match() {
    use chrono::Timelike;

    let (mut ledger, store) = ledger_with_store();
    let mut early = open_record("T1");
    early.entry_time = ts("01-01-2024 10:00").with_second(15).expect("second");
    assert!(matches!(
        ledger.append(early),
        Err(CoreError::Validation(_))
    ));
    assert!(ledger.is_empty());

    ledger.append(open_record("T1")).expect("append");
    let exit = ts("01-01-2024 12:30").with_second(45).expect("second");
    assert!(matches!(
        ledger.close_session("T1", exit, dec!(50.00)),
        Err(CoreError::Validation(_))
    ));
    assert!(ledger.find_open_by_token("T1").is_some());

    let exit = ts("01-01-2024 12:30");
    ledger.close_session("T1", exit, dec!(50.00)).expect("close");
    assert_eq!(store.snapshot()[0].exit_time, Some(exit));
}
