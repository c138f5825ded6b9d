//! Dataset updater: one day for every zone, appended to a CSV file.

mod common;

use common::{date, day_records, MockSource};
use std::cell::RefCell;
use strompris_core::data::{
    update_dataset, DatasetStore, NoProgress, UpdateError, UpdateProgress,
};
use strompris_core::Zone;

#[derive(Default)]
struct RecordingProgress {
    events: RefCell<Vec<String>>,
}

impl UpdateProgress for RecordingProgress {
    fn on_start(&self, zone: Zone, index: usize, total: usize) {
        self.events
            .borrow_mut()
            .push(format!("start {zone} {}/{total}", index + 1));
    }

    fn on_complete(&self, zone: Zone, result: &Result<usize, UpdateError>) {
        let outcome = match result {
            Ok(rows) => format!("ok {rows}"),
            Err(_) => "fail".to_string(),
        };
        self.events.borrow_mut().push(format!("done {zone} {outcome}"));
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        self.events
            .borrow_mut()
            .push(format!("batch {succeeded}/{total} failed={failed}"));
    }
}

fn all_zones_except(day: chrono::NaiveDate, missing: Zone) -> MockSource {
    Zone::ALL
        .iter()
        .filter(|z| **z != missing)
        .fold(MockSource::new(), |src, &zone| {
            src.with_day(day, zone, day_records(zone, day, 24, 1.0))
        })
}

#[test]
fn failing_zone_does_not_block_the_others() {
    let dir = tempfile::tempdir().unwrap();
    let store = DatasetStore::new(dir.path().join("strompriser_dataset.csv"));
    let day = date(2024, 1, 15);
    let source = all_zones_except(day, Zone::No3);

    let summary = update_dataset(&source, &store, day, &Zone::ALL, &NoProgress);

    assert_eq!(summary.date, day);
    assert_eq!(summary.total, 5);
    assert_eq!(summary.failed(), 1);
    assert!(!summary.all_succeeded());
    assert_eq!(summary.rows_appended, 96);
    assert_eq!(summary.errors[0].0, Zone::No3);
    assert!(matches!(summary.errors[0].1, UpdateError::Retrieval(_)));

    let rows = store.load().unwrap();
    assert_eq!(rows.len(), 96);
    assert!(rows.iter().all(|r| r.zone != Zone::No3));
    // Rows land in zone order, each zone's day in time order.
    assert_eq!(rows[0].zone, Zone::No1);
    assert_eq!(rows[24].zone, Zone::No2);
    assert_eq!(rows[48].zone, Zone::No4);
    assert_eq!(rows[72].zone, Zone::No5);
}

#[test]
fn repeated_updates_append_without_repeating_header() {
    let dir = tempfile::tempdir().unwrap();
    let store = DatasetStore::new(dir.path().join("prices.csv"));
    let day1 = date(2024, 1, 1);
    let day2 = date(2024, 1, 2);
    let source = Zone::ALL.iter().fold(MockSource::new(), |src, &zone| {
        src.with_day(day1, zone, day_records(zone, day1, 24, 1.0))
            .with_day(day2, zone, day_records(zone, day2, 24, 2.0))
    });

    let first = update_dataset(&source, &store, day1, &Zone::ALL, &NoProgress);
    let second = update_dataset(&source, &store, day2, &Zone::ALL, &NoProgress);
    assert!(first.all_succeeded());
    assert!(second.all_succeeded());

    let text = std::fs::read_to_string(store.path()).unwrap();
    assert_eq!(text.matches("zone,time_start").count(), 1);
    assert_eq!(store.load().unwrap().len(), 240);

    let status = store.status().unwrap();
    assert_eq!(status.zones.len(), 5);
    assert!(status.zones.iter().all(|z| z.rows == 48));
}

#[test]
fn progress_sees_every_zone() {
    let dir = tempfile::tempdir().unwrap();
    let store = DatasetStore::new(dir.path().join("prices.csv"));
    let day = date(2024, 1, 15);
    let source = all_zones_except(day, Zone::No5);
    let progress = RecordingProgress::default();

    update_dataset(&source, &store, day, &[Zone::No4, Zone::No5], &progress);

    assert_eq!(
        progress.events.into_inner(),
        vec![
            "start NO4 1/2",
            "done NO4 ok 24",
            "start NO5 2/2",
            "done NO5 fail",
            "batch 1/2 failed=1",
        ]
    );
}

#[test]
fn unwritable_dataset_is_a_per_zone_error() {
    let dir = tempfile::tempdir().unwrap();
    // A directory where the file should be.
    let store = DatasetStore::new(dir.path());
    let day = date(2024, 1, 15);
    let source = all_zones_except(day, Zone::No2);

    let summary = update_dataset(&source, &store, day, &[Zone::No1], &NoProgress);
    assert_eq!(summary.failed(), 1);
    assert!(matches!(summary.errors[0].1, UpdateError::Dataset(_)));
}
