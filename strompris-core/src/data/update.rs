//! Dataset updater: fetch one day for every zone and append it to the dataset.

use super::dataset::{DatasetError, DatasetStore};
use super::provider::{PriceSource, RetrievalError};
use crate::domain::Zone;
use chrono::NaiveDate;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Progress callback for the per-zone update loop.
pub trait UpdateProgress {
    /// Called before fetching a zone.
    fn on_start(&self, zone: Zone, index: usize, total: usize);

    /// Called when a zone has been fetched and appended (or failed).
    fn on_complete(&self, zone: Zone, result: &Result<usize, UpdateError>);

    /// Called once after the last zone.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Progress reporter that prints to stdout.
pub struct StdoutProgress;

impl UpdateProgress for StdoutProgress {
    fn on_start(&self, zone: Zone, index: usize, total: usize) {
        println!("[{}/{}] Fetching {}...", index + 1, total, zone.label());
    }

    fn on_complete(&self, zone: Zone, result: &Result<usize, UpdateError>) {
        match result {
            Ok(rows) => println!("  OK: {zone} ({rows} rows appended)"),
            Err(e) => println!("  FAIL: {zone}: {e}"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        println!("\nUpdate complete: {succeeded}/{total} zones succeeded, {failed} failed");
    }
}

/// Reporter that stays silent.
pub struct NoProgress;

impl UpdateProgress for NoProgress {
    fn on_start(&self, _zone: Zone, _index: usize, _total: usize) {}
    fn on_complete(&self, _zone: Zone, _result: &Result<usize, UpdateError>) {}
    fn on_batch_complete(&self, _succeeded: usize, _failed: usize, _total: usize) {}
}

/// Per-zone outcome of an update run.
#[derive(Debug)]
pub struct UpdateSummary {
    pub date: NaiveDate,
    pub total: usize,
    pub rows_appended: usize,
    pub succeeded: Vec<(Zone, usize)>,
    pub errors: Vec<(Zone, UpdateError)>,
}

impl UpdateSummary {
    pub fn all_succeeded(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn failed(&self) -> usize {
        self.errors.len()
    }
}

/// Fetch `date` for each zone and append each successful day to `store`.
///
/// A zone that fails (fetch or write) is recorded and the loop moves on.
pub fn update_dataset(
    source: &dyn PriceSource,
    store: &DatasetStore,
    date: NaiveDate,
    zones: &[Zone],
    progress: &dyn UpdateProgress,
) -> UpdateSummary {
    let total = zones.len();
    let mut succeeded = Vec::new();
    let mut errors = Vec::new();

    for (i, &zone) in zones.iter().enumerate() {
        progress.on_start(zone, i, total);

        let result = update_zone(source, store, date, zone);
        progress.on_complete(zone, &result);

        match result {
            Ok(rows) => {
                info!(%zone, %date, rows, "appended day to dataset");
                succeeded.push((zone, rows));
            }
            Err(e) => {
                warn!(%zone, %date, error = %e, "zone update failed");
                errors.push((zone, e));
            }
        }
    }

    progress.on_batch_complete(succeeded.len(), errors.len(), total);

    UpdateSummary {
        date,
        total,
        rows_appended: succeeded.iter().map(|(_, rows)| rows).sum(),
        succeeded,
        errors,
    }
}

fn update_zone(
    source: &dyn PriceSource,
    store: &DatasetStore,
    date: NaiveDate,
    zone: Zone,
) -> Result<usize, UpdateError> {
    let series = source.fetch_day(date, zone)?;
    Ok(store.append(series.records())?)
}
