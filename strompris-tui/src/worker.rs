//! Background worker thread: all network and file I/O runs here.
//!
//! The worker owns the range aggregator (and with it the range cache), so
//! repeated selections are answered without touching the network.
//! Communication with the main thread is via `mpsc` channels.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use chrono::NaiveDate;
use tracing::{debug, info};

use strompris_core::data::{
    AggregateError, DatasetStore, PriceSource, RangeAggregator, RangeReport,
};
use strompris_core::stats::{daily_means, DailyMean};
use strompris_core::Zone;

use crate::app::RangeRequest;

/// Commands sent from the UI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    FetchRange {
        zone: Zone,
        start: NaiveDate,
        end: NaiveDate,
    },
    LoadHistory {
        path: PathBuf,
    },
    Shutdown,
}

/// Responses sent from the worker back to the UI.
#[derive(Debug)]
pub enum WorkerResponse {
    RangeLoaded {
        report: Arc<RangeReport>,
    },
    RangeFailed {
        request: RangeRequest,
        error: AggregateError,
    },
    HistoryLoaded {
        means: Vec<DailyMean>,
    },
    HistoryFailed {
        error: String,
    },
}

pub type DashboardAggregator = RangeAggregator<Box<dyn PriceSource>>;

/// Spawn the background worker thread.
pub fn spawn_worker(
    aggregator: DashboardAggregator,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("strompris-worker".into())
        .spawn(move || worker_loop(aggregator, rx, tx))
}

fn worker_loop(
    mut aggregator: DashboardAggregator,
    rx: Receiver<WorkerCommand>,
    tx: Sender<WorkerResponse>,
) {
    info!(source = aggregator.source().name(), "worker started");
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(cmd) => {
                let Some(resp) = handle_command(&mut aggregator, cmd) else {
                    continue;
                };
                if tx.send(resp).is_err() {
                    break;
                }
            }
        }
    }
    info!(cached = aggregator.cached_ranges(), "worker stopped");
}

fn handle_command(
    aggregator: &mut DashboardAggregator,
    cmd: WorkerCommand,
) -> Option<WorkerResponse> {
    let resp = match cmd {
        WorkerCommand::FetchRange { zone, start, end } => {
            debug!(%zone, %start, %end, "fetch range");
            match aggregator.fetch_range(start, end, zone) {
                Ok(report) => WorkerResponse::RangeLoaded { report },
                Err(error) => WorkerResponse::RangeFailed {
                    request: RangeRequest { zone, start, end },
                    error,
                },
            }
        }
        WorkerCommand::LoadHistory { path } => load_history(path),
        WorkerCommand::Shutdown => return None, // handled in loop
    };
    Some(resp)
}

fn load_history(path: PathBuf) -> WorkerResponse {
    let store = DatasetStore::new(path);
    match store.load() {
        Ok(records) => WorkerResponse::HistoryLoaded {
            means: daily_means(&records),
        },
        Err(e) => WorkerResponse::HistoryFailed {
            error: format!("{}: {e}", store.path().display()),
        },
    }
}
