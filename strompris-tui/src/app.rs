//! Application state: single-owner, main-thread only.
//!
//! All dashboard state lives here. The worker thread communicates via channels.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use strompris_core::config::StromprisConfig;
use strompris_core::data::RangeReport;
use strompris_core::stats::DailyMean;
use strompris_core::{Currency, Zone};

use crate::worker::{WorkerCommand, WorkerResponse};

/// Which panel is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Panel {
    Prices,
    Compare,
    Help,
}

impl Panel {
    pub const COUNT: usize = 3;

    pub fn index(self) -> usize {
        match self {
            Panel::Prices => 0,
            Panel::Compare => 1,
            Panel::Help => 2,
        }
    }

    pub fn from_index(i: usize) -> Option<Self> {
        match i {
            0 => Some(Panel::Prices),
            1 => Some(Panel::Compare),
            2 => Some(Panel::Help),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Panel::Prices => "Prices",
            Panel::Compare => "Compare",
            Panel::Help => "Help",
        }
    }

    pub fn next(self) -> Panel {
        Panel::from_index((self.index() + 1) % Self::COUNT).unwrap_or(Panel::Prices)
    }

    pub fn prev(self) -> Panel {
        Panel::from_index((self.index() + Self::COUNT - 1) % Self::COUNT).unwrap_or(Panel::Prices)
    }
}

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

/// The range currently on screen (or being loaded).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeRequest {
    pub zone: Zone,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Prices panel state.
#[derive(Debug, Default)]
pub struct PricesState {
    pub report: Option<Arc<RangeReport>>,
    /// Request sent to the worker and not yet answered.
    pub pending: Option<RangeRequest>,
    /// Whole-range failure (nothing loaded).
    pub error: Option<String>,
    /// Inline date validation message; nothing is fetched while set.
    pub validation: Option<String>,
}

/// Compare panel state: daily means from the dataset.
#[derive(Debug, Default)]
pub struct HistoryState {
    pub means: Vec<DailyMean>,
    pub loading: bool,
    pub loaded: bool,
    pub error: Option<String>,
}

pub struct AppState {
    pub active_panel: Panel,
    pub running: bool,
    pub zone: Zone,
    pub currency: Currency,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub today: NaiveDate,
    pub prices: PricesState,
    pub history: HistoryState,
    pub dataset_path: PathBuf,
    pub worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,
    pub status_message: Option<(String, StatusLevel)>,
}

impl AppState {
    pub fn new(
        worker_tx: Sender<WorkerCommand>,
        worker_rx: Receiver<WorkerResponse>,
        config: &StromprisConfig,
        today: NaiveDate,
    ) -> Self {
        let lookback = Duration::days(i64::from(config.dashboard.lookback_days));
        Self {
            active_panel: Panel::Prices,
            running: true,
            zone: config.dashboard.zone,
            currency: config.dashboard.currency,
            start: today - lookback,
            end: today,
            today,
            prices: PricesState::default(),
            history: HistoryState::default(),
            dataset_path: config.dataset.path.clone(),
            worker_tx,
            worker_rx,
            status_message: None,
        }
    }

    pub fn selection(&self) -> RangeRequest {
        RangeRequest {
            zone: self.zone,
            start: self.start,
            end: self.end,
        }
    }

    /// Ask the worker for the selected range.
    ///
    /// An inverted date range sets the inline validation message and sends
    /// nothing.
    pub fn request_range(&mut self) {
        if self.start > self.end {
            self.prices.validation = Some(format!(
                "Start date {} is after end date {}",
                self.start, self.end
            ));
            self.prices.pending = None;
            return;
        }
        self.prices.validation = None;

        let req = self.selection();
        if self.prices.pending == Some(req) {
            return;
        }
        let cmd = WorkerCommand::FetchRange {
            zone: req.zone,
            start: req.start,
            end: req.end,
        };
        if self.worker_tx.send(cmd).is_ok() {
            self.prices.pending = Some(req);
            self.prices.error = None;
            if self
                .prices
                .report
                .as_ref()
                .is_some_and(|r| (r.zone, r.start, r.end) != (req.zone, req.start, req.end))
            {
                self.prices.report = None;
            }
            self.set_status(format!(
                "Loading {} {} to {}...",
                req.zone, req.start, req.end
            ));
        } else {
            self.set_error("Worker is not running");
        }
    }

    /// Ask the worker to (re)load daily means from the dataset file.
    pub fn request_history(&mut self) {
        if self.history.loading {
            return;
        }
        let cmd = WorkerCommand::LoadHistory {
            path: self.dataset_path.clone(),
        };
        if self.worker_tx.send(cmd).is_ok() {
            self.history.loading = true;
        } else {
            self.set_error("Worker is not running");
        }
    }

    pub fn cycle_zone(&mut self, forward: bool) {
        self.zone = if forward { self.zone.next() } else { self.zone.prev() };
        self.request_range();
    }

    pub fn toggle_currency(&mut self) {
        self.currency = self.currency.toggle();
        self.set_status(format!("Showing prices in {}", self.currency));
    }

    pub fn shift_start(&mut self, days: i64) {
        self.start += Duration::days(days);
        self.request_range();
    }

    pub fn shift_end(&mut self, days: i64) {
        self.end += Duration::days(days);
        self.request_range();
    }

    pub fn reset_dates(&mut self) {
        self.start = self.today;
        self.end = self.today;
        self.request_range();
    }

    /// Apply a worker response. Answers for a selection the user has since
    /// moved away from are dropped.
    pub fn apply_response(&mut self, resp: WorkerResponse) {
        match resp {
            WorkerResponse::RangeLoaded { report } => {
                let req = RangeRequest {
                    zone: report.zone,
                    start: report.start,
                    end: report.end,
                };
                if self.prices.pending != Some(req) {
                    return;
                }
                self.prices.pending = None;
                self.prices.error = None;
                if report.is_complete() {
                    self.set_status(format!(
                        "Loaded {} intervals for {}",
                        report.series.len(),
                        report.zone
                    ));
                } else {
                    self.set_warning(format!(
                        "Loaded {} intervals, {} day(s) missing",
                        report.series.len(),
                        report.failures.len()
                    ));
                }
                self.prices.report = Some(report);
            }
            WorkerResponse::RangeFailed { request, error } => {
                if self.prices.pending != Some(request) {
                    return;
                }
                self.prices.pending = None;
                self.prices.report = None;
                self.set_error(error.to_string());
                self.prices.error = Some(error.to_string());
            }
            WorkerResponse::HistoryLoaded { means } => {
                self.history.loading = false;
                self.history.loaded = true;
                self.history.error = None;
                self.set_status(format!("Dataset: {} zone-days", means.len()));
                self.history.means = means;
            }
            WorkerResponse::HistoryFailed { error } => {
                self.history.loading = false;
                self.history.loaded = true;
                self.set_error(error.clone());
                self.history.error = Some(error);
            }
        }
    }

    /// Set an info status message.
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    /// Set a warning status message.
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Error));
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use std::sync::mpsc;
    use strompris_core::data::{AggregateError, DayFailure, RetrievalError};
    use strompris_core::{PriceRecord, PriceSeries};

    pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    pub fn test_app() -> (AppState, Receiver<WorkerCommand>, Sender<WorkerResponse>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let app = AppState::new(cmd_tx, resp_rx, &StromprisConfig::default(), d(2024, 3, 10));
        (app, cmd_rx, resp_tx)
    }

    pub fn report(
        zone: Zone,
        start: NaiveDate,
        end: NaiveDate,
        failed: &[NaiveDate],
    ) -> RangeReport {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let records = (0..24)
            .map(|h| {
                let t = offset.with_ymd_and_hms(2024, 3, 10, h, 0, 0).unwrap();
                PriceRecord {
                    zone,
                    time_start: t,
                    time_end: t + Duration::hours(1),
                    nok_per_kwh: 1.0 + f64::from(h) / 10.0,
                    eur_per_kwh: 0.1,
                    exchange_rate: None,
                }
            })
            .collect();
        RangeReport {
            zone,
            start,
            end,
            series: PriceSeries::new(records),
            failures: failed
                .iter()
                .map(|&date| DayFailure {
                    date,
                    zone,
                    error: RetrievalError::Status {
                        url: format!("https://example.test/{date}_{zone}.json"),
                        status: 404,
                    },
                })
                .collect(),
        }
    }

    #[test]
    fn panel_cycle() {
        assert_eq!(Panel::Prices.next(), Panel::Compare);
        assert_eq!(Panel::Help.next(), Panel::Prices);
        assert_eq!(Panel::Prices.prev(), Panel::Help);
        for i in 0..Panel::COUNT {
            assert_eq!(Panel::from_index(i).unwrap().index(), i);
        }
        assert!(Panel::from_index(Panel::COUNT).is_none());
    }

    #[test]
    fn initial_range_uses_lookback() {
        let (tx, _rx) = mpsc::channel();
        let (_tx2, rx2) = mpsc::channel();
        let mut config = StromprisConfig::default();
        config.dashboard.lookback_days = 2;
        config.dashboard.zone = Zone::No4;
        let app = AppState::new(tx, rx2, &config, d(2024, 3, 10));
        assert_eq!(app.start, d(2024, 3, 8));
        assert_eq!(app.end, d(2024, 3, 10));
        assert_eq!(app.zone, Zone::No4);
    }

    #[test]
    fn inverted_dates_show_validation_and_send_nothing() {
        let (mut app, cmd_rx, _resp_tx) = test_app();
        app.shift_start(1);
        assert!(app.prices.validation.as_deref().unwrap().contains("after end date"));
        assert!(cmd_rx.try_recv().is_err());

        app.shift_end(1);
        assert!(app.prices.validation.is_none());
        match cmd_rx.try_recv().unwrap() {
            WorkerCommand::FetchRange { start, end, .. } => {
                assert_eq!(start, d(2024, 3, 11));
                assert_eq!(end, d(2024, 3, 11));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn duplicate_request_is_not_resent() {
        let (mut app, cmd_rx, _resp_tx) = test_app();
        app.request_range();
        app.request_range();
        assert!(cmd_rx.try_recv().is_ok());
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn stale_response_is_dropped() {
        let (mut app, _cmd_rx, _resp_tx) = test_app();
        app.request_range();
        let old = report(Zone::No1, app.start, app.end, &[]);
        app.cycle_zone(true);
        app.apply_response(WorkerResponse::RangeLoaded {
            report: Arc::new(old),
        });
        assert!(app.prices.report.is_none());
        assert_eq!(app.prices.pending.map(|r| r.zone), Some(Zone::No2));
    }

    #[test]
    fn partial_report_is_shown_with_warning() {
        let (mut app, _cmd_rx, _resp_tx) = test_app();
        app.start = d(2024, 3, 9);
        app.request_range();
        let r = report(Zone::No1, app.start, app.end, &[d(2024, 3, 9)]);
        app.apply_response(WorkerResponse::RangeLoaded { report: Arc::new(r) });

        assert!(app.prices.pending.is_none());
        assert_eq!(app.prices.report.as_ref().unwrap().failures.len(), 1);
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Warning);
    }

    #[test]
    fn data_absent_is_shown_inline() {
        let (mut app, _cmd_rx, _resp_tx) = test_app();
        app.request_range();
        let request = app.selection();
        app.apply_response(WorkerResponse::RangeFailed {
            request,
            error: AggregateError::DataAbsent {
                zone: request.zone,
                start: request.start,
                end: request.end,
                failures: Vec::new(),
            },
        });
        assert!(app.prices.report.is_none());
        assert!(app.prices.error.as_deref().unwrap().contains("no price data"));
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Error);
    }

    #[test]
    fn new_selection_clears_previous_outcome() {
        let (mut app, _cmd_rx, _resp_tx) = test_app();
        app.request_range();
        let request = app.selection();
        app.apply_response(WorkerResponse::RangeFailed {
            request,
            error: AggregateError::DataAbsent {
                zone: request.zone,
                start: request.start,
                end: request.end,
                failures: Vec::new(),
            },
        });
        assert!(app.prices.error.is_some());

        app.cycle_zone(true);
        assert!(app.prices.error.is_none());
        assert_eq!(app.prices.pending.map(|r| r.zone), Some(Zone::No2));

        let loaded = report(Zone::No2, app.start, app.end, &[]);
        app.apply_response(WorkerResponse::RangeLoaded {
            report: Arc::new(loaded),
        });
        assert!(app.prices.report.is_some());

        // Reloading the same range keeps the chart until the answer arrives.
        app.prices.pending = None;
        app.request_range();
        assert!(app.prices.report.is_some());

        app.cycle_zone(true);
        assert!(app.prices.report.is_none());
    }

    #[test]
    fn currency_toggle_does_not_refetch() {
        let (mut app, cmd_rx, _resp_tx) = test_app();
        app.toggle_currency();
        assert_eq!(app.currency, Currency::Eur);
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn history_request_is_single_flight() {
        let (mut app, cmd_rx, _resp_tx) = test_app();
        app.request_history();
        app.request_history();
        assert!(matches!(cmd_rx.try_recv(), Ok(WorkerCommand::LoadHistory { .. })));
        assert!(cmd_rx.try_recv().is_err());

        app.apply_response(WorkerResponse::HistoryFailed {
            error: "boom".into(),
        });
        assert!(!app.history.loading);
        assert_eq!(app.history.error.as_deref(), Some("boom"));
    }
}
