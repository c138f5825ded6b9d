//! Range aggregation: one fetch per calendar day, merged into one series.
//!
//! A failing day is recorded and skipped; the rest of the range still
//! loads ("render with gaps"). Only a range where nothing loaded is an
//! error, and it is reported as [`AggregateError::DataAbsent`] rather than
//! as an empty series.
//!
//! Results are memoized per aggregator instance, keyed by (zone, start, end).
//! A report is memoized only when it is complete and lies entirely before
//! today: past days do not change, today's prices can.

use super::provider::{DayFailure, PriceSource};
use crate::domain::{PriceSeries, Zone};
use chrono::{Local, NaiveDate};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AggregateError {
    #[error("start date {start} is after end date {end}")]
    Validation { start: NaiveDate, end: NaiveDate },

    #[error("no price data for {zone} from {start} to {end} ({} day(s) failed)", failures.len())]
    DataAbsent {
        zone: Zone,
        start: NaiveDate,
        end: NaiveDate,
        failures: Vec<DayFailure>,
    },
}

/// Merged series for one zone and date range, plus the days that failed.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeReport {
    pub zone: Zone,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub series: PriceSeries,
    pub failures: Vec<DayFailure>,
}

impl RangeReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed_dates(&self) -> Vec<NaiveDate> {
        self.failures.iter().map(|f| f.date).collect()
    }
}

/// Calendar days in `[start, end]`, in order. Empty when `start > end`.
pub fn days_in_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |d| *d <= end)
}

type RangeKey = (Zone, NaiveDate, NaiveDate);

/// Fetches and merges date ranges through an injected [`PriceSource`].
pub struct RangeAggregator<S> {
    source: S,
    cache: HashMap<RangeKey, Arc<RangeReport>>,
    today: Option<NaiveDate>,
}

impl<S: PriceSource> RangeAggregator<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: HashMap::new(),
            today: None,
        }
    }

    /// Pin "today" instead of reading the local clock.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Fetch `[start, end]` for `zone` and merge it into one time-ordered series.
    pub fn fetch_range(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        zone: Zone,
    ) -> Result<Arc<RangeReport>, AggregateError> {
        if start > end {
            return Err(AggregateError::Validation { start, end });
        }

        let key = (zone, start, end);
        if let Some(hit) = self.cache.get(&key) {
            debug!(%zone, %start, %end, "range served from cache");
            return Ok(Arc::clone(hit));
        }

        let mut parts = Vec::new();
        let mut failures = Vec::new();

        for date in days_in_range(start, end) {
            match self.source.fetch_day(date, zone) {
                Ok(series) => parts.push(series),
                Err(error) => {
                    warn!(%zone, %date, %error, "skipping day");
                    failures.push(DayFailure { date, zone, error });
                }
            }
        }

        let series = PriceSeries::concat(parts);
        if series.is_empty() {
            return Err(AggregateError::DataAbsent {
                zone,
                start,
                end,
                failures,
            });
        }

        let report = Arc::new(RangeReport {
            zone,
            start,
            end,
            series,
            failures,
        });

        if report.is_complete() && end < self.today() {
            self.cache.insert(key, Arc::clone(&report));
        }

        Ok(report)
    }

    /// Run [`fetch_range`](Self::fetch_range) for each zone in turn.
    pub fn fetch_zones(
        &mut self,
        start: NaiveDate,
        end: NaiveDate,
        zones: &[Zone],
    ) -> Vec<(Zone, Result<Arc<RangeReport>, AggregateError>)> {
        zones
            .iter()
            .map(|&zone| (zone, self.fetch_range(start, end, zone)))
            .collect()
    }

    pub fn cached_ranges(&self) -> usize {
        self.cache.len()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}
