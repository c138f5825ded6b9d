//! Hourly price records and time-ordered series of them.

use super::zone::{Currency, Zone};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Longest span a single (zone, date) payload may cover (25h on the autumn DST switch).
pub const MAX_DAY_COVERAGE_HOURS: i64 = 25;

/// One price observation for a zone over `[time_start, time_end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub zone: Zone,
    pub time_start: DateTime<FixedOffset>,
    pub time_end: DateTime<FixedOffset>,
    #[serde(rename = "NOK_per_kWh")]
    pub nok_per_kwh: f64,
    #[serde(rename = "EUR_per_kWh")]
    pub eur_per_kwh: f64,
    #[serde(rename = "EXR", default, skip_serializing_if = "Option::is_none")]
    pub exchange_rate: Option<f64>,
}

impl PriceRecord {
    /// Price per kWh in the selected currency.
    pub fn price(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Nok => self.nok_per_kwh,
            Currency::Eur => self.eur_per_kwh,
        }
    }

    pub fn duration(&self) -> Duration {
        self.time_end - self.time_start
    }

    /// True if `instant` falls inside `[time_start, time_end)`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.time_start <= instant && instant < self.time_end
    }

    /// Calendar date of the interval start in the record's own offset.
    pub fn local_date(&self) -> NaiveDate {
        self.time_start.date_naive()
    }
}

/// Records ordered by interval start.
///
/// Ordering compares instants, so records carrying different UTC offsets
/// (summer/winter time) still sort correctly. Sorting is stable: records
/// with equal starts keep their insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    records: Vec<PriceRecord>,
}

impl PriceSeries {
    pub fn new(mut records: Vec<PriceRecord>) -> Self {
        records.sort_by_key(|r| r.time_start);
        Self { records }
    }

    /// Concatenate several series into one time-ordered series.
    pub fn concat<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = PriceSeries>,
    {
        Self::new(parts.into_iter().flat_map(|p| p.records).collect())
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PriceRecord> {
        self.records.iter()
    }

    pub fn first(&self) -> Option<&PriceRecord> {
        self.records.first()
    }

    pub fn last(&self) -> Option<&PriceRecord> {
        self.records.last()
    }

    /// Prices in the selected currency, in series order.
    pub fn prices(&self, currency: Currency) -> impl Iterator<Item = f64> + '_ {
        self.records.iter().map(move |r| r.price(currency))
    }

    /// Interval starts never decrease.
    pub fn is_chronological(&self) -> bool {
        self.records
            .windows(2)
            .all(|w| w[0].time_start <= w[1].time_start)
    }

    /// Check the single-day invariant: positive, non-overlapping intervals
    /// covering no more than [`MAX_DAY_COVERAGE_HOURS`].
    pub fn check_day_invariant(&self) -> Result<(), String> {
        for r in &self.records {
            if r.time_end <= r.time_start {
                return Err(format!(
                    "interval starting {} ends at or before its start ({})",
                    r.time_start, r.time_end
                ));
            }
        }

        for w in self.records.windows(2) {
            if w[1].time_start < w[0].time_end {
                return Err(format!(
                    "intervals starting {} and {} overlap",
                    w[0].time_start, w[1].time_start
                ));
            }
        }

        let covered = self
            .records
            .iter()
            .fold(Duration::zero(), |acc, r| acc + r.duration());
        if covered > Duration::hours(MAX_DAY_COVERAGE_HOURS) {
            return Err(format!(
                "{} records cover {}h, more than one day",
                self.records.len(),
                covered.num_hours()
            ));
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PriceRecord;
    type IntoIter = std::slice::Iter<'a, PriceRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
