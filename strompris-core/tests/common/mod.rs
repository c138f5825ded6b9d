//! Shared fixtures: day payloads and an in-memory price source.

#![allow(dead_code)]

use chrono::{Duration, FixedOffset, NaiveDate, TimeZone};
use std::collections::HashMap;
use std::sync::Mutex;
use strompris_core::data::{resource_path, PriceSource, RetrievalError};
use strompris_core::{PriceRecord, PriceSeries, Zone};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// `hours` hourly records starting at local midnight (+01:00), priced
/// `base + hour / 100`.
pub fn day_records(zone: Zone, day: NaiveDate, hours: u32, base: f64) -> Vec<PriceRecord> {
    let offset = FixedOffset::east_opt(3600).unwrap();
    let midnight = offset
        .from_local_datetime(&day.and_hms_opt(0, 0, 0).unwrap())
        .unwrap();
    (0..hours)
        .map(|h| {
            let start = midnight + Duration::hours(i64::from(h));
            PriceRecord {
                zone,
                time_start: start,
                time_end: start + Duration::hours(1),
                nok_per_kwh: base + f64::from(h) / 100.0,
                eur_per_kwh: (base + f64::from(h) / 100.0) / 11.5,
                exchange_rate: Some(11.5),
            }
        })
        .collect()
}

/// JSON body in the upstream API format for the given records.
pub fn api_body(records: &[PriceRecord]) -> String {
    let items: Vec<String> = records
        .iter()
        .map(|r| {
            format!(
                r#"{{"NOK_per_kWh":{},"EUR_per_kWh":{},"EXR":{},"time_start":"{}","time_end":"{}"}}"#,
                r.nok_per_kwh,
                r.eur_per_kwh,
                r.exchange_rate.unwrap_or(0.0),
                r.time_start.to_rfc3339(),
                r.time_end.to_rfc3339(),
            )
        })
        .collect();
    format!("[{}]", items.join(","))
}

/// In-memory source. Unknown (date, zone) pairs answer 404.
#[derive(Default)]
pub struct MockSource {
    days: HashMap<(NaiveDate, Zone), Result<Vec<PriceRecord>, RetrievalError>>,
    calls: Mutex<Vec<(NaiveDate, Zone)>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_day(mut self, date: NaiveDate, zone: Zone, records: Vec<PriceRecord>) -> Self {
        self.days.insert((date, zone), Ok(records));
        self
    }

    pub fn with_failure(mut self, date: NaiveDate, zone: Zone, status: u16) -> Self {
        self.days.insert(
            (date, zone),
            Err(RetrievalError::Status {
                url: url(date, zone),
                status,
            }),
        );
        self
    }

    pub fn calls(&self) -> Vec<(NaiveDate, Zone)> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn url(date: NaiveDate, zone: Zone) -> String {
    format!("mock://prices/{}", resource_path(date, zone))
}

impl PriceSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    fn fetch_day(&self, date: NaiveDate, zone: Zone) -> Result<PriceSeries, RetrievalError> {
        self.calls.lock().unwrap().push((date, zone));
        match self.days.get(&(date, zone)) {
            Some(Ok(records)) => Ok(PriceSeries::new(records.clone())),
            Some(Err(e)) => Err(e.clone()),
            None => Err(RetrievalError::Status {
                url: url(date, zone),
                status: 404,
            }),
        }
    }
}
