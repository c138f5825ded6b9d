//! Derived fields: daily means, current-interval lookup, range summaries.

use crate::domain::{Currency, PriceRecord, PriceSeries, Zone};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Mean price of one zone over one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyMean {
    pub zone: Zone,
    pub date: NaiveDate,
    #[serde(rename = "NOK_per_kWh")]
    pub nok_per_kwh: f64,
    #[serde(rename = "EUR_per_kWh")]
    pub eur_per_kwh: f64,
    /// Number of intervals averaged.
    pub intervals: usize,
}

impl DailyMean {
    pub fn price(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Nok => self.nok_per_kwh,
            Currency::Eur => self.eur_per_kwh,
        }
    }
}

/// Average each zone's records per local calendar day.
///
/// Output is ordered by zone, then date. The mean is unweighted: every
/// interval counts once regardless of its length.
pub fn daily_means<'a, I>(records: I) -> Vec<DailyMean>
where
    I: IntoIterator<Item = &'a PriceRecord>,
{
    let mut sums: BTreeMap<(Zone, NaiveDate), (f64, f64, usize)> = BTreeMap::new();
    for r in records {
        let entry = sums.entry((r.zone, r.local_date())).or_insert((0.0, 0.0, 0));
        entry.0 += r.nok_per_kwh;
        entry.1 += r.eur_per_kwh;
        entry.2 += 1;
    }

    sums.into_iter()
        .map(|((zone, date), (nok, eur, n))| DailyMean {
            zone,
            date,
            nok_per_kwh: nok / n as f64,
            eur_per_kwh: eur / n as f64,
            intervals: n,
        })
        .collect()
}

/// The record whose interval contains `now`.
pub fn current_record(series: &PriceSeries, now: DateTime<Utc>) -> Option<&PriceRecord> {
    series.iter().find(|r| r.contains(now))
}

/// Min / max / mean of a series in one currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSummary {
    pub currency: Currency,
    pub count: usize,
    pub min: f64,
    pub min_at: DateTime<FixedOffset>,
    pub max: f64,
    pub max_at: DateTime<FixedOffset>,
    pub mean: f64,
}

impl PriceSummary {
    /// `None` for an empty series. Ties keep the earliest interval.
    pub fn of(series: &PriceSeries, currency: Currency) -> Option<Self> {
        let first = series.first()?;
        let mut min = (first.price(currency), first.time_start);
        let mut max = min;
        let mut total = 0.0;

        for r in series {
            let p = r.price(currency);
            total += p;
            if p < min.0 {
                min = (p, r.time_start);
            }
            if p > max.0 {
                max = (p, r.time_start);
            }
        }

        Some(Self {
            currency,
            count: series.len(),
            min: min.0,
            min_at: min.1,
            max: max.0,
            max_at: max.1,
            mean: total / series.len() as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn rec(zone: Zone, day: u32, hour: u32, nok: f64) -> PriceRecord {
        let offset = FixedOffset::east_opt(3600).unwrap();
        let start = offset.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap();
        PriceRecord {
            zone,
            time_start: start,
            time_end: start + Duration::hours(1),
            nok_per_kwh: nok,
            eur_per_kwh: nok / 10.0,
            exchange_rate: None,
        }
    }

    #[test]
    fn daily_means_group_by_zone_and_date() {
        let records = vec![
            rec(Zone::No2, 1, 0, 2.0),
            rec(Zone::No1, 1, 0, 1.0),
            rec(Zone::No1, 1, 1, 3.0),
            rec(Zone::No1, 2, 0, 5.0),
        ];
        let means = daily_means(&records);
        assert_eq!(means.len(), 3);

        assert_eq!(means[0].zone, Zone::No1);
        assert_eq!(means[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(means[0].nok_per_kwh, 2.0);
        assert_eq!(means[0].intervals, 2);

        assert_eq!(means[1].zone, Zone::No1);
        assert_eq!(means[1].price(Currency::Nok), 5.0);

        assert_eq!(means[2].zone, Zone::No2);
        assert_eq!(means[2].price(Currency::Eur), 0.2);
    }

    #[test]
    fn daily_means_use_local_date() {
        // 23:30+01:00 is still Jan 1 locally although it is 22:30Z.
        let offset = FixedOffset::east_opt(3600).unwrap();
        let start = offset.with_ymd_and_hms(2024, 1, 1, 23, 30, 0).unwrap();
        let r = PriceRecord {
            zone: Zone::No1,
            time_start: start,
            time_end: start + Duration::minutes(30),
            nok_per_kwh: 1.0,
            eur_per_kwh: 0.1,
            exchange_rate: None,
        };
        let means = daily_means([&r]);
        assert_eq!(means[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn current_record_finds_containing_interval() {
        let series =
            PriceSeries::new((0..24).map(|h| rec(Zone::No1, 1, h, f64::from(h))).collect());
        // 13:20 local (+01:00) is 12:20Z.
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 20, 0).unwrap();
        let hit = current_record(&series, now).unwrap();
        assert_eq!(hit.nok_per_kwh, 13.0);

        let outside = Utc.with_ymd_and_hms(2024, 1, 3, 0, 0, 0).unwrap();
        assert!(current_record(&series, outside).is_none());
    }

    #[test]
    fn summary_min_max_mean() {
        let series = PriceSeries::new(vec![
            rec(Zone::No1, 1, 0, 4.0),
            rec(Zone::No1, 1, 1, 1.0),
            rec(Zone::No1, 1, 2, 7.0),
            rec(Zone::No1, 1, 3, 1.0),
        ]);
        let s = PriceSummary::of(&series, Currency::Nok).unwrap();
        assert_eq!(s.count, 4);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.min_at, series.records()[1].time_start);
        assert_eq!(s.max, 7.0);
        assert_eq!(s.max_at, series.records()[2].time_start);
        assert_eq!(s.mean, 3.25);
    }

    #[test]
    fn summary_of_empty_series_is_none() {
        assert!(PriceSummary::of(&PriceSeries::default(), Currency::Eur).is_none());
    }
}
