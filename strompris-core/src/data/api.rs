//! hvakosterstrommen.no price API.
//!
//! One unauthenticated GET per (date, zone):
//! `{base}/{year}/{MM}-{DD}_{ZONE}.json`, answered with a JSON array of
//! intervals. No retries; a non-2xx answer, a transport failure, a timeout
//! or a body that does not parse is returned as a [`RetrievalError`].

use super::provider::{resource_path, PriceSource, RetrievalError};
use crate::config::SourceConfig;
use crate::domain::{PriceRecord, PriceSeries, Zone};
use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Deserialize;
use tracing::debug;

/// One element of the API response array.
#[derive(Debug, Deserialize)]
struct ApiInterval {
    #[serde(rename = "NOK_per_kWh")]
    nok_per_kwh: f64,
    #[serde(rename = "EUR_per_kWh")]
    eur_per_kwh: f64,
    #[serde(rename = "EXR", default)]
    exr: Option<f64>,
    time_start: DateTime<FixedOffset>,
    time_end: DateTime<FixedOffset>,
}

/// HTTP price source backed by a blocking reqwest client.
pub struct HvaKosterStrommen {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HvaKosterStrommen {
    pub fn new(config: &SourceConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Full URL of one day's prices.
    pub fn day_url(&self, date: NaiveDate, zone: Zone) -> String {
        format!("{}/{}", self.base_url, resource_path(date, zone))
    }
}

impl PriceSource for HvaKosterStrommen {
    fn name(&self) -> &str {
        "hvakosterstrommen"
    }

    fn fetch_day(&self, date: NaiveDate, zone: Zone) -> Result<PriceSeries, RetrievalError> {
        let url = self.day_url(date, zone);
        debug!(%url, "fetching day prices");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| transport_error(&url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RetrievalError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = resp.text().map_err(|e| transport_error(&url, e))?;
        let series = parse_day(&url, zone, &body)?;
        debug!(%url, records = series.len(), "fetched day prices");
        Ok(series)
    }
}

fn transport_error(url: &str, e: reqwest::Error) -> RetrievalError {
    if e.is_timeout() {
        RetrievalError::Timeout {
            url: url.to_string(),
        }
    } else {
        RetrievalError::Network {
            url: url.to_string(),
            reason: e.to_string(),
        }
    }
}

/// Parse one day's JSON body into a validated series for `zone`.
///
/// `url` only labels errors.
pub fn parse_day(url: &str, zone: Zone, body: &str) -> Result<PriceSeries, RetrievalError> {
    let intervals: Vec<ApiInterval> =
        serde_json::from_str(body).map_err(|e| RetrievalError::Malformed {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

    let series = PriceSeries::new(
        intervals
            .into_iter()
            .map(|i| PriceRecord {
                zone,
                time_start: i.time_start,
                time_end: i.time_end,
                nok_per_kwh: i.nok_per_kwh,
                eur_per_kwh: i.eur_per_kwh,
                exchange_rate: i.exr,
            })
            .collect(),
    );

    series
        .check_day_invariant()
        .map_err(|reason| RetrievalError::Malformed {
            url: url.to_string(),
            reason,
        })?;

    Ok(series)
}
