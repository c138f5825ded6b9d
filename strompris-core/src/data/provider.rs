//! Price source trait and structured retrieval errors.
//!
//! The PriceSource trait abstracts over where day payloads come from (the
//! public HTTP API, or a mock in tests). The aggregator and the dataset
//! updater only talk to this trait.

use crate::domain::{PriceSeries, Zone};
use chrono::{Datelike, NaiveDate};
use thiserror::Error;

/// Failure to retrieve one (date, zone) payload.
///
/// Every variant names the resource that failed so it can be shown as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RetrievalError {
    #[error("Failed to fetch data from {url}. Status code: {status}")]
    Status { url: String, status: u16 },

    #[error("malformed response from {url}: {reason}")]
    Malformed { url: String, reason: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("network error for {url}: {reason}")]
    Network { url: String, reason: String },
}

impl RetrievalError {
    /// The resource identifier the error refers to.
    pub fn url(&self) -> &str {
        match self {
            RetrievalError::Status { url, .. }
            | RetrievalError::Malformed { url, .. }
            | RetrievalError::Timeout { url }
            | RetrievalError::Network { url, .. } => url,
        }
    }

    /// HTTP status, when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            RetrievalError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// A single day that could not be retrieved while aggregating a range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayFailure {
    pub date: NaiveDate,
    pub zone: Zone,
    pub error: RetrievalError,
}

/// Resource path of one day's prices relative to the API base:
/// `{year}/{MM}-{DD}_{ZONE}.json`.
pub fn resource_path(date: NaiveDate, zone: Zone) -> String {
    format!(
        "{}/{:02}-{:02}_{}.json",
        date.year(),
        date.month(),
        date.day(),
        zone.code()
    )
}

/// Source of day payloads.
///
/// Implementations make exactly one read per call and no retries; the
/// caller decides what a failure means for the rest of its work.
pub trait PriceSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch all records for `zone` on `date`.
    fn fetch_day(&self, date: NaiveDate, zone: Zone) -> Result<PriceSeries, RetrievalError>;
}

impl<S: PriceSource + ?Sized> PriceSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_day(&self, date: NaiveDate, zone: Zone) -> Result<PriceSeries, RetrievalError> {
        (**self).fetch_day(date, zone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_path_zero_pads() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(resource_path(date, Zone::No1), "2024/01-05_NO1.json");
        let date = NaiveDate::from_ymd_opt(2023, 12, 31).unwrap();
        assert_eq!(resource_path(date, Zone::No5), "2023/12-31_NO5.json");
    }

    #[test]
    fn status_error_names_resource_and_code() {
        let err = RetrievalError::Status {
            url: "https://example.test/2024/01-01_NO1.json".into(),
            status: 404,
        };
        assert_eq!(
            err.to_string(),
            "Failed to fetch data from https://example.test/2024/01-01_NO1.json. Status code: 404"
        );
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.url(), "https://example.test/2024/01-01_NO1.json");
    }

    #[test]
    fn non_status_errors_have_no_code() {
        let err = RetrievalError::Timeout { url: "u".into() };
        assert_eq!(err.status(), None);
        assert_eq!(err.url(), "u");
    }
}
