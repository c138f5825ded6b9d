//! Price zones and the currency selector.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Norwegian electricity price area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Zone {
    #[serde(rename = "NO1")]
    No1,
    #[serde(rename = "NO2")]
    No2,
    #[serde(rename = "NO3")]
    No3,
    #[serde(rename = "NO4")]
    No4,
    #[serde(rename = "NO5")]
    No5,
}

impl Zone {
    /// All zones in code order.
    pub const ALL: [Zone; 5] = [Zone::No1, Zone::No2, Zone::No3, Zone::No4, Zone::No5];

    /// Zone code as used in API resource paths and the dataset (`NO1`..`NO5`).
    pub fn code(self) -> &'static str {
        match self {
            Zone::No1 => "NO1",
            Zone::No2 => "NO2",
            Zone::No3 => "NO3",
            Zone::No4 => "NO4",
            Zone::No5 => "NO5",
        }
    }

    /// Region served by the zone.
    pub fn region(self) -> &'static str {
        match self {
            Zone::No1 => "Oslo / Øst-Norge",
            Zone::No2 => "Kristiansand / Sør-Norge",
            Zone::No3 => "Trondheim / Midt-Norge",
            Zone::No4 => "Tromsø / Nord-Norge",
            Zone::No5 => "Bergen / Vest-Norge",
        }
    }

    /// Selector label, e.g. `NO1 - Oslo / Øst-Norge`.
    pub fn label(self) -> String {
        format!("{} - {}", self.code(), self.region())
    }

    pub fn index(self) -> usize {
        match self {
            Zone::No1 => 0,
            Zone::No2 => 1,
            Zone::No3 => 2,
            Zone::No4 => 3,
            Zone::No5 => 4,
        }
    }

    pub fn next(self) -> Zone {
        Zone::ALL[(self.index() + 1) % Zone::ALL.len()]
    }

    pub fn prev(self) -> Zone {
        Zone::ALL[(self.index() + Zone::ALL.len() - 1) % Zone::ALL.len()]
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown price zone '{0}' (expected one of NO1, NO2, NO3, NO4, NO5)")]
pub struct ParseZoneError(pub String);

impl FromStr for Zone {
    type Err = ParseZoneError;

    /// Accepts the code in any case, or a full selector label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let code = trimmed.split(" - ").next().unwrap_or(trimmed);
        Zone::ALL
            .into_iter()
            .find(|z| z.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| ParseZoneError(s.to_string()))
    }
}

/// Which price field of a record to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "NOK")]
    Nok,
    #[serde(rename = "EUR")]
    Eur,
}

impl Currency {
    pub const ALL: [Currency; 2] = [Currency::Nok, Currency::Eur];

    pub fn code(self) -> &'static str {
        match self {
            Currency::Nok => "NOK",
            Currency::Eur => "EUR",
        }
    }

    /// Name of the upstream/dataset column holding this currency.
    pub fn column(self) -> &'static str {
        match self {
            Currency::Nok => "NOK_per_kWh",
            Currency::Eur => "EUR_per_kWh",
        }
    }

    pub fn toggle(self) -> Currency {
        match self {
            Currency::Nok => Currency::Eur,
            Currency::Eur => Currency::Nok,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown currency '{0}' (expected NOK or EUR)")]
pub struct ParseCurrencyError(pub String);

impl FromStr for Currency {
    type Err = ParseCurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Currency::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(trimmed) || c.column() == trimmed)
            .ok_or_else(|| ParseCurrencyError(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_codes_case_insensitive() {
        assert_eq!("NO1".parse::<Zone>().unwrap(), Zone::No1);
        assert_eq!("no5".parse::<Zone>().unwrap(), Zone::No5);
        assert_eq!(" No3 ".parse::<Zone>().unwrap(), Zone::No3);
    }

    #[test]
    fn parse_full_label() {
        let zone: Zone = "NO4 - Tromsø / Nord-Norge".parse().unwrap();
        assert_eq!(zone, Zone::No4);
        assert_eq!(zone.label(), "NO4 - Tromsø / Nord-Norge");
    }

    #[test]
    fn unknown_zone_is_rejected() {
        let err = "NO6".parse::<Zone>().unwrap_err();
        assert!(err.to_string().contains("NO6"));
        assert!("SE3".parse::<Zone>().is_err());
    }

    #[test]
    fn zone_cycle_wraps() {
        assert_eq!(Zone::No5.next(), Zone::No1);
        assert_eq!(Zone::No1.prev(), Zone::No5);
        let mut z = Zone::No1;
        for _ in 0..Zone::ALL.len() {
            z = z.next();
        }
        assert_eq!(z, Zone::No1);
    }

    #[test]
    fn zone_serde_uses_codes() {
        assert_eq!(serde_json::to_string(&Zone::No2).unwrap(), "\"NO2\"");
        let z: Zone = serde_json::from_str("\"NO3\"").unwrap();
        assert_eq!(z, Zone::No3);
    }

    #[test]
    fn currency_parse_and_column() {
        assert_eq!("nok".parse::<Currency>().unwrap(), Currency::Nok);
        assert_eq!("EUR_per_kWh".parse::<Currency>().unwrap(), Currency::Eur);
        assert!("SEK".parse::<Currency>().is_err());
        assert_eq!(Currency::Nok.column(), "NOK_per_kWh");
        assert_eq!(Currency::Nok.toggle(), Currency::Eur);
    }
}
