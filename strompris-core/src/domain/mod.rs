//! Domain types: zones, currencies, price records and series.

pub mod record;
pub mod zone;

pub use record::{PriceRecord, PriceSeries, MAX_DAY_COVERAGE_HOURS};
pub use zone::{Currency, ParseCurrencyError, ParseZoneError, Zone};
