//! Price retrieval, range aggregation and the historical dataset.

pub mod aggregator;
pub mod api;
pub mod dataset;
pub mod provider;
pub mod update;

pub use aggregator::{days_in_range, AggregateError, RangeAggregator, RangeReport};
pub use api::HvaKosterStrommen;
pub use dataset::{csv_row, DatasetError, DatasetStatus, DatasetStore, ZoneCoverage};
pub use provider::{resource_path, DayFailure, PriceSource, RetrievalError};
pub use update::{
    update_dataset, NoProgress, StdoutProgress, UpdateError, UpdateProgress, UpdateSummary,
};
