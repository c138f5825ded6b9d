//! Append-only CSV dataset of historical prices.
//!
//! Columns: `zone,time_start,time_end,NOK_per_kWh,EUR_per_kWh,EXR`.
//!
//! - The header is written only when the file is new or empty; appends never
//!   repeat it. Files without any header are read too, including the
//!   legacy layout `NOK_per_kWh,EUR_per_kWh,EXR,time_start,time_end,area`.
//! - A file whose last row lacks its line terminator gets one before new
//!   rows are appended.
//! - Rows are never rewritten or deduplicated.
//! - Timestamps are stored as RFC 3339 with the offset the API reported.

use crate::domain::{PriceRecord, Zone};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const COLUMNS: [&str; 6] = [
    "zone",
    "time_start",
    "time_end",
    "NOK_per_kWh",
    "EUR_per_kWh",
    "EXR",
];

/// Column order of headerless files written by the older daily job.
const LEGACY_COLUMNS: [&str; 6] = [
    "NOK_per_kWh",
    "EUR_per_kWh",
    "EXR",
    "time_start",
    "time_end",
    "area",
];

/// One record as a row in [`COLUMNS`] order. A missing exchange rate is an
/// empty field.
pub fn csv_row(r: &PriceRecord) -> [String; 6] {
    [
        r.zone.code().to_string(),
        r.time_start.to_rfc3339(),
        r.time_end.to_rfc3339(),
        r.nok_per_kwh.to_string(),
        r.eur_per_kwh.to_string(),
        r.exchange_rate.map(|x| x.to_string()).unwrap_or_default(),
    ]
}

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset line {line}: {reason}")]
    Row { line: u64, reason: String },
}

/// Row counts and time span of one zone in the dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneCoverage {
    pub zone: Zone,
    pub rows: usize,
    pub first_start: DateTime<FixedOffset>,
    pub last_start: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetStatus {
    pub path: PathBuf,
    pub exists: bool,
    pub total_rows: usize,
    pub zones: Vec<ZoneCoverage>,
}

/// The CSV file holding the accumulated history.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    path: PathBuf,
}

impl DatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> DatasetError {
        DatasetError::Io {
            path: self.path.clone(),
            source,
        }
    }

    /// Append `records` to the end of the file, creating it (with a header)
    /// if needed. Returns the number of rows written.
    pub fn append(&self, records: &[PriceRecord]) -> Result<usize, DatasetError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
            }
        }

        let is_new = match fs::metadata(&self.path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(self.io_err(e)),
        };

        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;

        if !is_new && !ends_with_newline(&mut file).map_err(|e| self.io_err(e))? {
            file.write_all(b"\n").map_err(|e| self.io_err(e))?;
        }

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if is_new {
            wtr.write_record(COLUMNS)?;
        }

        for r in records {
            wtr.write_record(csv_row(r))?;
        }

        wtr.flush().map_err(|e| self.io_err(e))?;
        Ok(records.len())
    }

    /// Load every row in file order. A missing file is an empty dataset.
    pub fn load(&self) -> Result<Vec<PriceRecord>, DatasetError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;

        let mut records = Vec::new();
        for (i, row) in rdr.records().enumerate() {
            let row = row?;
            let line = row.position().map(|p| p.line()).unwrap_or(i as u64 + 1);
            if i == 0 && row.get(0) == Some(COLUMNS[0]) {
                continue;
            }
            records.push(parse_row(&row).map_err(|reason| DatasetError::Row { line, reason })?);
        }

        Ok(records)
    }

    /// Row counts and per-zone coverage.
    pub fn status(&self) -> Result<DatasetStatus, DatasetError> {
        let exists = self.path.exists();
        let records = self.load()?;

        let mut by_zone: BTreeMap<Zone, ZoneCoverage> = BTreeMap::new();
        for r in &records {
            by_zone
                .entry(r.zone)
                .and_modify(|c| {
                    c.rows += 1;
                    c.first_start = c.first_start.min(r.time_start);
                    c.last_start = c.last_start.max(r.time_start);
                })
                .or_insert(ZoneCoverage {
                    zone: r.zone,
                    rows: 1,
                    first_start: r.time_start,
                    last_start: r.time_start,
                });
        }

        Ok(DatasetStatus {
            path: self.path.clone(),
            exists,
            total_rows: records.len(),
            zones: by_zone.into_values().collect(),
        })
    }
}

fn ends_with_newline(file: &mut File) -> std::io::Result<bool> {
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// Column positions of one row layout.
struct Layout {
    names: [&'static str; 6],
    zone: usize,
    time_start: usize,
    time_end: usize,
    nok: usize,
    eur: usize,
    exr: usize,
}

const CURRENT: Layout = Layout {
    names: COLUMNS,
    zone: 0,
    time_start: 1,
    time_end: 2,
    nok: 3,
    eur: 4,
    exr: 5,
};

const LEGACY: Layout = Layout {
    names: LEGACY_COLUMNS,
    zone: 5,
    time_start: 3,
    time_end: 4,
    nok: 0,
    eur: 1,
    exr: 2,
};

fn is_zone(raw: Option<&str>) -> bool {
    raw.is_some_and(|s| s.trim().parse::<Zone>().is_ok())
}

/// Zone-first rows use [`COLUMNS`]; six-field rows ending in a zone code
/// use the legacy order.
fn parse_row(row: &csv::StringRecord) -> Result<PriceRecord, String> {
    let layout = if !is_zone(row.get(0)) && row.len() == 6 && is_zone(row.get(5)) {
        &LEGACY
    } else {
        &CURRENT
    };

    let zone = field(row, layout, layout.zone)?
        .parse::<Zone>()
        .map_err(|e| e.to_string())?;
    let exchange_rate = match row.get(layout.exr).map(str::trim) {
        None | Some("") => None,
        Some(_) => Some(number(row, layout, layout.exr)?),
    };

    Ok(PriceRecord {
        zone,
        time_start: time(row, layout, layout.time_start)?,
        time_end: time(row, layout, layout.time_end)?,
        nok_per_kwh: number(row, layout, layout.nok)?,
        eur_per_kwh: number(row, layout, layout.eur)?,
        exchange_rate,
    })
}

fn field<'r>(row: &'r csv::StringRecord, layout: &Layout, idx: usize) -> Result<&'r str, String> {
    row.get(idx)
        .map(str::trim)
        .ok_or_else(|| format!("missing column '{}'", layout.names[idx]))
}

fn time(
    row: &csv::StringRecord,
    layout: &Layout,
    idx: usize,
) -> Result<DateTime<FixedOffset>, String> {
    let raw = field(row, layout, idx)?;
    DateTime::parse_from_rfc3339(raw).map_err(|e| format!("{} '{raw}': {e}", layout.names[idx]))
}

fn number(row: &csv::StringRecord, layout: &Layout, idx: usize) -> Result<f64, String> {
    let raw = field(row, layout, idx)?;
    raw.parse::<f64>()
        .map_err(|e| format!("{} '{raw}': {e}", layout.names[idx]))
}
