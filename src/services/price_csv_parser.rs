//! Reads price series out of the CSV blobs written by the forecasting job.
//!
//! Column contract (header row required, names case-insensitive and
//! quote-stripped, order free):
//!
//! | Column       | Series     | Meaning             |
//! |--------------|------------|---------------------|
//! | `ds`         | both       | date or timestamp   |
//! | `c`          | historical | observed close      |
//! | `pred_price` | forecast   | predicted price     |
//!
//! Cells are split on every comma; quoted commas are not supported.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use crate::models::{PricePoint, PriceSeries, SeriesKind};

pub const DATE_COLUMN: &str = "ds";

const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parses one CSV blob into a series sorted ascending by date.
///
/// Never fails. A header without the required columns yields an empty
/// series; rows with a missing cell, an empty or unreadable date, or a
/// price that is not a finite number are skipped. Rows sharing a timestamp
/// keep their input order.
pub fn parse_price_csv(raw: &str, kind: SeriesKind) -> PriceSeries {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .quoting(false)
        .from_reader(raw.as_bytes());

    let columns: Vec<String> = match reader.headers() {
        Ok(headers) => headers.iter().map(normalize_header).collect(),
        Err(e) => {
            warn!("Could not read CSV header ({:?} series): {}", kind, e);
            return Vec::new();
        }
    };

    let price_column = kind.price_column();
    let date_idx = columns.iter().position(|c| c == DATE_COLUMN);
    let price_idx = columns.iter().position(|c| c == price_column);

    let (date_idx, price_idx) = match (date_idx, price_idx) {
        (Some(d), Some(p)) => (d, p),
        _ => {
            warn!(
                "CSV header {:?} lacks '{}' or '{}', returning empty {:?} series",
                columns, DATE_COLUMN, price_column, kind
            );
            return Vec::new();
        }
    };

    let mut rows: Vec<(NaiveDateTime, PricePoint)> = Vec::new();
    let mut skipped = 0usize;

    for record in reader.records() {
        let parsed = record
            .ok()
            .and_then(|record| parse_row(&record, date_idx, price_idx, kind));

        match parsed {
            Some(row) => rows.push(row),
            None => skipped += 1,
        }
    }

    if rows.is_empty() && skipped > 0 {
        warn!("All {} data row(s) in {:?} CSV were unreadable", skipped, kind);
    } else if skipped > 0 {
        debug!("Skipped {} malformed row(s) in {:?} CSV", skipped, kind);
    }

    // Stable, so equal timestamps stay in input order.
    rows.sort_by_key(|(timestamp, _)| *timestamp);
    rows.into_iter().map(|(_, point)| point).collect()
}

fn parse_row(
    record: &StringRecord,
    date_idx: usize,
    price_idx: usize,
    kind: SeriesKind,
) -> Option<(NaiveDateTime, PricePoint)> {
    let date = clean_cell(record.get(date_idx)?);
    let price_raw = clean_cell(record.get(price_idx)?);

    if date.is_empty() {
        return None;
    }

    let price = price_raw.parse::<f64>().ok().filter(|p| p.is_finite())?;
    let timestamp = parse_timestamp(&date)?;

    Some((timestamp, PricePoint::new(date, price, kind.is_forecast())))
}

fn normalize_header(raw: &str) -> String {
    clean_cell(raw.trim_start_matches('\u{feff}')).to_lowercase()
}

fn clean_cell(raw: &str) -> String {
    raw.trim().replace('"', "").trim().to_string()
}

/// Interprets a `ds` cell as a point in time. Values without an offset are
/// taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }

    for fmt in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Some(dt.naive_utc());
        }
    }

    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}
