//! CSV ingest for historical irradiance.
//!
//! Two layouts are recognized:
//! - **profile**: Global Solar Atlas style hourly profiles, one column per
//!   month (`Jan` .. `Dec`) and 24 rows, usually after a few metadata lines;
//! - **series**: a time column plus a GHI column, one row per hour.

use std::io::Read;

use chrono::{DateTime, FixedOffset, Month, NaiveDateTime};
use csv::StringRecord;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::{HistoricalSample, HistoryInput, HourlyProfile, HOURS_PER_DAY};

/// Header row must appear within this many leading records
const HEADER_SCAN_LIMIT: usize = 10;
/// A profile header names at least this many months
const MIN_MONTH_COLUMNS: usize = 2;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const TIME_KEYWORDS: [&str; 3] = ["time", "date", "waktu"];
const GHI_KEYWORDS: [&str; 3] = ["ghi", "irradiance", "radiasi"];

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

/// Malformed or unrecognizable historical input
#[derive(Debug, Error)]
pub enum DataFormatError {
    #[error("History file is empty")]
    Empty,

    #[error("No GHI column layout found (expected month columns, or a time and a GHI column)")]
    MissingColumns,

    #[error("Invalid GHI value {value:?} on line {line}")]
    InvalidValue { line: usize, value: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Layout detected in an uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum HistoryFormat {
    /// Monthly hourly profile; `column` is the month column used
    Profile { column: String },
    /// Time/GHI series
    Series { samples: usize },
    /// Generated in-process, no file
    Synthetic { days: u32 },
}

/// Parsed history together with what was detected
#[derive(Debug, Clone)]
pub struct LoadedHistory {
    pub input: HistoryInput,
    pub format: HistoryFormat,
    pub message: String,
}

enum Layout {
    Profile { column: usize, name: String },
    Series { time: usize, ghi: usize },
}

/// Parse CSV text into history. `month` selects the profile column when the
/// file holds monthly profiles; the first month column is used if it is absent.
pub fn load_csv<R: Read>(reader: R, month: Month) -> Result<LoadedHistory, DataFormatError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = reader.records();
    let mut seen_any = false;
    let mut layout = None;
    let mut header_line = 0;

    for (idx, result) in records.by_ref().take(HEADER_SCAN_LIMIT).enumerate() {
        let record = result?;
        seen_any = true;
        if let Some(found) = detect_layout(&record, month) {
            layout = Some(found);
            header_line = idx + 1;
            break;
        }
    }

    let layout = match layout {
        Some(layout) => layout,
        None if seen_any => return Err(DataFormatError::MissingColumns),
        None => return Err(DataFormatError::Empty),
    };
    debug!(header_line, "found history header row");

    let loaded = match layout {
        Layout::Profile { column, name } => {
            let mut values = Vec::with_capacity(HOURS_PER_DAY);
            for result in records.take(HOURS_PER_DAY) {
                let record = result?;
                let value = record
                    .get(column)
                    .and_then(|raw| raw.parse::<f64>().ok())
                    .filter(|v| v.is_finite())
                    .unwrap_or(0.0);
                values.push(value);
            }
            LoadedHistory {
                input: HistoryInput::Profile(HourlyProfile::from_values(&values)),
                message: format!("Global Solar Atlas profile detected, using month column {name}"),
                format: HistoryFormat::Profile { column: name },
            }
        }
        Layout::Series { time, ghi } => {
            let mut samples = Vec::new();
            for (idx, result) in records.enumerate() {
                let line = header_line + idx + 1;
                let record = result?;
                let Some(timestamp) = record.get(time).and_then(parse_timestamp) else {
                    continue;
                };
                let raw = record.get(ghi).unwrap_or_default();
                if raw.is_empty() {
                    continue;
                }
                let sample = raw
                    .parse::<f64>()
                    .ok()
                    .and_then(|value| HistoricalSample::new(timestamp, value))
                    .ok_or_else(|| DataFormatError::InvalidValue {
                        line,
                        value: raw.to_string(),
                    })?;
                samples.push(sample);
            }
            samples.sort_by_key(|s| s.timestamp);
            LoadedHistory {
                message: format!("Time series detected with {} samples", samples.len()),
                format: HistoryFormat::Series {
                    samples: samples.len(),
                },
                input: HistoryInput::Series(samples),
            }
        }
    };

    info!(format = ?loaded.format, "loaded history");
    Ok(loaded)
}

fn detect_layout(record: &StringRecord, month: Month) -> Option<Layout> {
    let month_columns: Vec<(usize, usize, &str)> = record
        .iter()
        .enumerate()
        .filter_map(|(column, name)| month_index(name).map(|m| (column, m, name)))
        .collect();

    if month_columns.len() >= MIN_MONTH_COLUMNS {
        let wanted = month.number_from_month() as usize - 1;
        let (column, _, name) = month_columns
            .iter()
            .find(|(_, m, _)| *m == wanted)
            .unwrap_or(&month_columns[0]);
        return Some(Layout::Profile {
            column: *column,
            name: name.to_string(),
        });
    }

    let lowered: Vec<String> = record.iter().map(normalize_header_name).collect();
    let find = |keywords: &[&str]| {
        lowered
            .iter()
            .position(|name| keywords.iter().any(|k| name.contains(k)))
    };

    match (find(&TIME_KEYWORDS), find(&GHI_KEYWORDS)) {
        (Some(time), Some(ghi)) if time != ghi => Some(Layout::Series { time, ghi }),
        _ => None,
    }
}

/// Zero-based month for a header cell whose leading word is a month name,
/// abbreviated (`Jan`) or full (`January`), in any case
fn month_index(name: &str) -> Option<usize> {
    let word = name
        .trim()
        .trim_start_matches('\u{feff}')
        .chars()
        .take_while(char::is_ascii_alphabetic)
        .collect::<String>()
        .to_lowercase();
    MONTH_ABBREVIATIONS.iter().enumerate().find_map(|(idx, abbr)| {
        let full = Month::try_from(idx as u8 + 1).ok()?.name().to_lowercase();
        (word == abbr.to_lowercase() || word == full).then_some(idx)
    })
}

fn normalize_header_name(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_lowercase()
}

/// RFC 3339 or a naive `YYYY-MM-DD HH:MM[:SS]` (taken as UTC)
fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts);
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc().fixed_offset())
}
