//! Explicit date parsing for month derivation.
//!
//! Spreadsheet date columns arrive as real date cells, as Excel serial
//! numbers (cells without a date format), or as text. Each form is handled
//! explicitly; anything else is a [`DashboardError::DateParse`].

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::error::{DashboardError, Result};
use crate::models::CellValue;

/// Largest serial Excel can display (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Text layouts tried in order for date-only values.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Text layouts tried in order for date-time values.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Convert an Excel 1900-system serial number into a date-time.
///
/// Serials below 60 predate the phantom 1900-02-29, so they use a base one
/// day later. Returns `None` outside `1..=2958465`.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(1.0..=MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    let days = serial.trunc() as i64;
    let base = if days < 60 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    let seconds = (serial.fract() * 86_400.0).round() as i64;
    let midnight = base.and_hms_opt(0, 0, 0)?;
    midnight
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::seconds(seconds))
}

/// Parse a textual date or date-time.
///
/// Accepts RFC 3339 plus the layouts in `DATE_FORMATS` and
/// `DATETIME_FORMATS`. Returns `None` for empty or unrecognised text.
pub fn parse_date_text(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Interpret a cell as a date-time, or `None` if it is not date-like.
pub fn cell_to_datetime(value: &CellValue) -> Option<NaiveDateTime> {
    match value {
        CellValue::DateTime(dt) => Some(*dt),
        CellValue::Number(n) => excel_serial_to_datetime(*n),
        CellValue::Text(s) => parse_date_text(s),
        CellValue::Empty | CellValue::Bool(_) => None,
    }
}

/// Calendar month (1–12) of a date-like cell.
///
/// `column` and `row` only feed the error message.
pub fn month_of(value: &CellValue, column: &str, row: usize) -> Result<u32> {
    cell_to_datetime(value)
        .map(|dt| dt.month())
        .ok_or_else(|| DashboardError::DateParse {
            column: column.to_string(),
            row,
            value: value.to_text(),
        })
}
