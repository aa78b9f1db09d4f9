//! Coercion of free-form numeric and date entry.
//!
//! The presentation layer hands over raw strings. Everything that
//! reaches the ledger, hiring plan or sales plan passes through here
//! first, so nothing malformed ever enters a projection.

use chrono::{DateTime, NaiveDate};

use crate::error::{ForecastError, ForecastResult};

/// Parse a non-negative, finite quantity (SQS, dollars, rates).
pub fn parse_quantity(field: &str, raw: &str) -> ForecastResult<f64> {
    let trimmed = raw.trim();
    let value: f64 = trimmed
        .parse()
        .map_err(|_| ForecastError::validation(field, format!("'{trimmed}' is not a number")))?;
    check_quantity(field, value)
}

/// Reject NaN, infinities and negatives.
pub fn check_quantity(field: &str, value: f64) -> ForecastResult<f64> {
    if !value.is_finite() {
        return Err(ForecastError::validation(field, "must be a finite number"));
    }
    if value < 0.0 {
        return Err(ForecastError::validation(field, format!("must not be negative, got {value}")));
    }
    Ok(value)
}

/// Parse a non-negative whole count (crews, leads, weeks).
pub fn parse_count(field: &str, raw: &str) -> ForecastResult<u32> {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<u32>() {
        return Ok(n);
    }
    // "4.0" from a numeric input box is still a count.
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= u32::MAX as f64 => Ok(v as u32),
        Ok(v) if v < 0.0 => Err(ForecastError::validation(field, format!("must not be negative, got {v}"))),
        _ => Err(ForecastError::validation(field, format!("'{trimmed}' is not a whole number"))),
    }
}

/// Parse a yes/no toggle.
pub fn parse_flag(field: &str, raw: &str) -> ForecastResult<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        other => Err(ForecastError::validation(field, format!("'{other}' is not yes or no"))),
    }
}

/// Parse a calendar date. Accepts `YYYY-MM-DD` or a full RFC 3339
/// timestamp (whose date part is used).
pub fn parse_date(field: &str, raw: &str) -> ForecastResult<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ForecastError::validation(field, "date is required"));
    }
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.date_naive())
        .map_err(|_| ForecastError::validation(field, format!("'{trimmed}' is not a date")))
}

/// Portable ISO-8601 representation of a date.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
