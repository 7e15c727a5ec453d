use axum::http::StatusCode;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

use crate::constants::*;
use crate::errors::ReadError;

/// Parses the calendar-day part of a stored date string. Accepts both bare
/// "YYYY-MM-DD" values and full timestamps; only the first ten characters
/// are significant.
pub fn parse_day(raw: &str) -> Option<Date> {
    let day_part = raw.get(..10)?;
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(day_part, &format).ok()
}

/// Formats a date back into the stored "YYYY-MM-DD" key.
pub fn day_key(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        date.month() as u8,
        date.day()
    )
}

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

pub fn month_start(date: Date) -> Date {
    date.replace_day(1).unwrap_or(date)
}

pub fn now_timestamp() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

/// Read-boundary collapse: a failed query is logged and degraded to an
/// empty list, never surfaced to the client.
pub fn or_empty<T>(result: Result<Vec<T>, ReadError>, what: &str) -> Vec<T> {
    match result {
        Ok(rows) => rows,
        Err(err) => {
            tracing::error!(error = %err, "{} read failed", what);
            Vec::new()
        }
    }
}

/// Same policy for single-value reads: failure degrades to `None`.
pub fn or_none<T>(result: Result<Option<T>, ReadError>, what: &str) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::error!(error = %err, "{} read failed", what);
            None
        }
    }
}

pub fn db_error() -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        ERR_DATABASE_OPERATION.to_string(),
    )
}

pub fn validate_string_length(
    value: &str,
    field_name: &str,
    max_length: usize,
) -> Result<(), (StatusCode, String)> {
    if value.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("{} cannot be empty", field_name),
        ));
    }
    if value.len() > max_length {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("{} must be less than {} characters", field_name, max_length),
        ));
    }
    Ok(())
}

pub fn validate_amount(amount: f64, field_name: &str) -> Result<(), (StatusCode, String)> {
    if amount == 0.0 || !amount.is_finite() {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("{} must be a non-zero number", field_name),
        ));
    }
    Ok(())
}

pub fn validate_quantity(quantity: f64) -> Result<(), (StatusCode, String)> {
    if quantity <= 0.0 || !quantity.is_finite() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Quantity must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Write paths require a parseable date; read paths drop bad dates silently.
pub fn validate_date(raw: &str) -> Result<(), (StatusCode, String)> {
    match parse_day(raw) {
        Some(_) => Ok(()),
        None => Err((
            StatusCode::BAD_REQUEST,
            "Date must start with YYYY-MM-DD".to_string(),
        )),
    }
}

pub fn validate_sales_limit(limit: Option<u32>) -> Result<u32, (StatusCode, String)> {
    match limit {
        Some(0) => Err((
            StatusCode::BAD_REQUEST,
            "Limit must be greater than 0".to_string(),
        )),
        Some(l) if l > MAX_SALES_LIMIT => Err((
            StatusCode::BAD_REQUEST,
            format!("Limit cannot exceed {}", MAX_SALES_LIMIT),
        )),
        Some(l) => Ok(l),
        None => Ok(DEFAULT_SALES_LIMIT),
    }
}
