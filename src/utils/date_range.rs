use chrono::{Datelike, NaiveDate};
use serde_json::json;

use crate::error::{AppError, AppResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
const MONTH_FORMAT: &str = "%Y-%m";

/// Start of an open-ended range (`startDate` left empty).
pub fn open_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// End of an open-ended range (`endDate` left empty).
pub fn open_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
}

/// Year and month, ordered chronologically.
pub type YearMonth = (i32, u32);

/// Strict `YYYY-MM-DD` parsing; anything that does not format back to the
/// same string (`2026-1-5`, surrounding whitespace) is rejected.
pub fn parse_date(value: &str) -> AppResult<NaiveDate> {
    let parsed = NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|err| {
        AppError::validation_with_details(
            "invalid date, expected YYYY-MM-DD",
            json!({"value": value, "error": err.to_string()}),
        )
    })?;

    if format_date(parsed) != value {
        return Err(AppError::validation_with_details(
            "invalid date, expected YYYY-MM-DD",
            json!({"value": value}),
        ));
    }

    Ok(parsed)
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Strict `YYYY-MM` parsing for employment change months.
pub fn parse_month(value: &str) -> AppResult<YearMonth> {
    let invalid = || {
        AppError::validation_with_details(
            "invalid month, expected YYYY-MM",
            json!({"value": value}),
        )
    };

    let first_of_month =
        NaiveDate::parse_from_str(&format!("{value}-01"), DATE_FORMAT).map_err(|_| invalid())?;
    if first_of_month.format(MONTH_FORMAT).to_string() != value {
        return Err(invalid());
    }

    Ok((first_of_month.year(), first_of_month.month()))
}

pub fn year_month(date: NaiveDate) -> YearMonth {
    (date.year(), date.month())
}

/// Inclusive intersection of two closed ranges, `None` when they are disjoint.
pub fn overlap(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> Option<(NaiveDate, NaiveDate)> {
    let start = a_start.max(b_start);
    let end = a_end.min(b_end);
    if end < start {
        None
    } else {
        Some((start, end))
    }
}

/// Resolves a possibly open-ended range. Empty (or blank) bounds become
/// [`open_start`] / [`open_end`]; explicit bounds must parse strictly and the
/// resulting range must not be reversed.
pub fn resolve_open_range(start: &str, end: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let start_date = if start.trim().is_empty() {
        open_start()
    } else {
        parse_date(start)?
    };
    let end_date = if end.trim().is_empty() {
        open_end()
    } else {
        parse_date(end)?
    };

    if end_date < start_date {
        return Err(AppError::validation_with_details(
            "start date must not be after end date",
            json!({"startDate": start, "endDate": end}),
        ));
    }

    Ok((start_date, end_date))
}

/// Parses a closed range where both bounds are required.
pub fn parse_closed_range(start: &str, end: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let start_date = parse_date(start)?;
    let end_date = parse_date(end)?;
    if end_date < start_date {
        return Err(AppError::validation_with_details(
            "start date must not be after end date",
            json!({"startDate": start, "endDate": end}),
        ));
    }
    Ok((start_date, end_date))
}

pub fn days_inclusive(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}
