use chrono::{Month, NaiveDate};

use crate::error::{LedgerError, Result};

// ── Date-key components ───────────────────────────────────────────────────────

/// Year component of a date key: everything before the first `-`.
///
/// A key without any `-` is returned whole.
pub fn year_of(date: &str) -> &str {
    date.split('-').next().unwrap_or(date)
}

/// Numeric month component of a date key (between the first and second `-`).
///
/// Fails with [`LedgerError::InvalidMonth`] when the component is missing,
/// not a base-10 number, or outside `1..=12`.
pub fn month_number(date: &str) -> Result<u32> {
    let raw = date.split('-').nth(1).unwrap_or("");
    let invalid = || LedgerError::InvalidMonth {
        date: date.to_string(),
        month: raw.to_string(),
    };

    let number: u32 = raw.parse().map_err(|_| invalid())?;
    if (1..=12).contains(&number) {
        Ok(number)
    } else {
        Err(invalid())
    }
}

/// Full English month name for the month component of a date key.
///
/// ```
/// use ledger_core::calendar::month_name;
///
/// assert_eq!(month_name("2024-01-01").unwrap(), "January");
/// assert_eq!(month_name("2024-12-31").unwrap(), "December");
/// assert!(month_name("2024-13-01").is_err());
/// ```
pub fn month_name(date: &str) -> Result<&'static str> {
    let number = month_number(date)?;
    let month = Month::try_from(number as u8).map_err(|_| LedgerError::InvalidMonth {
        date: date.to_string(),
        month: number.to_string(),
    })?;
    Ok(month.name())
}

// ── Strict validation ─────────────────────────────────────────────────────────

/// `true` when `date` is a real calendar date written as `YYYY-MM-DD`.
pub fn is_calendar_date(date: &str) -> bool {
    date.len() == 10 && NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
