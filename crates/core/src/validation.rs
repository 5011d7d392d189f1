//! Input validation policy shared by every entry point.
//!
//! Stock, recipe and account input all pass through these helpers so the
//! accepted formats are defined once.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::error::{DomainError, DomainResult};

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\s]+$").expect("name pattern compiles"));

static USERNAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("username pattern compiles"));

static DATE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern compiles"));

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Validate a dish or ingredient name.
///
/// Surrounding whitespace is trimmed; the remainder must consist of ASCII
/// letters, digits and whitespace.
pub fn validate_name(kind: &str, raw: &str) -> DomainResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DomainError::validation(format!("{kind} name is required")));
    }
    if !NAME_PATTERN.is_match(name) {
        return Err(DomainError::validation(format!(
            "{kind} name may contain only letters, digits and spaces: '{name}'"
        )));
    }
    Ok(name.to_string())
}

/// Parse an integer quantity typed by a user.
pub fn parse_quantity(label: &str, raw: &str) -> DomainResult<i64> {
    let trimmed = raw.trim();
    trimmed.parse::<i64>().map_err(|_| {
        DomainError::validation(format!("{label} quantity must be an integer: '{trimmed}'"))
    })
}

/// Stock on hand may be zero but never negative.
pub fn validate_stock_quantity(quantity: i64) -> DomainResult<i64> {
    if quantity < 0 {
        return Err(DomainError::validation("quantity cannot be negative"));
    }
    Ok(quantity)
}

/// Recipe lines must require a strictly positive amount.
pub fn validate_required_quantity(ingredient: &str, quantity: i64) -> DomainResult<i64> {
    if quantity <= 0 {
        return Err(DomainError::validation(format!(
            "{ingredient} quantity must be positive"
        )));
    }
    Ok(quantity)
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_stock_date(raw: &str) -> DomainResult<NaiveDate> {
    let trimmed = raw.trim();
    if !DATE_PATTERN.is_match(trimmed) {
        return Err(DomainError::validation("date must be in YYYY-MM-DD format"));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| DomainError::validation(format!("not a valid calendar date: '{trimmed}'")))
}

pub fn validate_username(raw: &str) -> DomainResult<String> {
    if !USERNAME_PATTERN.is_match(raw) {
        return Err(DomainError::validation(
            "username may contain only letters and digits",
        ));
    }
    Ok(raw.to_string())
}

pub fn validate_password(raw: &str) -> DomainResult<()> {
    if raw.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
