//! Internal helpers for form validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! parsing of raw form text so every operation reports the same errors.

use chrono::NaiveDate;
use sea_orm::{DbErr, SqlErr};

use crate::{EngineError, ResultEngine};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Trimmed, non-empty text or `None`.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Require a non-blank text field, returning it trimmed.
pub(crate) fn required_text(value: Option<&str>, label: &str) -> ResultEngine<String> {
    non_blank(value)
        .map(ToString::to_string)
        .ok_or_else(|| EngineError::MissingField(label.to_string()))
}

/// Require a non-empty secret. Secrets are compared verbatim, never trimmed.
pub(crate) fn required_secret(value: Option<&str>, label: &str) -> ResultEngine<String> {
    match value {
        Some(secret) if !secret.is_empty() => Ok(secret.to_string()),
        _ => Err(EngineError::MissingField(label.to_string())),
    }
}

/// Parse the mandatory `election_id` of a lookup or delete.
pub(crate) fn parse_election_id(value: Option<&str>) -> ResultEngine<i32> {
    let raw = non_blank(value).ok_or(EngineError::MissingElection)?;
    raw.parse()
        .map_err(|_| EngineError::InvalidElection(raw.to_string()))
}

/// Parse an optional election reference; blank means "none".
pub(crate) fn parse_optional_election_id(value: Option<&str>) -> ResultEngine<Option<i32>> {
    non_blank(value)
        .map(|raw| {
            raw.parse()
                .map_err(|_| EngineError::InvalidElection(raw.to_string()))
        })
        .transpose()
}

/// Parse an optional record id; blank means "none".
pub(crate) fn parse_optional_id(value: Option<&str>, label: &str) -> ResultEngine<Option<i32>> {
    non_blank(value)
        .map(|raw| {
            raw.parse()
                .map_err(|_| EngineError::InvalidId(format!("{label} id \"{raw}\"")))
        })
        .transpose()
}

/// Parse a mandatory record id.
pub(crate) fn parse_required_id(value: Option<&str>, label: &str) -> ResultEngine<i32> {
    parse_optional_id(value, label)?.ok_or_else(|| EngineError::MissingField(capitalize(label)))
}

/// Parse a calendar date in `YYYY-MM-DD` form.
pub(crate) fn parse_date(value: Option<&str>, label: &str) -> ResultEngine<NaiveDate> {
    let raw = required_text(value, label)?;
    NaiveDate::parse_from_str(&raw, DATE_FORMAT).map_err(|_| EngineError::BadDateFormat(raw))
}

/// Parse a positive integer, defaulting to 1 when blank.
pub(crate) fn parse_positive_or_one(value: Option<&str>, label: &str) -> ResultEngine<i32> {
    let Some(raw) = non_blank(value) else {
        return Ok(1);
    };
    match raw.parse::<i32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(EngineError::InvalidPositiveInteger(label.to_string())),
    }
}

/// `true` when the database rejected a write because of a unique index.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
