//! Parsing helpers for values persisted as TEXT.
//!
//! Decimals are stored as their canonical string form so they round-trip
//! exactly; timestamps are stored as `%Y-%m-%d %H:%M:%S` UTC strings.

use chrono::{DateTime, Utc};
use payroll_core::RepositoryError;
use rust_decimal::Decimal;

pub fn parse_decimal(s: &str) -> Result<Decimal, RepositoryError> {
    s.parse::<Decimal>()
        .map_err(|e| RepositoryError::Database(format!("Failed to parse decimal '{}': {}", s, e)))
}

pub fn parse_optional_decimal(s: &Option<String>) -> Result<Option<Decimal>, RepositoryError> {
    s.as_ref().map(|s| parse_decimal(s)).transpose()
}

pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    // SQLite has no datetime type; accept the formats we may encounter.
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| {
            RepositoryError::Database(format!("Failed to parse datetime '{}': {}", s, e))
        })
}
