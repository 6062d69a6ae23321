//! CSV importers for the payroll rate tables.
//!
//! Files come from club back offices, so the parsers accept what those
//! exports actually contain: comma- or semicolon-separated columns,
//! decimal commas, and `%` suffixes on rate values. Each loader is
//! idempotent per year group (delete-and-reload, or keyed upsert).

mod bonus_rates;
mod contributions;
mod irpef;

pub use bonus_rates::{BonusTaxRateLoader, BonusTaxRateRecord};
pub use contributions::{ContributionRateLoader, ContributionRateRecord};
pub use irpef::{IrpefBracketLoader, IrpefBracketRecord};

use payroll_core::{BracketError, RepositoryError};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors from parsing or loading rate CSVs.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unknown contract type '{0}'")]
    UnknownContractType(String),

    #[error("Unknown bonus type '{0}'")]
    UnknownBonusType(String),

    #[error("Brackets for year {year} are invalid: {source}")]
    InvalidBrackets {
        year: i32,
        #[source]
        source: BracketError,
    },

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for LoaderError {
    fn from(err: csv::Error) -> Self {
        LoaderError::CsvParse(err.to_string())
    }
}

/// Picks the column separator from the header line: Italian exports use
/// `;` (comma is the decimal separator there), everything else `,`.
pub(crate) fn detect_delimiter(data: &[u8]) -> u8 {
    let first_line = data.split(|&b| b == b'\n').next().unwrap_or(data);
    if first_line.contains(&b';') { b';' } else { b',' }
}

/// Parses a rate cell: trims whitespace, strips a trailing `%`, and
/// accepts a decimal comma (`"23,5%"` → `23.5`).
pub(crate) fn parse_rate_cell(s: &str) -> Result<Decimal, String> {
    let cleaned = s.trim().trim_end_matches('%').trim().replace(',', ".");
    cleaned
        .parse::<Decimal>()
        .map_err(|e| format!("invalid rate '{}': {}", s, e))
}

pub(crate) fn de_rate<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: String = serde::Deserialize::deserialize(deserializer)?;
    parse_rate_cell(&s).map_err(serde::de::Error::custom)
}

pub(crate) fn de_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = serde::Deserialize::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => s
            .trim()
            .parse::<Decimal>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}
