//! Progressive bracket arithmetic shared by the IRPEF computation and
//! progressive additional-tax rules.
//!
//! A bracket table is an ordered list of `(min, max, rate)` spans. Tax is
//! the sum, over every span the income reaches into, of
//! `rate × portion-of-income-inside-the-span`, so the portions partition
//! the income exactly: no double counting and no gaps at boundaries.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::calculations::common::percent_of;
use crate::models::{IrpefBracket, RateBracket};

/// Shape violations of a bracket table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BracketError {
    /// The table has no rows.
    #[error("no brackets configured")]
    Empty,

    /// The first bracket must start at zero.
    #[error("first bracket starts at {0}, expected 0")]
    FirstNotZero(Decimal),

    /// A bracket does not continue where the previous one ended.
    #[error("bracket starting at {found} does not continue from {expected}")]
    Discontinuous { expected: Decimal, found: Decimal },

    /// A bracket's upper bound is not above its lower bound.
    #[error("bracket [{min}, {max}] is empty or inverted")]
    EmptySpan { min: Decimal, max: Decimal },

    /// An unbounded bracket may only appear in the last position.
    #[error("unbounded bracket at position {0} is not the last")]
    UnboundedNotLast(usize),

    /// Rates are percentages.
    #[error("rate {0} outside 0..=100")]
    RateOutOfRange(Decimal),
}

/// One `(min, max, rate)` span, the common denominator of
/// [`IrpefBracket`] and [`RateBracket`] rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketSpan {
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub rate: Decimal,
}

impl From<&IrpefBracket> for BracketSpan {
    fn from(b: &IrpefBracket) -> Self {
        Self {
            min: b.min,
            max: b.max,
            rate: b.rate,
        }
    }
}

impl From<&RateBracket> for BracketSpan {
    fn from(b: &RateBracket) -> Self {
        Self {
            min: b.min,
            max: b.max,
            rate: b.rate,
        }
    }
}

/// Checks ordering, contiguity from zero, rate ranges, and that at most
/// one span is unbounded (and only in the last position).
pub fn validate(spans: &[BracketSpan]) -> Result<(), BracketError> {
    if spans.is_empty() {
        return Err(BracketError::Empty);
    }

    let mut expected = Decimal::ZERO;
    for (i, span) in spans.iter().enumerate() {
        if i == 0 && span.min != Decimal::ZERO {
            return Err(BracketError::FirstNotZero(span.min));
        }
        if span.min != expected {
            return Err(BracketError::Discontinuous {
                expected,
                found: span.min,
            });
        }
        if span.rate < Decimal::ZERO || span.rate > Decimal::ONE_HUNDRED {
            return Err(BracketError::RateOutOfRange(span.rate));
        }
        match span.max {
            Some(max) => {
                if max <= span.min {
                    return Err(BracketError::EmptySpan { min: span.min, max });
                }
                expected = max;
            }
            None => {
                if i != spans.len() - 1 {
                    return Err(BracketError::UnboundedNotLast(i));
                }
            }
        }
    }

    Ok(())
}

/// Progressive tax over a validated table, unrounded.
///
/// Income at or below zero owes nothing. Portions are computed as
/// `min(income, span.max) − span.min` for every span the income enters,
/// so the sum of portions equals the income (up to the table's upper
/// bound, when the table is bounded).
pub fn progressive_tax(income: Decimal, spans: &[BracketSpan]) -> Decimal {
    if income <= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut total = Decimal::ZERO;
    for span in spans {
        if income <= span.min {
            break;
        }
        let top = span.max.map_or(income, |max| max.min(income));
        total += percent_of(top - span.min, span.rate);
    }
    total
}
