//! Flat-rate bonus withholding.
//!
//! Bonuses (signing fees, image rights, loyalty, accommodation, car
//! allowance, transfer allowance) are taxed at a single flat rate per
//! type and year, separately from salary: `net = gross × (1 − rate/100)`.
//! The inverse divides by `(1 − rate/100)`, which is undefined at a 100%
//! rate; that case must fail explicitly rather than leak an infinity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::common::{percent_of, round_half_up};

/// Errors from bonus withholding arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BonusError {
    /// Bonus amounts cannot be negative.
    #[error("bonus amount {0} is negative")]
    NegativeAmount(Decimal),

    /// Withholding rates are percentages.
    #[error("withholding rate {0} outside 0..=100")]
    RateOutOfRange(Decimal),

    /// At a 100% rate every gross maps to net zero, so no gross can be
    /// recovered from a net amount.
    #[error("cannot derive gross from net at a 100% withholding rate")]
    FullWithholding,
}

/// Result of a bonus conversion in either direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusBreakdown {
    pub gross: Decimal,
    pub withholding: Decimal,
    pub net: Decimal,
    /// The flat rate that was applied, in percent.
    pub rate: Decimal,
}

fn check_rate(rate: Decimal) -> Result<(), BonusError> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(BonusError::RateOutOfRange(rate));
    }
    Ok(())
}

/// Gross → net at a flat withholding rate.
pub fn net_from_gross(gross: Decimal, rate: Decimal) -> Result<BonusBreakdown, BonusError> {
    if gross < Decimal::ZERO {
        return Err(BonusError::NegativeAmount(gross));
    }
    check_rate(rate)?;

    let withholding = percent_of(gross, rate);
    Ok(BonusBreakdown {
        gross: round_half_up(gross),
        withholding: round_half_up(withholding),
        net: round_half_up(gross - withholding),
        rate,
    })
}

/// Net → gross at a flat withholding rate.
///
/// # Errors
///
/// [`BonusError::FullWithholding`] when `rate` is exactly 100: the
/// forward map collapses to zero and has no inverse.
pub fn gross_from_net(net: Decimal, rate: Decimal) -> Result<BonusBreakdown, BonusError> {
    if net < Decimal::ZERO {
        return Err(BonusError::NegativeAmount(net));
    }
    check_rate(rate)?;
    if rate == Decimal::ONE_HUNDRED {
        return Err(BonusError::FullWithholding);
    }

    let keep = (Decimal::ONE_HUNDRED - rate) / Decimal::ONE_HUNDRED;
    let gross = net / keep;
    Ok(BonusBreakdown {
        gross: round_half_up(gross),
        withholding: round_half_up(gross - net),
        net: round_half_up(net),
        rate,
    })
}
