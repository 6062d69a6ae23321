//! Shared helpers for payroll calculations.

use rust_decimal::Decimal;

/// Rounds a value to two decimal places, half-up (away from zero at the
/// midpoint), the convention used for every published currency amount.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use payroll_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(1234.454)), dec!(1234.45));
/// assert_eq!(round_half_up(dec!(1234.455)), dec!(1234.46));
/// assert_eq!(round_half_up(dec!(-1234.455)), dec!(-1234.46));
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Applies a percentage rate (`0..=100`) to an amount, unrounded.
pub fn percent_of(amount: Decimal, rate: Decimal) -> Decimal {
    amount * rate / Decimal::ONE_HUNDRED
}
