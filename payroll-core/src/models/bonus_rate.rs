use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::BonusType;

/// Flat withholding percentage for one (year, bonus type) pair.
///
/// Keyed table: upserted rather than created/updated separately. A call
/// may override the stored rate with a custom one (see
/// [`crate::calculations::bonus`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusTaxRate {
    pub year: i32,
    pub bonus_type: BonusType,
    pub rate: Decimal,
}
