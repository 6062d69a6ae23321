use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One IRPEF bracket row for a tax year.
///
/// `rate` is a percentage in `[0, 100]`. `max` of `None` marks the
/// unbounded top bracket. Brackets for a year must be contiguous,
/// start at zero and be ordered by `min` ascending; validation lives in
/// [`crate::calculations::brackets`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrpefBracket {
    pub id: i64,
    pub year: i32,
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub rate: Decimal,
}

/// For creating new brackets (no id yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIrpefBracket {
    pub year: i32,
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub rate: Decimal,
}
