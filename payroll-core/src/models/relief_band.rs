use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One L.207-style relief band for a tax year.
///
/// When taxable income falls inside `[min_income, max_income]` (both
/// inclusive, `max_income` of `None` unbounded), gross IRPEF is reduced
/// by `bonus_percentage` percent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusReliefBand {
    pub id: i64,
    pub year: i32,
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub bonus_percentage: Decimal,
}

/// For creating new bands (no id yet).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBonusReliefBand {
    pub year: i32,
    pub min_income: Decimal,
    pub max_income: Option<Decimal>,
    pub bonus_percentage: Decimal,
}

impl BonusReliefBand {
    /// Whether `taxable_income` falls inside this band.
    pub fn matches(&self, taxable_income: Decimal) -> bool {
        taxable_income >= self.min_income
            && self.max_income.is_none_or(|max| taxable_income <= max)
    }
}
