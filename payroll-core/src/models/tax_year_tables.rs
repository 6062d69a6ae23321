use serde::{Deserialize, Serialize};

use super::{AdditionalTaxRule, BonusReliefBand, ContributionRate, IrpefBracket};

/// Immutable snapshot of every rate table a salary computation needs,
/// assembled for one (year, contract type, region, municipality) query.
///
/// Calculations never touch storage: they read from this snapshot only,
/// so an in-flight computation is unaffected by concurrent table edits
/// (it simply sees the tables as they were when the snapshot was read).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxYearTables {
    pub year: i32,
    /// IRPEF brackets, ordered by `min` ascending.
    pub irpef_brackets: Vec<IrpefBracket>,
    /// Contribution rates for the requested contract type.
    pub contributions: ContributionRate,
    /// Regional surcharge rule, if one is configured for the region.
    pub regional: Option<AdditionalTaxRule>,
    /// Municipal surcharge rule, if one is configured for the municipality.
    pub municipal: Option<AdditionalTaxRule>,
    /// L.207 relief bands, possibly empty.
    pub relief_bands: Vec<BonusReliefBand>,
}
