use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ContractType;

/// Social-contribution percentages for one (year, contract type) pair.
///
/// Worker-side rates are withheld from gross pay before IRPEF applies;
/// employer-side rates are charged on top of gross to form the company
/// cost. All values are percentages in `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributionRate {
    pub year: i32,
    pub contract_type: ContractType,
    pub inps_worker: Decimal,
    pub inps_employer: Decimal,
    pub ffc_worker: Decimal,
    pub ffc_employer: Decimal,
    pub inail_employer: Decimal,
    pub solidarity_worker: Decimal,
    pub solidarity_employer: Decimal,
}

impl ContributionRate {
    /// Sum of the worker-side percentages.
    pub fn worker_total(&self) -> Decimal {
        self.inps_worker + self.ffc_worker + self.solidarity_worker
    }
}
