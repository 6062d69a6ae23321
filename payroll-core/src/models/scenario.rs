use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ContractType;

/// A saved salary computation: the inputs the operator entered plus the
/// headline results, so negotiations can be compared later without
/// re-running the engine against possibly-changed rate tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryScenario {
    pub id: i64,
    pub label: Option<String>,

    // Inputs
    pub year: i32,
    pub contract_type: ContractType,
    pub region: Option<String>,
    pub municipality: Option<String>,
    pub gross_salary: Decimal,

    // Headline results, filled in once computed
    pub net_salary: Option<Decimal>,
    pub company_cost: Option<Decimal>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For creating new scenarios (no id or timestamps).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSalaryScenario {
    pub label: Option<String>,
    pub year: i32,
    pub contract_type: ContractType,
    pub region: Option<String>,
    pub municipality: Option<String>,
    pub gross_salary: Decimal,
    pub net_salary: Option<Decimal>,
    pub company_cost: Option<Decimal>,
}
