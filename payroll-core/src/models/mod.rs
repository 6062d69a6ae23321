mod additional_rule;
mod bonus_rate;
mod bonus_type;
mod contract_type;
mod contribution_rate;
mod irpef_bracket;
mod relief_band;
mod scenario;
mod tax_year_tables;

pub use additional_rule::{AdditionalTaxRule, NewAdditionalTaxRule, RateBracket, RuleShapeError};
pub use bonus_rate::BonusTaxRate;
pub use bonus_type::BonusType;
pub use contract_type::ContractType;
pub use contribution_rate::ContributionRate;
pub use irpef_bracket::{IrpefBracket, NewIrpefBracket};
pub use relief_band::{BonusReliefBand, NewBonusReliefBand};
pub use scenario::{NewSalaryScenario, SalaryScenario};
pub use tax_year_tables::TaxYearTables;
