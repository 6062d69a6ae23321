use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::models::{
    AdditionalTaxRule, BonusReliefBand, BonusTaxRate, BonusType, ContractType, ContributionRate,
    IrpefBracket, NewAdditionalTaxRule, NewBonusReliefBand, NewIrpefBracket, NewSalaryScenario,
    SalaryScenario,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Record not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Storage abstraction over every payroll rate table.
///
/// Conventions:
/// * keyed tables (contribution rates, bonus withholding rates) are
///   upserted and fetched by their natural key, `NotFound` when absent;
/// * row tables (IRPEF brackets, additional rules, relief bands) are
///   created one row at a time and deleted by id or in bulk by year;
/// * the additional-rule getters return `Ok(None)` for an unconfigured
///   region/municipality; absence is a legitimate state there, not an
///   error (the engine charges a zero surcharge).
#[async_trait]
pub trait PayrollRepository: Send + Sync {
    /// Years that have at least one IRPEF bracket configured, newest first.
    async fn list_years(&self) -> Result<Vec<i32>, RepositoryError>;

    // IRPEF brackets
    async fn get_irpef_brackets(&self, year: i32) -> Result<Vec<IrpefBracket>, RepositoryError>;
    async fn create_irpef_bracket(
        &self,
        bracket: NewIrpefBracket,
    ) -> Result<IrpefBracket, RepositoryError>;
    async fn delete_irpef_bracket(&self, id: i64) -> Result<(), RepositoryError>;
    async fn delete_irpef_brackets(&self, year: i32) -> Result<u64, RepositoryError>;

    // Contribution rates
    async fn get_contribution_rate(
        &self,
        year: i32,
        contract_type: ContractType,
    ) -> Result<ContributionRate, RepositoryError>;
    async fn upsert_contribution_rate(
        &self,
        rate: &ContributionRate,
    ) -> Result<(), RepositoryError>;
    async fn delete_contribution_rates(&self, year: i32) -> Result<u64, RepositoryError>;

    // Regional / municipal additionals
    async fn get_regional_additional(
        &self,
        year: i32,
        region: &str,
    ) -> Result<Option<AdditionalTaxRule>, RepositoryError>;
    async fn get_municipal_additional(
        &self,
        year: i32,
        region: &str,
        municipality: &str,
    ) -> Result<Option<AdditionalTaxRule>, RepositoryError>;
    async fn create_additional_rule(
        &self,
        rule: NewAdditionalTaxRule,
    ) -> Result<AdditionalTaxRule, RepositoryError>;
    async fn delete_additional_rule(&self, id: i64) -> Result<(), RepositoryError>;
    async fn delete_additional_rules(&self, year: i32) -> Result<u64, RepositoryError>;

    // L.207 relief bands
    async fn get_relief_bands(&self, year: i32) -> Result<Vec<BonusReliefBand>, RepositoryError>;
    async fn create_relief_band(
        &self,
        band: NewBonusReliefBand,
    ) -> Result<BonusReliefBand, RepositoryError>;
    async fn delete_relief_band(&self, id: i64) -> Result<(), RepositoryError>;
    async fn delete_relief_bands(&self, year: i32) -> Result<u64, RepositoryError>;

    // Bonus withholding rates
    async fn get_bonus_tax_rate(
        &self,
        year: i32,
        bonus_type: BonusType,
    ) -> Result<Decimal, RepositoryError>;
    async fn list_bonus_tax_rates(&self, year: i32)
    -> Result<Vec<BonusTaxRate>, RepositoryError>;
    async fn upsert_bonus_tax_rate(&self, rate: &BonusTaxRate) -> Result<(), RepositoryError>;
    async fn delete_bonus_tax_rates(&self, year: i32) -> Result<u64, RepositoryError>;

    // Saved scenarios
    async fn create_scenario(
        &self,
        scenario: NewSalaryScenario,
    ) -> Result<SalaryScenario, RepositoryError>;
    async fn get_scenario(&self, id: i64) -> Result<SalaryScenario, RepositoryError>;
    async fn update_scenario(&self, scenario: &SalaryScenario) -> Result<(), RepositoryError>;
    async fn delete_scenario(&self, id: i64) -> Result<(), RepositoryError>;
    async fn list_scenarios(
        &self,
        year: Option<i32>,
    ) -> Result<Vec<SalaryScenario>, RepositoryError>;
}
