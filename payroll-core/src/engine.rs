//! Service layer: assembles [`TaxYearTables`] snapshots from storage and
//! runs the calculators against them.
//!
//! Every request reads a fresh snapshot, so concurrent table edits can
//! at worst make two requests disagree with each other, never corrupt a
//! single computation.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::bonus::{self, BonusBreakdown, BonusError};
use crate::calculations::salary::{SalaryBreakdown, SalaryCalculator, SalaryError};
use crate::calculations::solver::{self, SolverConfig, SolverError};
use crate::db::repository::{PayrollRepository, RepositoryError};
use crate::models::{BonusType, ContractType, TaxYearTables};

/// Identifies the rate tables a salary computation should run against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalaryQuery {
    pub year: i32,
    pub contract_type: ContractType,
    pub region: Option<String>,
    pub municipality: Option<String>,
}

impl SalaryQuery {
    pub fn new(year: i32, contract_type: ContractType) -> Self {
        Self {
            year,
            contract_type,
            region: None,
            municipality: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_municipality(mut self, municipality: impl Into<String>) -> Self {
        self.municipality = Some(municipality.into());
        self
    }
}

/// Errors surfaced by the engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// No IRPEF brackets exist for the requested year.
    #[error("no tax configuration for year {0}")]
    YearNotConfigured(i32),

    /// No contribution rates exist for the contract type in that year.
    #[error("no contribution rates for {} in year {year}", .contract_type.as_str())]
    ContributionsNotConfigured {
        year: i32,
        contract_type: ContractType,
    },

    /// No withholding rate configured for the bonus type in that year.
    #[error("no withholding rate for {} in year {year}", .bonus_type.as_str())]
    BonusRateNotConfigured { year: i32, bonus_type: BonusType },

    #[error(transparent)]
    Salary(#[from] SalaryError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Bonus(#[from] BonusError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Stateless facade over a [`PayrollRepository`].
pub struct PayrollEngine<'a> {
    repo: &'a dyn PayrollRepository,
}

impl<'a> PayrollEngine<'a> {
    pub fn new(repo: &'a dyn PayrollRepository) -> Self {
        Self { repo }
    }

    /// Reads every table the query needs into one immutable snapshot.
    ///
    /// A region or municipality without a configured rule produces a
    /// snapshot without that rule (zero surcharge); a missing year or
    /// contract type is an error.
    pub async fn load_tables(&self, query: &SalaryQuery) -> Result<TaxYearTables, EngineError> {
        let irpef_brackets = self.repo.get_irpef_brackets(query.year).await?;
        if irpef_brackets.is_empty() {
            return Err(EngineError::YearNotConfigured(query.year));
        }

        let contributions = match self
            .repo
            .get_contribution_rate(query.year, query.contract_type)
            .await
        {
            Ok(rates) => rates,
            Err(RepositoryError::NotFound) => {
                return Err(EngineError::ContributionsNotConfigured {
                    year: query.year,
                    contract_type: query.contract_type,
                });
            }
            Err(e) => return Err(e.into()),
        };

        let regional = match &query.region {
            Some(region) => {
                let rule = self.repo.get_regional_additional(query.year, region).await?;
                if rule.is_none() {
                    warn!(year = query.year, %region, "no regional additional rule, surcharge is zero");
                }
                rule
            }
            None => None,
        };

        let municipal = match (&query.region, &query.municipality) {
            (Some(region), Some(municipality)) => {
                let rule = self
                    .repo
                    .get_municipal_additional(query.year, region, municipality)
                    .await?;
                if rule.is_none() {
                    warn!(
                        year = query.year,
                        %region,
                        %municipality,
                        "no municipal additional rule, surcharge is zero"
                    );
                }
                rule
            }
            _ => None,
        };

        let relief_bands = self.repo.get_relief_bands(query.year).await?;

        debug!(
            year = query.year,
            contract_type = query.contract_type.as_str(),
            brackets = irpef_brackets.len(),
            relief_bands = relief_bands.len(),
            "assembled tax year tables"
        );

        Ok(TaxYearTables {
            year: query.year,
            irpef_brackets,
            contributions,
            regional,
            municipal,
            relief_bands,
        })
    }

    /// Gross → net with the full breakdown.
    pub async fn net_from_gross(
        &self,
        gross: Decimal,
        query: &SalaryQuery,
    ) -> Result<SalaryBreakdown, EngineError> {
        let tables = self.load_tables(query).await?;
        Ok(SalaryCalculator::new(&tables).net_from_gross(gross)?)
    }

    /// Net → gross with the default solver settings.
    pub async fn gross_from_net(
        &self,
        net: Decimal,
        query: &SalaryQuery,
    ) -> Result<SalaryBreakdown, EngineError> {
        self.gross_from_net_with(net, query, &SolverConfig::default())
            .await
    }

    /// Net → gross with explicit solver settings.
    pub async fn gross_from_net_with(
        &self,
        net: Decimal,
        query: &SalaryQuery,
        config: &SolverConfig,
    ) -> Result<SalaryBreakdown, EngineError> {
        let tables = self.load_tables(query).await?;
        Ok(solver::gross_for_net(&tables, net, config)?)
    }

    /// Bonus gross → net. `custom_rate` overrides the stored rate.
    pub async fn bonus_net_from_gross(
        &self,
        year: i32,
        bonus_type: BonusType,
        gross: Decimal,
        custom_rate: Option<Decimal>,
    ) -> Result<BonusBreakdown, EngineError> {
        let rate = self.resolve_bonus_rate(year, bonus_type, custom_rate).await?;
        Ok(bonus::net_from_gross(gross, rate)?)
    }

    /// Bonus net → gross. `custom_rate` overrides the stored rate.
    pub async fn bonus_gross_from_net(
        &self,
        year: i32,
        bonus_type: BonusType,
        net: Decimal,
        custom_rate: Option<Decimal>,
    ) -> Result<BonusBreakdown, EngineError> {
        let rate = self.resolve_bonus_rate(year, bonus_type, custom_rate).await?;
        Ok(bonus::gross_from_net(net, rate)?)
    }

    async fn resolve_bonus_rate(
        &self,
        year: i32,
        bonus_type: BonusType,
        custom_rate: Option<Decimal>,
    ) -> Result<Decimal, EngineError> {
        if let Some(rate) = custom_rate {
            return Ok(rate);
        }
        match self.repo.get_bonus_tax_rate(year, bonus_type).await {
            Ok(rate) => Ok(rate),
            Err(RepositoryError::NotFound) => {
                Err(EngineError::BonusRateNotConfigured { year, bonus_type })
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use crate::models::{
        AdditionalTaxRule, BonusReliefBand, BonusTaxRate, ContributionRate, IrpefBracket,
        NewAdditionalTaxRule, NewBonusReliefBand, NewIrpefBracket, NewSalaryScenario,
        SalaryScenario,
    };

    use super::*;

    /// In-memory repository with a fixed 2025 data set; write methods are
    /// unreachable from the engine and stay unimplemented.
    struct FixtureRepository;

    fn irpef_2025() -> Vec<IrpefBracket> {
        vec![
            IrpefBracket {
                id: 1,
                year: 2025,
                min: dec!(0),
                max: Some(dec!(28000)),
                rate: dec!(23),
            },
            IrpefBracket {
                id: 2,
                year: 2025,
                min: dec!(28000),
                max: Some(dec!(50000)),
                rate: dec!(35),
            },
            IrpefBracket {
                id: 3,
                year: 2025,
                min: dec!(50000),
                max: None,
                rate: dec!(43),
            },
        ]
    }

    #[async_trait]
    impl PayrollRepository for FixtureRepository {
        async fn list_years(&self) -> Result<Vec<i32>, RepositoryError> {
            Ok(vec![2025])
        }
        async fn get_irpef_brackets(
            &self,
            year: i32,
        ) -> Result<Vec<IrpefBracket>, RepositoryError> {
            if year == 2025 {
                Ok(irpef_2025())
            } else {
                Ok(Vec::new())
            }
        }
        async fn create_irpef_bracket(
            &self,
            _bracket: NewIrpefBracket,
        ) -> Result<IrpefBracket, RepositoryError> {
            unimplemented!()
        }
        async fn delete_irpef_bracket(&self, _id: i64) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn delete_irpef_brackets(&self, _year: i32) -> Result<u64, RepositoryError> {
            unimplemented!()
        }
        async fn get_contribution_rate(
            &self,
            year: i32,
            contract_type: ContractType,
        ) -> Result<ContributionRate, RepositoryError> {
            if year == 2025 && contract_type == ContractType::Professional {
                Ok(ContributionRate {
                    year: 2025,
                    contract_type: ContractType::Professional,
                    inps_worker: dec!(9.19),
                    inps_employer: dec!(30.0),
                    ffc_worker: dec!(6.25),
                    ffc_employer: dec!(0.0),
                    inail_employer: dec!(1.5),
                    solidarity_worker: dec!(0.0),
                    solidarity_employer: dec!(0.5),
                })
            } else {
                Err(RepositoryError::NotFound)
            }
        }
        async fn upsert_contribution_rate(
            &self,
            _rate: &ContributionRate,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn delete_contribution_rates(&self, _year: i32) -> Result<u64, RepositoryError> {
            unimplemented!()
        }
        async fn get_regional_additional(
            &self,
            year: i32,
            region: &str,
        ) -> Result<Option<AdditionalTaxRule>, RepositoryError> {
            if year == 2025 && region == "Marche" {
                Ok(Some(AdditionalTaxRule {
                    id: 1,
                    year: 2025,
                    region: "Marche".to_string(),
                    municipality: None,
                    is_progressive: false,
                    flat_rate: Some(dec!(1.23)),
                    brackets: Vec::new(),
                }))
            } else {
                Ok(None)
            }
        }
        async fn get_municipal_additional(
            &self,
            year: i32,
            region: &str,
            municipality: &str,
        ) -> Result<Option<AdditionalTaxRule>, RepositoryError> {
            if year == 2025 && region == "Marche" && municipality == "Pesaro" {
                Ok(Some(AdditionalTaxRule {
                    id: 2,
                    year: 2025,
                    region: "Marche".to_string(),
                    municipality: Some("Pesaro".to_string()),
                    is_progressive: false,
                    flat_rate: Some(dec!(0.5)),
                    brackets: Vec::new(),
                }))
            } else {
                Ok(None)
            }
        }
        async fn create_additional_rule(
            &self,
            _rule: NewAdditionalTaxRule,
        ) -> Result<AdditionalTaxRule, RepositoryError> {
            unimplemented!()
        }
        async fn delete_additional_rule(&self, _id: i64) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn delete_additional_rules(&self, _year: i32) -> Result<u64, RepositoryError> {
            unimplemented!()
        }
        async fn get_relief_bands(
            &self,
            _year: i32,
        ) -> Result<Vec<BonusReliefBand>, RepositoryError> {
            Ok(Vec::new())
        }
        async fn create_relief_band(
            &self,
            _band: NewBonusReliefBand,
        ) -> Result<BonusReliefBand, RepositoryError> {
            unimplemented!()
        }
        async fn delete_relief_band(&self, _id: i64) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn delete_relief_bands(&self, _year: i32) -> Result<u64, RepositoryError> {
            unimplemented!()
        }
        async fn get_bonus_tax_rate(
            &self,
            year: i32,
            bonus_type: BonusType,
        ) -> Result<Decimal, RepositoryError> {
            if year == 2025 && bonus_type == BonusType::Signing {
                Ok(dec!(23))
            } else {
                Err(RepositoryError::NotFound)
            }
        }
        async fn list_bonus_tax_rates(
            &self,
            _year: i32,
        ) -> Result<Vec<BonusTaxRate>, RepositoryError> {
            unimplemented!()
        }
        async fn upsert_bonus_tax_rate(
            &self,
            _rate: &BonusTaxRate,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn delete_bonus_tax_rates(&self, _year: i32) -> Result<u64, RepositoryError> {
            unimplemented!()
        }
        async fn create_scenario(
            &self,
            _scenario: NewSalaryScenario,
        ) -> Result<SalaryScenario, RepositoryError> {
            unimplemented!()
        }
        async fn get_scenario(&self, _id: i64) -> Result<SalaryScenario, RepositoryError> {
            unimplemented!()
        }
        async fn update_scenario(
            &self,
            _scenario: &SalaryScenario,
        ) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn delete_scenario(&self, _id: i64) -> Result<(), RepositoryError> {
            unimplemented!()
        }
        async fn list_scenarios(
            &self,
            _year: Option<i32>,
        ) -> Result<Vec<SalaryScenario>, RepositoryError> {
            unimplemented!()
        }
    }

    fn query() -> SalaryQuery {
        SalaryQuery::new(2025, ContractType::Professional)
            .with_region("Marche")
            .with_municipality("Pesaro")
    }

    #[tokio::test]
    async fn net_from_gross_uses_all_configured_rules() {
        let repo = FixtureRepository;
        let engine = PayrollEngine::new(&repo);

        let breakdown = engine.net_from_gross(dec!(50000), &query()).await.unwrap();

        assert_eq!(breakdown.taxable_income, dec!(42280.00));
        // Flat 1.23% regional and 0.5% municipal on 42280.
        assert_eq!(breakdown.regional_additional, dec!(520.04));
        assert_eq!(breakdown.municipal_additional, dec!(211.40));
        assert_eq!(
            breakdown.net_salary,
            dec!(42280.00) - dec!(11438.00) - dec!(520.04) - dec!(211.40)
        );
    }

    #[tokio::test]
    async fn unknown_region_falls_back_to_zero_surcharge() {
        let repo = FixtureRepository;
        let engine = PayrollEngine::new(&repo);
        let query = SalaryQuery::new(2025, ContractType::Professional).with_region("Lazio");

        let breakdown = engine.net_from_gross(dec!(50000), &query).await.unwrap();

        assert_eq!(breakdown.regional_additional, dec!(0.00));
        assert_eq!(breakdown.municipal_additional, dec!(0.00));
    }

    #[tokio::test]
    async fn missing_year_is_config_not_found() {
        let repo = FixtureRepository;
        let engine = PayrollEngine::new(&repo);
        let query = SalaryQuery::new(1999, ContractType::Professional);

        let result = engine.net_from_gross(dec!(50000), &query).await;

        assert!(matches!(result, Err(EngineError::YearNotConfigured(1999))));
    }

    #[tokio::test]
    async fn missing_contract_rates_is_config_not_found() {
        let repo = FixtureRepository;
        let engine = PayrollEngine::new(&repo);
        let query = SalaryQuery::new(2025, ContractType::Youth);

        let result = engine.net_from_gross(dec!(50000), &query).await;

        assert!(matches!(
            result,
            Err(EngineError::ContributionsNotConfigured {
                year: 2025,
                contract_type: ContractType::Youth,
            })
        ));
    }

    #[tokio::test]
    async fn gross_from_net_round_trips() {
        let repo = FixtureRepository;
        let engine = PayrollEngine::new(&repo);
        let q = query();

        let forward = engine.net_from_gross(dec!(80000), &q).await.unwrap();
        let solved = engine.gross_from_net(forward.net_salary, &q).await.unwrap();

        assert!((solved.net_salary - forward.net_salary).abs() <= dec!(0.01));
    }

    #[tokio::test]
    async fn bonus_uses_stored_rate() {
        let repo = FixtureRepository;
        let engine = PayrollEngine::new(&repo);

        let breakdown = engine
            .bonus_net_from_gross(2025, BonusType::Signing, dec!(10000), None)
            .await
            .unwrap();

        assert_eq!(breakdown.rate, dec!(23));
        assert_eq!(breakdown.net, dec!(7700.00));
    }

    #[tokio::test]
    async fn bonus_custom_rate_overrides_stored_rate() {
        let repo = FixtureRepository;
        let engine = PayrollEngine::new(&repo);

        let breakdown = engine
            .bonus_net_from_gross(2025, BonusType::Signing, dec!(10000), Some(dec!(10)))
            .await
            .unwrap();

        assert_eq!(breakdown.rate, dec!(10));
        assert_eq!(breakdown.net, dec!(9000.00));
    }

    #[tokio::test]
    async fn missing_bonus_rate_is_config_not_found() {
        let repo = FixtureRepository;
        let engine = PayrollEngine::new(&repo);

        let result = engine
            .bonus_net_from_gross(2025, BonusType::Transfer, dec!(10000), None)
            .await;

        assert!(matches!(
            result,
            Err(EngineError::BonusRateNotConfigured {
                year: 2025,
                bonus_type: BonusType::Transfer,
            })
        ));
    }

    #[tokio::test]
    async fn bonus_gross_from_net_fails_cleanly_at_full_withholding() {
        let repo = FixtureRepository;
        let engine = PayrollEngine::new(&repo);

        let result = engine
            .bonus_gross_from_net(2025, BonusType::Signing, dec!(1000), Some(dec!(100)))
            .await;

        assert!(matches!(
            result,
            Err(EngineError::Bonus(BonusError::FullWithholding))
        ));
    }
}
