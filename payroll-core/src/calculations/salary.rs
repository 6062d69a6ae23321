//! Gross-to-net salary computation.
//!
//! The forward pass follows the statutory order: worker contributions
//! come off gross pay first, IRPEF is charged progressively on what
//! remains, L.207 relief then discounts the IRPEF, and the regional and
//! municipal surcharges are charged on the same taxable base,
//! independent of the relief. Employer contributions never touch the
//! worker's net; they only raise the company cost.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use payroll_core::calculations::SalaryCalculator;
//! use payroll_core::models::{
//!     ContractType, ContributionRate, IrpefBracket, TaxYearTables,
//! };
//!
//! let tables = TaxYearTables {
//!     year: 2025,
//!     irpef_brackets: vec![
//!         IrpefBracket { id: 1, year: 2025, min: dec!(0), max: Some(dec!(28000)), rate: dec!(23) },
//!         IrpefBracket { id: 2, year: 2025, min: dec!(28000), max: Some(dec!(50000)), rate: dec!(35) },
//!         IrpefBracket { id: 3, year: 2025, min: dec!(50000), max: None, rate: dec!(43) },
//!     ],
//!     contributions: ContributionRate {
//!         year: 2025,
//!         contract_type: ContractType::Professional,
//!         inps_worker: dec!(9.19),
//!         inps_employer: dec!(30.0),
//!         ffc_worker: dec!(6.25),
//!         ffc_employer: dec!(0.0),
//!         inail_employer: dec!(1.5),
//!         solidarity_worker: dec!(0.0),
//!         solidarity_employer: dec!(0.5),
//!     },
//!     regional: None,
//!     municipal: None,
//!     relief_bands: vec![],
//! };
//!
//! let breakdown = SalaryCalculator::new(&tables)
//!     .net_from_gross(dec!(50000))
//!     .unwrap();
//!
//! assert_eq!(breakdown.taxable_income, dec!(42280.00));
//! assert_eq!(breakdown.company_cost, dec!(66000.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculations::brackets::{self, BracketError, BracketSpan};
use crate::calculations::common::{percent_of, round_half_up};
use crate::models::{AdditionalTaxRule, ContractType, RuleShapeError, TaxYearTables};

/// Errors from the gross-to-net computation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SalaryError {
    /// Gross pay cannot be negative.
    #[error("gross salary {0} is negative")]
    NegativeGross(Decimal),

    /// The year's IRPEF table violates the bracket invariants.
    #[error("IRPEF table for year {year} is invalid: {source}")]
    InvalidIrpefTable {
        year: i32,
        #[source]
        source: BracketError,
    },

    /// An additional rule mixes or misses its flat/progressive shape.
    #[error(transparent)]
    InvalidRuleShape(#[from] RuleShapeError),

    /// A progressive additional rule carries an invalid bracket table.
    #[error("additional rule for {region} has invalid brackets: {source}")]
    InvalidAdditionalBrackets {
        region: String,
        #[source]
        source: BracketError,
    },
}

/// Full per-line result of a salary computation.
///
/// Every amount is rounded to two decimals. `net_salary` is derived from
/// the unrounded intermediate values, so it can differ from the sum of
/// the displayed lines by at most a cent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalaryBreakdown {
    pub gross_salary: Decimal,

    // Worker-side contributions
    pub inps_worker: Decimal,
    pub ffc_worker: Decimal,
    pub solidarity_worker: Decimal,
    pub worker_contributions: Decimal,

    // Taxes
    pub taxable_income: Decimal,
    /// IRPEF before L.207 relief.
    pub irpef_gross: Decimal,
    /// Relief percentage applied (zero when no band matched).
    pub relief_percentage: Decimal,
    /// IRPEF actually owed, after relief.
    pub irpef: Decimal,
    pub regional_additional: Decimal,
    pub municipal_additional: Decimal,

    pub net_salary: Decimal,

    // Employer side
    pub inps_employer: Decimal,
    pub inail_employer: Decimal,
    pub ffc_employer: Decimal,
    pub solidarity_employer: Decimal,
    pub employer_contributions: Decimal,
    pub company_cost: Decimal,
}

/// Deterministic forward calculator over one [`TaxYearTables`] snapshot.
#[derive(Debug, Clone)]
pub struct SalaryCalculator<'a> {
    tables: &'a TaxYearTables,
}

impl<'a> SalaryCalculator<'a> {
    pub fn new(tables: &'a TaxYearTables) -> Self {
        Self { tables }
    }

    /// Computes the full breakdown for a gross annual salary.
    ///
    /// # Errors
    ///
    /// Fails on negative gross and on malformed IRPEF or additional-rule
    /// tables. A missing regional/municipal rule is not an error: the
    /// corresponding surcharge is zero.
    pub fn net_from_gross(&self, gross: Decimal) -> Result<SalaryBreakdown, SalaryError> {
        if gross < Decimal::ZERO {
            return Err(SalaryError::NegativeGross(gross));
        }

        let irpef_spans: Vec<BracketSpan> =
            self.tables.irpef_brackets.iter().map(Into::into).collect();
        brackets::validate(&irpef_spans).map_err(|source| SalaryError::InvalidIrpefTable {
            year: self.tables.year,
            source,
        })?;

        let rates = &self.tables.contributions;

        // 1) Worker contributions off gross pay.
        let inps_worker = percent_of(gross, rates.inps_worker);
        let ffc_worker = percent_of(gross, rates.ffc_worker);
        let solidarity_worker = percent_of(gross, rates.solidarity_worker);
        let worker_contributions = inps_worker + ffc_worker + solidarity_worker;

        // 2) Taxable base.
        let taxable_income = gross - worker_contributions;

        // 3) Progressive IRPEF, then L.207 relief as a percentage discount.
        let irpef_gross = brackets::progressive_tax(taxable_income, &irpef_spans);
        let relief_percentage = self.relief_percentage(taxable_income);
        let irpef = irpef_gross * (Decimal::ONE_HUNDRED - relief_percentage)
            / Decimal::ONE_HUNDRED;

        // 4) Surcharges on the taxable base, independent of the relief.
        let regional_additional = self.additional(self.tables.regional.as_ref(), taxable_income)?;
        let municipal_additional =
            self.additional(self.tables.municipal.as_ref(), taxable_income)?;

        // 5) Worker net.
        let net_salary = taxable_income - irpef - regional_additional - municipal_additional;

        // 6) Employer side. Apprenticeship contracts are INAIL-exempt.
        let inps_employer = percent_of(gross, rates.inps_employer);
        let inail_employer = if rates.contract_type == ContractType::Apprenticeship {
            Decimal::ZERO
        } else {
            percent_of(gross, rates.inail_employer)
        };
        let ffc_employer = percent_of(gross, rates.ffc_employer);
        let solidarity_employer = percent_of(gross, rates.solidarity_employer);
        let employer_contributions =
            inps_employer + inail_employer + ffc_employer + solidarity_employer;
        let company_cost = gross + employer_contributions;

        Ok(SalaryBreakdown {
            gross_salary: round_half_up(gross),
            inps_worker: round_half_up(inps_worker),
            ffc_worker: round_half_up(ffc_worker),
            solidarity_worker: round_half_up(solidarity_worker),
            worker_contributions: round_half_up(worker_contributions),
            taxable_income: round_half_up(taxable_income),
            irpef_gross: round_half_up(irpef_gross),
            relief_percentage,
            irpef: round_half_up(irpef),
            regional_additional: round_half_up(regional_additional),
            municipal_additional: round_half_up(municipal_additional),
            net_salary: round_half_up(net_salary),
            inps_employer: round_half_up(inps_employer),
            inail_employer: round_half_up(inail_employer),
            ffc_employer: round_half_up(ffc_employer),
            solidarity_employer: round_half_up(solidarity_employer),
            employer_contributions: round_half_up(employer_contributions),
            company_cost: round_half_up(company_cost),
        })
    }

    /// Relief percentage from the first band the taxable income falls in.
    fn relief_percentage(&self, taxable_income: Decimal) -> Decimal {
        self.tables
            .relief_bands
            .iter()
            .find(|band| band.matches(taxable_income))
            .map(|band| band.bonus_percentage)
            .unwrap_or(Decimal::ZERO)
    }

    /// Surcharge owed under an optional flat or progressive rule.
    fn additional(
        &self,
        rule: Option<&AdditionalTaxRule>,
        taxable_income: Decimal,
    ) -> Result<Decimal, SalaryError> {
        let Some(rule) = rule else {
            return Ok(Decimal::ZERO);
        };
        rule.validate()?;

        if rule.is_progressive {
            let spans: Vec<BracketSpan> = rule.brackets.iter().map(Into::into).collect();
            brackets::validate(&spans).map_err(|source| {
                SalaryError::InvalidAdditionalBrackets {
                    region: rule.region.clone(),
                    source,
                }
            })?;
            Ok(brackets::progressive_tax(taxable_income, &spans))
        } else {
            // validate() guarantees the flat rate is present here.
            let rate = rule.flat_rate.unwrap_or(Decimal::ZERO);
            if taxable_income <= Decimal::ZERO {
                return Ok(Decimal::ZERO);
            }
            Ok(percent_of(taxable_income, rate))
        }
    }
}
