use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use payroll_core::{
    AdditionalTaxRule, BonusReliefBand, BonusTaxRate, BonusType, ContractType, ContributionRate,
    IrpefBracket, NewAdditionalTaxRule, NewBonusReliefBand, NewIrpefBracket, NewSalaryScenario,
    PayrollRepository, RateBracket, RepositoryError, SalaryScenario,
};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::debug;

use crate::decimal::{parse_datetime, parse_decimal, parse_optional_decimal};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self> {
        // A pooled `:memory:` database would open one empty database per
        // connection, so it gets a single-connection pool.
        let options = if database_url.contains(":memory:") {
            SqlitePoolOptions::new().max_connections(1)
        } else {
            SqlitePoolOptions::new()
        };
        let pool = options
            .connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Executes every `.sql` file in `seeds_dir`, in filename order.
    pub async fn run_seeds(&self, seeds_dir: &Path) -> Result<()> {
        let mut entries: Vec<_> = std::fs::read_dir(seeds_dir)
            .with_context(|| format!("Failed to read seeds directory '{}'", seeds_dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "sql"))
            .collect();

        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let sql = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read seed file '{}'", path.display()))?;

            sqlx::raw_sql(&sql)
                .execute(&self.pool)
                .await
                .with_context(|| format!("Failed to execute seed file '{}'", path.display()))?;
            debug!(seed = %path.display(), "applied seed file");
        }

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn load_rule_brackets(&self, rule_id: i64) -> Result<Vec<RateBracket>, RepositoryError> {
        let rows: Vec<RateBracketRow> = sqlx::query_as(
            "SELECT min_income, max_income, rate
             FROM additional_rule_brackets
             WHERE rule_id = ?
             ORDER BY CAST(min_income AS REAL)",
        )
        .bind(rule_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn load_additional_rule(
        &self,
        row: AdditionalRuleRow,
    ) -> Result<AdditionalTaxRule, RepositoryError> {
        let brackets = if row.is_progressive {
            self.load_rule_brackets(row.id).await?
        } else {
            Vec::new()
        };

        Ok(AdditionalTaxRule {
            id: row.id,
            year: row.year,
            region: row.region,
            municipality: row.municipality,
            is_progressive: row.is_progressive,
            flat_rate: parse_optional_decimal(&row.flat_rate)?,
            brackets,
        })
    }
}

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn parse_contract_type(s: &str) -> Result<ContractType, RepositoryError> {
    ContractType::parse(s)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid contract type: {}", s)))
}

fn parse_bonus_type(s: &str) -> Result<BonusType, RepositoryError> {
    BonusType::parse(s)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid bonus type: {}", s)))
}

#[derive(FromRow)]
struct IrpefBracketRow {
    id: i64,
    year: i32,
    min_income: String,
    max_income: Option<String>,
    rate: String,
}

impl TryFrom<IrpefBracketRow> for IrpefBracket {
    type Error = RepositoryError;

    fn try_from(row: IrpefBracketRow) -> Result<Self, Self::Error> {
        Ok(IrpefBracket {
            id: row.id,
            year: row.year,
            min: parse_decimal(&row.min_income)?,
            max: parse_optional_decimal(&row.max_income)?,
            rate: parse_decimal(&row.rate)?,
        })
    }
}

#[derive(FromRow)]
struct ContributionRateRow {
    year: i32,
    contract_type: String,
    inps_worker: String,
    inps_employer: String,
    ffc_worker: String,
    ffc_employer: String,
    inail_employer: String,
    solidarity_worker: String,
    solidarity_employer: String,
}

impl TryFrom<ContributionRateRow> for ContributionRate {
    type Error = RepositoryError;

    fn try_from(row: ContributionRateRow) -> Result<Self, Self::Error> {
        Ok(ContributionRate {
            year: row.year,
            contract_type: parse_contract_type(&row.contract_type)?,
            inps_worker: parse_decimal(&row.inps_worker)?,
            inps_employer: parse_decimal(&row.inps_employer)?,
            ffc_worker: parse_decimal(&row.ffc_worker)?,
            ffc_employer: parse_decimal(&row.ffc_employer)?,
            inail_employer: parse_decimal(&row.inail_employer)?,
            solidarity_worker: parse_decimal(&row.solidarity_worker)?,
            solidarity_employer: parse_decimal(&row.solidarity_employer)?,
        })
    }
}

#[derive(FromRow)]
struct AdditionalRuleRow {
    id: i64,
    year: i32,
    region: String,
    municipality: Option<String>,
    is_progressive: bool,
    flat_rate: Option<String>,
}

#[derive(FromRow)]
struct RateBracketRow {
    min_income: String,
    max_income: Option<String>,
    rate: String,
}

impl TryFrom<RateBracketRow> for RateBracket {
    type Error = RepositoryError;

    fn try_from(row: RateBracketRow) -> Result<Self, Self::Error> {
        Ok(RateBracket {
            min: parse_decimal(&row.min_income)?,
            max: parse_optional_decimal(&row.max_income)?,
            rate: parse_decimal(&row.rate)?,
        })
    }
}

#[derive(FromRow)]
struct BonusReliefBandRow {
    id: i64,
    year: i32,
    min_income: String,
    max_income: Option<String>,
    bonus_percentage: String,
}

impl TryFrom<BonusReliefBandRow> for BonusReliefBand {
    type Error = RepositoryError;

    fn try_from(row: BonusReliefBandRow) -> Result<Self, Self::Error> {
        Ok(BonusReliefBand {
            id: row.id,
            year: row.year,
            min_income: parse_decimal(&row.min_income)?,
            max_income: parse_optional_decimal(&row.max_income)?,
            bonus_percentage: parse_decimal(&row.bonus_percentage)?,
        })
    }
}

#[derive(FromRow)]
struct SalaryScenarioRow {
    id: i64,
    label: Option<String>,
    year: i32,
    contract_type: String,
    region: Option<String>,
    municipality: Option<String>,
    gross_salary: String,
    net_salary: Option<String>,
    company_cost: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<SalaryScenarioRow> for SalaryScenario {
    type Error = RepositoryError;

    fn try_from(row: SalaryScenarioRow) -> Result<Self, Self::Error> {
        Ok(SalaryScenario {
            id: row.id,
            label: row.label,
            year: row.year,
            contract_type: parse_contract_type(&row.contract_type)?,
            region: row.region,
            municipality: row.municipality,
            gross_salary: parse_decimal(&row.gross_salary)?,
            net_salary: parse_optional_decimal(&row.net_salary)?,
            company_cost: parse_optional_decimal(&row.company_cost)?,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}

#[async_trait]
impl PayrollRepository for SqliteRepository {
    async fn list_years(&self) -> Result<Vec<i32>, RepositoryError> {
        let rows: Vec<(i32,)> =
            sqlx::query_as("SELECT DISTINCT year FROM irpef_brackets ORDER BY year DESC")
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;

        Ok(rows.into_iter().map(|(year,)| year).collect())
    }

    async fn get_irpef_brackets(&self, year: i32) -> Result<Vec<IrpefBracket>, RepositoryError> {
        let rows: Vec<IrpefBracketRow> = sqlx::query_as(
            "SELECT id, year, min_income, max_income, rate
             FROM irpef_brackets
             WHERE year = ?
             ORDER BY CAST(min_income AS REAL)",
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn create_irpef_bracket(
        &self,
        bracket: NewIrpefBracket,
    ) -> Result<IrpefBracket, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO irpef_brackets (year, min_income, max_income, rate)
             VALUES (?, ?, ?, ?)",
        )
        .bind(bracket.year)
        .bind(bracket.min.to_string())
        .bind(bracket.max.map(|d| d.to_string()))
        .bind(bracket.rate.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(IrpefBracket {
            id: result.last_insert_rowid(),
            year: bracket.year,
            min: bracket.min,
            max: bracket.max,
            rate: bracket.rate,
        })
    }

    async fn delete_irpef_bracket(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM irpef_brackets WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete_irpef_brackets(&self, year: i32) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM irpef_brackets WHERE year = ?")
            .bind(year)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected())
    }

    async fn get_contribution_rate(
        &self,
        year: i32,
        contract_type: ContractType,
    ) -> Result<ContributionRate, RepositoryError> {
        let row: ContributionRateRow = sqlx::query_as(
            "SELECT year, contract_type, inps_worker, inps_employer, ffc_worker,
                    ffc_employer, inail_employer, solidarity_worker, solidarity_employer
             FROM contribution_rates
             WHERE year = ? AND contract_type = ?",
        )
        .bind(year)
        .bind(contract_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn upsert_contribution_rate(
        &self,
        rate: &ContributionRate,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT OR REPLACE INTO contribution_rates (
                year, contract_type, inps_worker, inps_employer, ffc_worker,
                ffc_employer, inail_employer, solidarity_worker, solidarity_employer
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(rate.year)
        .bind(rate.contract_type.as_str())
        .bind(rate.inps_worker.to_string())
        .bind(rate.inps_employer.to_string())
        .bind(rate.ffc_worker.to_string())
        .bind(rate.ffc_employer.to_string())
        .bind(rate.inail_employer.to_string())
        .bind(rate.solidarity_worker.to_string())
        .bind(rate.solidarity_employer.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn delete_contribution_rates(&self, year: i32) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM contribution_rates WHERE year = ?")
            .bind(year)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected())
    }

    async fn get_regional_additional(
        &self,
        year: i32,
        region: &str,
    ) -> Result<Option<AdditionalTaxRule>, RepositoryError> {
        let row: Option<AdditionalRuleRow> = sqlx::query_as(
            "SELECT id, year, region, municipality, is_progressive, flat_rate
             FROM additional_rules
             WHERE year = ? AND region = ? AND municipality IS NULL",
        )
        .bind(year)
        .bind(region)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => Ok(Some(self.load_additional_rule(row).await?)),
            None => Ok(None),
        }
    }

    async fn get_municipal_additional(
        &self,
        year: i32,
        region: &str,
        municipality: &str,
    ) -> Result<Option<AdditionalTaxRule>, RepositoryError> {
        let row: Option<AdditionalRuleRow> = sqlx::query_as(
            "SELECT id, year, region, municipality, is_progressive, flat_rate
             FROM additional_rules
             WHERE year = ? AND region = ? AND municipality = ?",
        )
        .bind(year)
        .bind(region)
        .bind(municipality)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => Ok(Some(self.load_additional_rule(row).await?)),
            None => Ok(None),
        }
    }

    async fn create_additional_rule(
        &self,
        rule: NewAdditionalTaxRule,
    ) -> Result<AdditionalTaxRule, RepositoryError> {
        rule.validate()
            .map_err(|e| RepositoryError::Configuration(e.to_string()))?;

        let mut tx = self.pool.begin().await.map_err(db_err)?;

        let result = sqlx::query(
            "INSERT INTO additional_rules (year, region, municipality, is_progressive, flat_rate)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(rule.year)
        .bind(&rule.region)
        .bind(&rule.municipality)
        .bind(rule.is_progressive)
        .bind(rule.flat_rate.map(|d| d.to_string()))
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        let id = result.last_insert_rowid();

        for bracket in &rule.brackets {
            sqlx::query(
                "INSERT INTO additional_rule_brackets (rule_id, min_income, max_income, rate)
                 VALUES (?, ?, ?, ?)",
            )
            .bind(id)
            .bind(bracket.min.to_string())
            .bind(bracket.max.map(|d| d.to_string()))
            .bind(bracket.rate.to_string())
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;

        Ok(AdditionalTaxRule {
            id,
            year: rule.year,
            region: rule.region,
            municipality: rule.municipality,
            is_progressive: rule.is_progressive,
            flat_rate: rule.flat_rate,
            brackets: rule.brackets,
        })
    }

    async fn delete_additional_rule(&self, id: i64) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query("DELETE FROM additional_rule_brackets WHERE rule_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        let result = sqlx::query("DELETE FROM additional_rules WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn delete_additional_rules(&self, year: i32) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        sqlx::query(
            "DELETE FROM additional_rule_brackets
             WHERE rule_id IN (SELECT id FROM additional_rules WHERE year = ?)",
        )
        .bind(year)
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;

        let result = sqlx::query("DELETE FROM additional_rules WHERE year = ?")
            .bind(year)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;

        tx.commit().await.map_err(db_err)?;
        Ok(result.rows_affected())
    }

    async fn get_relief_bands(&self, year: i32) -> Result<Vec<BonusReliefBand>, RepositoryError> {
        let rows: Vec<BonusReliefBandRow> = sqlx::query_as(
            "SELECT id, year, min_income, max_income, bonus_percentage
             FROM bonus_relief_bands
             WHERE year = ?
             ORDER BY CAST(min_income AS REAL)",
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn create_relief_band(
        &self,
        band: NewBonusReliefBand,
    ) -> Result<BonusReliefBand, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO bonus_relief_bands (year, min_income, max_income, bonus_percentage)
             VALUES (?, ?, ?, ?)",
        )
        .bind(band.year)
        .bind(band.min_income.to_string())
        .bind(band.max_income.map(|d| d.to_string()))
        .bind(band.bonus_percentage.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(BonusReliefBand {
            id: result.last_insert_rowid(),
            year: band.year,
            min_income: band.min_income,
            max_income: band.max_income,
            bonus_percentage: band.bonus_percentage,
        })
    }

    async fn delete_relief_band(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM bonus_relief_bands WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete_relief_bands(&self, year: i32) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM bonus_relief_bands WHERE year = ?")
            .bind(year)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected())
    }

    async fn get_bonus_tax_rate(
        &self,
        year: i32,
        bonus_type: BonusType,
    ) -> Result<Decimal, RepositoryError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT rate FROM bonus_tax_rates WHERE year = ? AND bonus_type = ?")
                .bind(year)
                .bind(bonus_type.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        let (rate,) = row.ok_or(RepositoryError::NotFound)?;
        parse_decimal(&rate)
    }

    async fn list_bonus_tax_rates(
        &self,
        year: i32,
    ) -> Result<Vec<BonusTaxRate>, RepositoryError> {
        let rows: Vec<(i32, String, String)> = sqlx::query_as(
            "SELECT year, bonus_type, rate FROM bonus_tax_rates
             WHERE year = ? ORDER BY bonus_type",
        )
        .bind(year)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.into_iter()
            .map(|(year, bonus_type, rate)| {
                Ok(BonusTaxRate {
                    year,
                    bonus_type: parse_bonus_type(&bonus_type)?,
                    rate: parse_decimal(&rate)?,
                })
            })
            .collect()
    }

    async fn upsert_bonus_tax_rate(&self, rate: &BonusTaxRate) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT OR REPLACE INTO bonus_tax_rates (year, bonus_type, rate) VALUES (?, ?, ?)",
        )
        .bind(rate.year)
        .bind(rate.bonus_type.as_str())
        .bind(rate.rate.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn delete_bonus_tax_rates(&self, year: i32) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM bonus_tax_rates WHERE year = ?")
            .bind(year)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(result.rows_affected())
    }

    async fn create_scenario(
        &self,
        scenario: NewSalaryScenario,
    ) -> Result<SalaryScenario, RepositoryError> {
        let now = Utc::now().format(TIMESTAMP_FORMAT).to_string();

        let result = sqlx::query(
            "INSERT INTO salary_scenarios (
                label, year, contract_type, region, municipality,
                gross_salary, net_salary, company_cost, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&scenario.label)
        .bind(scenario.year)
        .bind(scenario.contract_type.as_str())
        .bind(&scenario.region)
        .bind(&scenario.municipality)
        .bind(scenario.gross_salary.to_string())
        .bind(scenario.net_salary.map(|d| d.to_string()))
        .bind(scenario.company_cost.map(|d| d.to_string()))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        self.get_scenario(result.last_insert_rowid()).await
    }

    async fn get_scenario(&self, id: i64) -> Result<SalaryScenario, RepositoryError> {
        let row: SalaryScenarioRow = sqlx::query_as(
            "SELECT id, label, year, contract_type, region, municipality,
                    gross_salary, net_salary, company_cost, created_at, updated_at
             FROM salary_scenarios WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn update_scenario(&self, scenario: &SalaryScenario) -> Result<(), RepositoryError> {
        let now = Utc::now().format(TIMESTAMP_FORMAT).to_string();

        let result = sqlx::query(
            "UPDATE salary_scenarios SET
                label = ?, year = ?, contract_type = ?, region = ?, municipality = ?,
                gross_salary = ?, net_salary = ?, company_cost = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&scenario.label)
        .bind(scenario.year)
        .bind(scenario.contract_type.as_str())
        .bind(&scenario.region)
        .bind(&scenario.municipality)
        .bind(scenario.gross_salary.to_string())
        .bind(scenario.net_salary.map(|d| d.to_string()))
        .bind(scenario.company_cost.map(|d| d.to_string()))
        .bind(&now)
        .bind(scenario.id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete_scenario(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM salary_scenarios WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_scenarios(
        &self,
        year: Option<i32>,
    ) -> Result<Vec<SalaryScenario>, RepositoryError> {
        const BASE_QUERY: &str = "SELECT id, label, year, contract_type, region, municipality,
                    gross_salary, net_salary, company_cost, created_at, updated_at
             FROM salary_scenarios";

        let rows: Vec<SalaryScenarioRow> = match year {
            Some(year) => {
                sqlx::query_as(&format!(
                    "{} WHERE year = ? ORDER BY updated_at DESC",
                    BASE_QUERY
                ))
                .bind(year)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(&format!("{} ORDER BY updated_at DESC", BASE_QUERY))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(db_err)?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
