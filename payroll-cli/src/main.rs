mod display;
mod logging;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use payroll_core::db::{DbConfig, RepositoryRegistry};
use payroll_core::{
    BonusType, ContractType, NewSalaryScenario, PayrollEngine, PayrollRepository, SalaryQuery,
    SolverConfig,
};
use payroll_db_sqlite::SqliteRepositoryFactory;
use rust_decimal::Decimal;

/// Gross/net salary and bonus calculations for Italian football
/// contracts, against configurable per-year rate tables.
#[derive(Parser, Debug)]
#[command(name = "payroll")]
#[command(version, about, long_about = None)]
struct Args {
    /// Database connection string for the selected backend
    #[arg(short, long, default_value = "sqlite:payroll.db?mode=rwc", global = true)]
    database: String,

    /// Storage backend
    #[arg(long, default_value = "sqlite", global = true)]
    backend: String,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the net salary and company cost from a gross salary
    NetFromGross {
        /// Gross annual salary
        gross: Decimal,
        #[command(flatten)]
        target: TargetArgs,
        /// Save the result as a scenario with this label
        #[arg(long)]
        save: Option<String>,
    },
    /// Find the gross salary that yields a target net
    GrossFromNet {
        /// Target net annual salary
        net: Decimal,
        #[command(flatten)]
        target: TargetArgs,
        /// Convergence tolerance in currency units
        #[arg(long)]
        tolerance: Option<Decimal>,
        /// Save the result as a scenario with this label
        #[arg(long)]
        save: Option<String>,
    },
    /// Convert a bonus between gross and net at its flat withholding rate
    Bonus {
        /// Bonus type (signing, image-rights, loyalty, accommodation,
        /// car-allowance, transfer)
        bonus_type: String,
        /// Bonus amount
        amount: Decimal,
        /// Tax year
        #[arg(short, long)]
        year: i32,
        /// Treat the amount as net and compute the gross
        #[arg(long)]
        from_net: bool,
        /// Override the stored withholding rate (percent)
        #[arg(long)]
        rate: Option<Decimal>,
    },
    /// List the years with configured tax tables
    Years,
    /// Manage saved scenarios
    Scenario {
        #[command(subcommand)]
        command: ScenarioCommand,
    },
}

#[derive(clap::Args, Debug)]
struct TargetArgs {
    /// Tax year
    #[arg(short, long)]
    year: i32,

    /// Contract type (professional, apprenticeship, amateur, youth)
    #[arg(short, long, default_value = "professional")]
    contract: String,

    /// Region for the regional additional
    #[arg(short, long)]
    region: Option<String>,

    /// Municipality for the municipal additional (requires --region)
    #[arg(short, long)]
    municipality: Option<String>,
}

#[derive(Subcommand, Debug)]
enum ScenarioCommand {
    /// List saved scenarios, optionally for one year
    List {
        #[arg(short, long)]
        year: Option<i32>,
    },
    /// Show one saved scenario
    Show { id: i64 },
    /// Delete a saved scenario
    Delete { id: i64 },
}

fn parse_contract_type(s: &str) -> Result<ContractType> {
    let code = s.trim().to_uppercase().replace('-', "_");
    ContractType::parse(&code).with_context(|| {
        format!("unknown contract type '{s}' (expected professional, apprenticeship, amateur or youth)")
    })
}

fn parse_bonus_type(s: &str) -> Result<BonusType> {
    let code = s.trim().to_uppercase().replace('-', "_");
    BonusType::parse(&code).with_context(|| {
        format!(
            "unknown bonus type '{s}' (expected signing, image-rights, loyalty, accommodation, \
             car-allowance or transfer)"
        )
    })
}

impl TargetArgs {
    fn to_query(&self) -> Result<SalaryQuery> {
        if self.municipality.is_some() && self.region.is_none() {
            bail!("--municipality requires --region");
        }
        let mut query = SalaryQuery::new(self.year, parse_contract_type(&self.contract)?);
        if let Some(region) = &self.region {
            query = query.with_region(region.clone());
        }
        if let Some(municipality) = &self.municipality {
            query = query.with_municipality(municipality.clone());
        }
        Ok(query)
    }
}

async fn save_scenario(
    repo: &dyn PayrollRepository,
    label: String,
    query: &SalaryQuery,
    breakdown: &payroll_core::SalaryBreakdown,
) -> Result<()> {
    let scenario = repo
        .create_scenario(NewSalaryScenario {
            label: Some(label),
            year: query.year,
            contract_type: query.contract_type,
            region: query.region.clone(),
            municipality: query.municipality.clone(),
            gross_salary: breakdown.gross_salary,
            net_salary: Some(breakdown.net_salary),
            company_cost: Some(breakdown.company_cost),
        })
        .await
        .context("Failed to save scenario")?;
    println!("Saved scenario #{}.", scenario.id);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));

    let config = DbConfig {
        backend: args.backend.clone(),
        connection_string: args.database.clone(),
    };
    let repo = registry
        .create(&config)
        .await
        .with_context(|| format!("Failed to open {} database '{}'", args.backend, args.database))?;
    tracing::debug!(backend = %args.backend, database = %args.database, "repository ready");
    let engine = PayrollEngine::new(repo.as_ref());

    match args.command {
        Command::NetFromGross {
            gross,
            target,
            save,
        } => {
            let query = target.to_query()?;
            let breakdown = engine.net_from_gross(gross, &query).await?;
            print!("{}", display::salary_table(&breakdown));
            if let Some(label) = save {
                save_scenario(repo.as_ref(), label, &query, &breakdown).await?;
            }
        }
        Command::GrossFromNet {
            net,
            target,
            tolerance,
            save,
        } => {
            let query = target.to_query()?;
            let mut config = SolverConfig::default();
            if let Some(tolerance) = tolerance {
                config.tolerance = tolerance;
            }
            let breakdown = engine.gross_from_net_with(net, &query, &config).await?;
            print!("{}", display::salary_table(&breakdown));
            if let Some(label) = save {
                save_scenario(repo.as_ref(), label, &query, &breakdown).await?;
            }
        }
        Command::Bonus {
            bonus_type,
            amount,
            year,
            from_net,
            rate,
        } => {
            let bonus_type = parse_bonus_type(&bonus_type)?;
            let breakdown = if from_net {
                engine
                    .bonus_gross_from_net(year, bonus_type, amount, rate)
                    .await?
            } else {
                engine
                    .bonus_net_from_gross(year, bonus_type, amount, rate)
                    .await?
            };
            print!("{}", display::bonus_table(&breakdown));
        }
        Command::Years => {
            let years = repo.list_years().await?;
            if years.is_empty() {
                println!("No tax years configured.");
            } else {
                for year in years {
                    println!("{year}");
                }
            }
        }
        Command::Scenario { command } => match command {
            ScenarioCommand::List { year } => {
                let scenarios = repo.list_scenarios(year).await?;
                if scenarios.is_empty() {
                    println!("No saved scenarios.");
                } else {
                    for scenario in scenarios {
                        print!("{}", display::scenario_row(&scenario));
                    }
                }
            }
            ScenarioCommand::Show { id } => {
                let scenario = repo.get_scenario(id).await?;
                print!("{}", display::scenario_row(&scenario));
            }
            ScenarioCommand::Delete { id } => {
                repo.delete_scenario(id).await?;
                println!("Deleted scenario #{id}.");
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn contract_type_parsing_is_forgiving() {
        assert_eq!(
            parse_contract_type("professional").unwrap(),
            ContractType::Professional
        );
        assert_eq!(
            parse_contract_type("APPRENTICESHIP").unwrap(),
            ContractType::Apprenticeship
        );
        assert!(parse_contract_type("freelance").is_err());
    }

    #[test]
    fn bonus_type_parsing_accepts_dashes() {
        assert_eq!(
            parse_bonus_type("image-rights").unwrap(),
            BonusType::ImageRights
        );
        assert_eq!(
            parse_bonus_type("car-allowance").unwrap(),
            BonusType::CarAllowance
        );
        assert!(parse_bonus_type("appearance").is_err());
    }

    #[test]
    fn municipality_without_region_is_rejected() {
        let target = TargetArgs {
            year: 2025,
            contract: "professional".to_string(),
            region: None,
            municipality: Some("Pesaro".to_string()),
        };

        assert!(target.to_query().is_err());
    }

    #[test]
    fn target_args_build_a_full_query() {
        let target = TargetArgs {
            year: 2025,
            contract: "professional".to_string(),
            region: Some("Marche".to_string()),
            municipality: Some("Pesaro".to_string()),
        };

        let query = target.to_query().unwrap();

        assert_eq!(query.year, 2025);
        assert_eq!(query.contract_type, ContractType::Professional);
        assert_eq!(query.region.as_deref(), Some("Marche"));
        assert_eq!(query.municipality.as_deref(), Some("Pesaro"));
    }
}
