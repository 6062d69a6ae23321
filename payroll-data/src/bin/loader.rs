use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use payroll_data::{BonusTaxRateLoader, ContributionRateLoader, IrpefBracketLoader};
use payroll_db_sqlite::SqliteRepository;

/// Import payroll rate tables from CSV files into the database.
///
/// Files may be comma- or semicolon-separated; rate columns accept a
/// trailing `%` and a decimal comma.
#[derive(Parser, Debug)]
#[command(name = "payroll-data-loader")]
#[command(version, about, long_about = None)]
struct Args {
    /// SQLite database URL (e.g. sqlite:payroll.db?mode=rwc to create if missing)
    #[arg(short, long, default_value = "sqlite:payroll.db?mode=rwc")]
    database: String,

    /// Run database migrations before loading data
    #[arg(short, long, default_value_t = false)]
    migrate: bool,

    /// Run seed files from the specified directory after migrations
    #[arg(short, long)]
    seeds: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load IRPEF brackets (columns: year, min_income, max_income, rate)
    Irpef {
        /// Path to the CSV file
        file: PathBuf,
    },
    /// Load contribution rates (columns: year, contract_type, seven rate columns)
    Contributions {
        /// Path to the CSV file
        file: PathBuf,
    },
    /// Load bonus withholding rates (columns: year, bonus_type/type, rate/taxRate)
    BonusRates {
        /// Path to the CSV file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let repo = SqliteRepository::new(&args.database)
        .await
        .with_context(|| format!("Failed to connect to database: {}", args.database))?;

    if args.migrate {
        println!("Running migrations...");
        repo.run_migrations()
            .await
            .context("Failed to run migrations")?;
        println!("Migrations complete.");
    }

    if let Some(seeds_dir) = &args.seeds {
        println!("Running seeds from: {}", seeds_dir.display());
        repo.run_seeds(seeds_dir)
            .await
            .with_context(|| format!("Failed to run seeds from: {}", seeds_dir.display()))?;
        println!("Seeds complete.");
    }

    match &args.command {
        Command::Irpef { file } => {
            let input = open(file)?;
            let records = IrpefBracketLoader::parse(input)
                .with_context(|| format!("Failed to parse CSV: {}", file.display()))?;
            println!("Parsed {} bracket rows from CSV", records.len());

            let inserted = IrpefBracketLoader::load(&repo, &records)
                .await
                .context("Failed to load IRPEF brackets into database")?;
            println!("Loaded {} IRPEF brackets.", inserted);
        }
        Command::Contributions { file } => {
            let input = open(file)?;
            let records = ContributionRateLoader::parse(input)
                .with_context(|| format!("Failed to parse CSV: {}", file.display()))?;
            println!("Parsed {} contribution rate rows from CSV", records.len());

            let upserted = ContributionRateLoader::load(&repo, &records)
                .await
                .context("Failed to load contribution rates into database")?;
            println!("Loaded {} contribution rate rows.", upserted);
        }
        Command::BonusRates { file } => {
            let input = open(file)?;
            let records = BonusTaxRateLoader::parse(input)
                .with_context(|| format!("Failed to parse CSV: {}", file.display()))?;
            println!("Parsed {} bonus rate rows from CSV", records.len());

            let upserted = BonusTaxRateLoader::load(&repo, &records)
                .await
                .context("Failed to load bonus withholding rates into database")?;
            println!("Loaded {} bonus withholding rates.", upserted);
        }
    }

    Ok(())
}

fn open(path: &PathBuf) -> Result<File> {
    File::open(path).with_context(|| format!("Failed to open: {}", path.display()))
}
