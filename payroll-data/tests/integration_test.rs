//! Integration tests for the CSV loaders against the SQLite backend.

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;
use sqlx::sqlite::SqlitePoolOptions;

use payroll_core::{BonusType, ContractType, PayrollRepository};
use payroll_data::{
    BonusTaxRateLoader, ContributionRateLoader, IrpefBracketLoader, LoaderError,
};
use payroll_db_sqlite::SqliteRepository;

const IRPEF_CSV: &str = include_str!("../test-data/irpef_brackets_2025.csv");
const CONTRIBUTIONS_CSV: &str = include_str!("../test-data/contribution_rates_2025.csv");
const BONUS_RATES_CSV: &str = include_str!("../test-data/bonus_tax_rates_2025.csv");

async fn setup_test_db() -> SqliteRepository {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to create in-memory database");

    let repo = SqliteRepository::new_with_pool(pool);
    repo.run_migrations()
        .await
        .expect("Failed to run migrations");
    repo
}

#[tokio::test]
async fn load_irpef_brackets_for_both_years() {
    let repo = setup_test_db().await;

    let records = IrpefBracketLoader::parse(IRPEF_CSV.as_bytes()).expect("Failed to parse CSV");
    let inserted = IrpefBracketLoader::load(&repo, &records)
        .await
        .expect("Failed to load brackets");

    assert_eq!(inserted, 6);

    let brackets = repo.get_irpef_brackets(2025).await.unwrap();
    assert_eq!(brackets.len(), 3);
    assert_eq!(brackets[0].min, dec!(0));
    assert_eq!(brackets[0].max, Some(dec!(28000)));
    assert_eq!(brackets[0].rate, dec!(23));
    assert_eq!(brackets[2].max, None);
    assert_eq!(brackets[2].rate, dec!(43));

    let years = repo.list_years().await.unwrap();
    assert_eq!(years, vec![2025, 2024]);
}

#[tokio::test]
async fn reloading_irpef_brackets_is_idempotent() {
    let repo = setup_test_db().await;
    let records = IrpefBracketLoader::parse(IRPEF_CSV.as_bytes()).unwrap();

    IrpefBracketLoader::load(&repo, &records).await.unwrap();
    IrpefBracketLoader::load(&repo, &records).await.unwrap();

    assert_eq!(repo.get_irpef_brackets(2025).await.unwrap().len(), 3);
    assert_eq!(repo.get_irpef_brackets(2024).await.unwrap().len(), 3);
}

#[tokio::test]
async fn malformed_bracket_file_is_rejected_before_writing() {
    let repo = setup_test_db().await;

    // Gap between 28000 and 30000.
    let csv = "year,min_income,max_income,rate\n\
               2025,0,28000,23\n\
               2025,30000,,35\n";
    let records = IrpefBracketLoader::parse(csv.as_bytes()).unwrap();

    let result = IrpefBracketLoader::load(&repo, &records).await;

    assert!(matches!(
        result,
        Err(LoaderError::InvalidBrackets { year: 2025, .. })
    ));
    // Nothing must have been written for the rejected year.
    assert!(repo.get_irpef_brackets(2025).await.unwrap().is_empty());
}

#[tokio::test]
async fn load_contribution_rates() {
    let repo = setup_test_db().await;

    let records = ContributionRateLoader::parse(CONTRIBUTIONS_CSV.as_bytes()).unwrap();
    let upserted = ContributionRateLoader::load(&repo, &records).await.unwrap();

    assert_eq!(upserted, 2);

    let professional = repo
        .get_contribution_rate(2025, ContractType::Professional)
        .await
        .unwrap();
    assert_eq!(professional.inps_worker, dec!(9.19));
    assert_eq!(professional.inps_employer, dec!(30.0));

    let apprenticeship = repo
        .get_contribution_rate(2025, ContractType::Apprenticeship)
        .await
        .unwrap();
    assert_eq!(apprenticeship.inps_worker, dec!(5.84));
}

#[tokio::test]
async fn unknown_contract_type_is_rejected() {
    let repo = setup_test_db().await;

    let csv = "year,contract_type,inps_worker,inps_employer,ffc_worker,ffc_employer,inail_employer,solidarity_worker,solidarity_employer\n\
               2025,FREELANCE,9.19,30.0,6.25,0.0,1.5,0.0,0.5\n";
    let records = ContributionRateLoader::parse(csv.as_bytes()).unwrap();

    let result = ContributionRateLoader::load(&repo, &records).await;

    assert!(matches!(
        result,
        Err(LoaderError::UnknownContractType(t)) if t == "FREELANCE"
    ));
}

#[tokio::test]
async fn load_bonus_rates_from_italian_export() {
    let repo = setup_test_db().await;

    let records = BonusTaxRateLoader::parse(BONUS_RATES_CSV.as_bytes()).unwrap();
    let upserted = BonusTaxRateLoader::load(&repo, &records).await.unwrap();

    assert_eq!(upserted, 6);

    let signing = repo
        .get_bonus_tax_rate(2025, BonusType::Signing)
        .await
        .unwrap();
    assert_eq!(signing, dec!(23.0));

    let transfer = repo
        .get_bonus_tax_rate(2025, BonusType::Transfer)
        .await
        .unwrap();
    assert_eq!(transfer, dec!(15.0));

    let all = repo.list_bonus_tax_rates(2025).await.unwrap();
    assert_eq!(all.len(), 6);
}

#[tokio::test]
async fn reloading_bonus_rates_overwrites_by_key() {
    let repo = setup_test_db().await;
    let records = BonusTaxRateLoader::parse(BONUS_RATES_CSV.as_bytes()).unwrap();
    BonusTaxRateLoader::load(&repo, &records).await.unwrap();

    let updated = "year,bonus_type,rate\n2025,SIGNING,25.0\n";
    let records = BonusTaxRateLoader::parse(updated.as_bytes()).unwrap();
    BonusTaxRateLoader::load(&repo, &records).await.unwrap();

    let signing = repo
        .get_bonus_tax_rate(2025, BonusType::Signing)
        .await
        .unwrap();
    assert_eq!(signing, dec!(25.0));
    assert_eq!(repo.list_bonus_tax_rates(2025).await.unwrap().len(), 6);
}
