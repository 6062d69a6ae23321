//! End-to-end tests: the payroll engine against a migrated and seeded
//! SQLite database, exactly as the CLI wires it up.

use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

use payroll_core::db::{DbConfig, RepositoryFactory};
use payroll_core::{
    BonusType, ContractType, EngineError, PayrollEngine, PayrollRepository, SalaryQuery,
};
use payroll_db_sqlite::SqliteRepositoryFactory;

async fn seeded_repo() -> Box<dyn PayrollRepository> {
    let config = DbConfig {
        backend: "sqlite".to_string(),
        connection_string: ":memory:".to_string(),
    };
    SqliteRepositoryFactory
        .create(&config)
        .await
        .expect("factory should create a seeded in-memory repository")
}

fn full_query() -> SalaryQuery {
    SalaryQuery::new(2025, ContractType::Professional)
        .with_region("Marche")
        .with_municipality("Pesaro")
}

#[tokio::test]
async fn professional_50k_against_seeded_tables() {
    let repo = seeded_repo().await;
    let engine = PayrollEngine::new(repo.as_ref());

    let breakdown = engine
        .net_from_gross(dec!(50000), &full_query())
        .await
        .unwrap();

    // Worker: 9.19% + 6.25% of 50000.
    assert_eq!(breakdown.worker_contributions, dec!(7720.00));
    assert_eq!(breakdown.taxable_income, dec!(42280.00));
    // IRPEF 2025: 28000 × 23% + 14280 × 35%.
    assert_eq!(breakdown.irpef_gross, dec!(11438.00));
    // 42280 is above the top relief band, so no discount.
    assert_eq!(breakdown.relief_percentage, dec!(0));
    // Marche progressive: 15000 × 1.23% + 13000 × 1.53% + 14280 × 1.70%.
    assert_eq!(breakdown.regional_additional, dec!(626.16));
    // Pesaro flat 0.5% of 42280.
    assert_eq!(breakdown.municipal_additional, dec!(211.40));
    assert_eq!(breakdown.net_salary, dec!(30004.44));
    // Employer: 30% + 1.5% + 0.5% of 50000 on top of gross.
    assert_eq!(breakdown.company_cost, dec!(66000.00));
}

#[tokio::test]
async fn low_income_gets_l207_relief() {
    let repo = seeded_repo().await;
    let engine = PayrollEngine::new(repo.as_ref());

    let breakdown = engine
        .net_from_gross(dec!(10000), &full_query())
        .await
        .unwrap();

    // Taxable 8456 falls in the 0–8500 band (7.1%).
    assert_eq!(breakdown.taxable_income, dec!(8456.00));
    assert_eq!(breakdown.relief_percentage, dec!(7.1));
    assert_eq!(breakdown.irpef_gross, dec!(1944.88));
    assert_eq!(breakdown.irpef, dec!(1806.79));
    assert_eq!(breakdown.net_salary, dec!(6502.92));
}

#[tokio::test]
async fn apprenticeship_contract_skips_inail() {
    let repo = seeded_repo().await;
    let engine = PayrollEngine::new(repo.as_ref());
    let query = SalaryQuery::new(2025, ContractType::Apprenticeship);

    let breakdown = engine.net_from_gross(dec!(30000), &query).await.unwrap();

    assert_eq!(breakdown.inail_employer, dec!(0.00));
    // 15% INPS + 0.5% solidarity employer-side.
    assert_eq!(breakdown.employer_contributions, dec!(4650.00));
}

#[tokio::test]
async fn gross_from_net_round_trips_on_seeded_tables() {
    let repo = seeded_repo().await;
    let engine = PayrollEngine::new(repo.as_ref());
    let query = full_query();

    for gross in [30000, 50000, 120000, 800000] {
        let forward = engine
            .net_from_gross(rust_decimal::Decimal::from(gross), &query)
            .await
            .unwrap();

        let solved = engine
            .gross_from_net(forward.net_salary, &query)
            .await
            .unwrap_or_else(|e| panic!("no convergence for gross {gross}: {e}"));

        assert!(
            (solved.net_salary - forward.net_salary).abs() <= dec!(0.01),
            "round trip drifted at gross {gross}"
        );
    }
}

#[tokio::test]
async fn unknown_region_means_zero_surcharge() {
    let repo = seeded_repo().await;
    let engine = PayrollEngine::new(repo.as_ref());
    let query = SalaryQuery::new(2025, ContractType::Professional).with_region("Lazio");

    let breakdown = engine.net_from_gross(dec!(50000), &query).await.unwrap();

    assert_eq!(breakdown.regional_additional, dec!(0.00));
}

#[tokio::test]
async fn unseeded_year_is_config_not_found() {
    let repo = seeded_repo().await;
    let engine = PayrollEngine::new(repo.as_ref());
    let query = SalaryQuery::new(1999, ContractType::Professional);

    let result = engine.net_from_gross(dec!(50000), &query).await;

    assert!(matches!(result, Err(EngineError::YearNotConfigured(1999))));
}

#[tokio::test]
async fn seeded_bonus_rates_convert_both_ways() {
    let repo = seeded_repo().await;
    let engine = PayrollEngine::new(repo.as_ref());

    let forward = engine
        .bonus_net_from_gross(2025, BonusType::Signing, dec!(10000), None)
        .await
        .unwrap();
    assert_eq!(forward.rate, dec!(23.0));
    assert_eq!(forward.net, dec!(7700.00));

    let back = engine
        .bonus_gross_from_net(2025, BonusType::Signing, forward.net, None)
        .await
        .unwrap();
    assert_eq!(back.gross, dec!(10000.00));
}
