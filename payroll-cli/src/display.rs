//! Plain-text rendering of calculation results.

use payroll_core::{BonusBreakdown, SalaryBreakdown, SalaryScenario};
use rust_decimal::Decimal;

fn line(label: &str, amount: Decimal) -> String {
    format!("  {:<28} {:>14}\n", label, format!("{:.2}", amount))
}

/// Renders a salary breakdown as an aligned two-column table.
pub fn salary_table(b: &SalaryBreakdown) -> String {
    let mut out = String::new();

    out.push_str(&line("Gross salary", b.gross_salary));
    out.push('\n');
    out.push_str(&line("INPS (worker)", b.inps_worker));
    out.push_str(&line("FFC (worker)", b.ffc_worker));
    if b.solidarity_worker != Decimal::ZERO {
        out.push_str(&line("Solidarity (worker)", b.solidarity_worker));
    }
    out.push_str(&line("Worker contributions", b.worker_contributions));
    out.push('\n');
    out.push_str(&line("Taxable income", b.taxable_income));
    out.push_str(&line("IRPEF (gross)", b.irpef_gross));
    if b.relief_percentage != Decimal::ZERO {
        out.push_str(&format!(
            "  {:<28} {:>13}%\n",
            "L.207 relief", b.relief_percentage
        ));
    }
    out.push_str(&line("IRPEF", b.irpef));
    out.push_str(&line("Regional additional", b.regional_additional));
    out.push_str(&line("Municipal additional", b.municipal_additional));
    out.push('\n');
    out.push_str(&line("Net salary", b.net_salary));
    out.push('\n');
    out.push_str(&line("INPS (employer)", b.inps_employer));
    out.push_str(&line("INAIL (employer)", b.inail_employer));
    if b.ffc_employer != Decimal::ZERO {
        out.push_str(&line("FFC (employer)", b.ffc_employer));
    }
    if b.solidarity_employer != Decimal::ZERO {
        out.push_str(&line("Solidarity (employer)", b.solidarity_employer));
    }
    out.push_str(&line("Company cost", b.company_cost));

    out
}

/// Renders a bonus conversion result.
pub fn bonus_table(b: &BonusBreakdown) -> String {
    let mut out = String::new();
    out.push_str(&line("Gross bonus", b.gross));
    out.push_str(&format!(
        "  {:<28} {:>13}%\n",
        "Withholding rate", b.rate
    ));
    out.push_str(&line("Withholding", b.withholding));
    out.push_str(&line("Net bonus", b.net));
    out
}

/// One-line summary of a saved scenario.
pub fn scenario_row(s: &SalaryScenario) -> String {
    format!(
        "{:>5}  {}  {:<22} {:<15} gross {:>12}  net {:>12}\n",
        s.id,
        s.year,
        s.label.as_deref().unwrap_or("-"),
        s.contract_type.as_str(),
        format!("{:.2}", s.gross_salary),
        s.net_salary
            .map(|n| format!("{:.2}", n))
            .unwrap_or_else(|| "-".to_string()),
    )
}
