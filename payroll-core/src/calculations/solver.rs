//! Net-to-gross inversion.
//!
//! Once progressive brackets and relief bands are involved, net pay as a
//! function of gross has no closed-form inverse, so the solver bisects
//! over gross, re-running the forward calculator each step. The search
//! interval is `[net, max(4·net, net + 50 000)]`: net never exceeds
//! gross, and the combined marginal take of contributions, IRPEF and
//! surcharges stays well below 75%, so the upper bound always brackets
//! the answer for well-formed tables.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::calculations::salary::{SalaryBreakdown, SalaryCalculator, SalaryError};
use crate::models::TaxYearTables;

/// Default convergence tolerance: one cent.
const DEFAULT_TOLERANCE_CENTS: i64 = 1;
/// Default iteration cap. Bisection halves the interval each step, so 60
/// steps shrink even a multi-million search range far below a cent.
const DEFAULT_MAX_ITERATIONS: u32 = 60;

/// Tuning knobs for the bisection search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Accept a gross whose recomputed net differs from the target by at
    /// most this amount.
    pub tolerance: Decimal,
    /// Give up (with [`SolverError::NoConvergence`]) after this many
    /// forward evaluations.
    pub max_iterations: u32,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: Decimal::new(DEFAULT_TOLERANCE_CENTS, 2),
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

/// Errors from the net-to-gross search.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolverError {
    /// Target net pay cannot be negative.
    #[error("net salary {0} is negative")]
    NegativeNet(Decimal),

    /// The forward calculator rejected the tables.
    #[error(transparent)]
    Salary(#[from] SalaryError),

    /// The search did not reach the tolerance within the iteration cap.
    /// With well-formed tables this indicates the target sits in a relief
    /// band discontinuity or the tolerance is tighter than the cent
    /// quantisation of the forward pass.
    #[error(
        "no gross found for net {target} after {iterations} iterations \
         (best difference {best_diff})"
    )]
    NoConvergence {
        target: Decimal,
        iterations: u32,
        best_diff: Decimal,
    },
}

/// Finds the gross salary whose net equals `target_net` and returns the
/// full forward breakdown at that gross.
pub fn gross_for_net(
    tables: &TaxYearTables,
    target_net: Decimal,
    config: &SolverConfig,
) -> Result<SalaryBreakdown, SolverError> {
    if target_net < Decimal::ZERO {
        return Err(SolverError::NegativeNet(target_net));
    }

    let calc = SalaryCalculator::new(tables);

    let mut low = target_net;
    let mut high = (target_net * Decimal::from(4)).max(target_net + Decimal::from(50_000));
    let mut best_diff = Decimal::MAX;

    for iteration in 0..config.max_iterations {
        let mid = (low + high) / Decimal::TWO;
        let breakdown = calc.net_from_gross(mid)?;
        let diff = breakdown.net_salary - target_net;

        debug!(
            iteration,
            gross = %mid,
            net = %breakdown.net_salary,
            diff = %diff,
            "bisection step"
        );

        if diff.abs() <= config.tolerance {
            return Ok(breakdown);
        }
        best_diff = best_diff.min(diff.abs());

        if diff < Decimal::ZERO {
            // Net too low: need more gross.
            low = mid;
        } else {
            high = mid;
        }
    }

    Err(SolverError::NoConvergence {
        target: target_net,
        iterations: config.max_iterations,
        best_diff,
    })
}
