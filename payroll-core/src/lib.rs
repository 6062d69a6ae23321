pub mod calculations;
pub mod db;
pub mod engine;
pub mod models;

pub use calculations::{
    BonusBreakdown, BonusError, BracketError, SalaryBreakdown, SalaryCalculator, SalaryError,
    SolverConfig, SolverError,
};
pub use db::{PayrollRepository, RepositoryError};
pub use engine::{EngineError, PayrollEngine, SalaryQuery};
pub use models::*;
