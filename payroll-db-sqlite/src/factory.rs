use std::path::PathBuf;

use async_trait::async_trait;

use payroll_core::db::{DbConfig, RepositoryFactory};
use payroll_core::{PayrollRepository, RepositoryError};

use crate::repository::SqliteRepository;

/// Resolve the seeds directory at runtime so packaged installs and dev
/// trees both work.
///
/// Resolution order:
/// 1. `PAYROLL_DB_SQLITE_SEEDS_DIR`, when set.
/// 2. `./seeds`, when present in the working directory.
/// 3. `$CARGO_MANIFEST_DIR/seeds` (dev/tests run from the build tree).
fn seeds_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PAYROLL_DB_SQLITE_SEEDS_DIR") {
        return PathBuf::from(dir);
    }
    let cwd_seeds = PathBuf::from("./seeds");
    if cwd_seeds.is_dir() {
        return cwd_seeds;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("seeds")
}

/// [`RepositoryFactory`] for the `"sqlite"` backend.
///
/// ```rust,no_run
/// use payroll_core::db::RepositoryRegistry;
/// use payroll_db_sqlite::SqliteRepositoryFactory;
///
/// let mut registry = RepositoryRegistry::new();
/// registry.register(Box::new(SqliteRepositoryFactory));
/// ```
pub struct SqliteRepositoryFactory;

#[async_trait]
impl RepositoryFactory for SqliteRepositoryFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Opens the database named by `config.connection_string` (a file
    /// path, a sqlx URL like `sqlite:payroll.db?mode=rwc`, or
    /// `:memory:`), runs migrations, and loads the seed SQL.
    async fn create(
        &self,
        config: &DbConfig,
    ) -> Result<Box<dyn PayrollRepository>, RepositoryError> {
        let repo = SqliteRepository::new(&config.connection_string)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        repo.run_migrations()
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        repo.run_seeds(&seeds_dir())
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(Box::new(repo))
    }
}
