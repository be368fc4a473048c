//! Test utilities for database integration tests
//!
//! Every [`TestDatabase`] is a private in-memory SQLite database, so tests
//! never share state and need no external services.

use crate::DbConnection;
use sea_orm::*;
use sea_orm_migration::MigratorTrait;
use statusdeck_migrations::Migrator;
use std::sync::Arc;

const IN_MEMORY_URL: &str = "sqlite::memory:";

/// In-memory test database
pub struct TestDatabase {
    pub db: Arc<DbConnection>,
    pub database_url: String,
}

impl TestDatabase {
    /// Create an empty database without any schema
    pub async fn new() -> anyhow::Result<Self> {
        // A second pooled connection would open a different in-memory database.
        let mut opt = ConnectOptions::new(IN_MEMORY_URL);
        opt.max_connections(1).min_connections(1).sqlx_logging(false);

        let db = Database::connect(opt).await?;

        let test_db = TestDatabase {
            db: Arc::new(db),
            database_url: IN_MEMORY_URL.to_string(),
        };

        test_db
            .test_connection()
            .await
            .map_err(|e| anyhow::anyhow!("Initial connection test failed: {}", e))?;

        Ok(test_db)
    }

    /// Create a test database and run migrations
    pub async fn with_migrations() -> anyhow::Result<Self> {
        let test_db = Self::new().await?;

        Migrator::up(test_db.db.as_ref(), None)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

        Ok(test_db)
    }

    /// Get a reference to the database connection
    pub fn connection(&self) -> &DbConnection {
        &self.db
    }

    /// Get a cloned Arc to the database connection
    pub fn connection_arc(&self) -> Arc<DbConnection> {
        Arc::clone(&self.db)
    }

    /// Test that the database connection is working
    pub async fn test_connection(&self) -> anyhow::Result<()> {
        self.query_sql("SELECT 1").await?;
        Ok(())
    }

    /// Execute raw SQL for testing
    pub async fn execute_sql(&self, sql: &str) -> anyhow::Result<ExecResult> {
        let statement = Statement::from_string(DatabaseBackend::Sqlite, sql.to_owned());
        let result = self.db.execute(statement).await?;
        Ok(result)
    }

    /// Query raw SQL and return results
    pub async fn query_sql(&self, sql: &str) -> anyhow::Result<Vec<QueryResult>> {
        let statement = Statement::from_string(DatabaseBackend::Sqlite, sql.to_owned());
        let result = self.db.query_all(statement).await?;
        Ok(result)
    }

    /// Count the rows of a table
    pub async fn count_rows(&self, table: &str) -> anyhow::Result<i64> {
        let rows = self
            .query_sql(&format!("SELECT COUNT(*) AS count FROM {}", table))
            .await?;
        let row = rows
            .first()
            .ok_or_else(|| anyhow::anyhow!("COUNT returned no rows"))?;
        Ok(row.try_get::<i64>("", "count")?)
    }
}
