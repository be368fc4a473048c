//! Database connection utilities

pub use sea_orm;
mod connection;

pub use connection::{
    establish_connection, establish_connection_with, DatabaseError, DbConnection, PoolSettings,
};

// Export test utilities for use by other crates in their tests
pub mod test_utils;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestDatabase;
    use sea_orm::ConnectionTrait;

    #[tokio::test]
    async fn test_establish_connection_with_migrations() -> anyhow::Result<()> {
        let settings = PoolSettings {
            max_connections: 1,
            min_connections: 1,
            ..PoolSettings::default()
        };
        let db = establish_connection_with("sqlite::memory:", &settings).await?;

        let statement = sea_orm::Statement::from_string(
            sea_orm::DatabaseBackend::Sqlite,
            "SELECT COUNT(*) AS count FROM organizations".to_owned(),
        );
        let row = db.query_one(statement).await?;
        assert!(row.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_url_is_connect_error() {
        let result = establish_connection("not-a-database://nowhere").await;
        assert!(matches!(result, Err(DatabaseError::Connect(_))));
    }

    #[tokio::test]
    async fn test_test_database_is_isolated() -> anyhow::Result<()> {
        let first = TestDatabase::with_migrations().await?;
        let second = TestDatabase::with_migrations().await?;

        first
            .execute_sql("INSERT INTO organizations (name, slug) VALUES ('Acme', 'acme')")
            .await?;

        assert_eq!(first.count_rows("organizations").await?, 1);
        assert_eq!(second.count_rows("organizations").await?, 0);
        Ok(())
    }
}
