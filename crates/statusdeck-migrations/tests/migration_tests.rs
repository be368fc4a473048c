use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, Statement};
use sea_orm_migration::MigratorTrait;

use statusdeck_migrations::Migrator;

async fn connect() -> anyhow::Result<DatabaseConnection> {
    Ok(Database::connect("sqlite::memory:").await?)
}

async fn table_names(db: &DatabaseConnection) -> anyhow::Result<Vec<String>> {
    let rows = db
        .query_all(Statement::from_string(
            DbBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        ))
        .await?;

    let mut names = Vec::new();
    for row in rows {
        names.push(row.try_get::<String>("", "name")?);
    }
    Ok(names)
}

/// Test that migrations can be applied successfully
#[tokio::test]
async fn test_migration_up() -> anyhow::Result<()> {
    let db = connect().await?;

    Migrator::up(&db, None).await?;

    let tables = table_names(&db).await?;
    for expected in [
        "organizations",
        "members",
        "services",
        "incidents",
        "incident_updates",
    ] {
        assert!(
            tables.iter().any(|t| t == expected),
            "missing table {expected}, got {tables:?}"
        );
    }

    Ok(())
}

#[tokio::test]
async fn test_migration_down() -> anyhow::Result<()> {
    let db = connect().await?;

    Migrator::up(&db, None).await?;
    Migrator::down(&db, None).await?;

    let tables = table_names(&db).await?;
    assert!(!tables.iter().any(|t| t == "organizations"));
    assert!(!tables.iter().any(|t| t == "incident_updates"));

    Ok(())
}

#[tokio::test]
async fn test_migration_status() -> anyhow::Result<()> {
    let db = connect().await?;

    Migrator::up(&db, None).await?;

    let pending = Migrator::get_pending_migrations(&db).await?;
    assert!(pending.is_empty());

    let applied = Migrator::get_applied_migrations(&db).await?;
    assert_eq!(applied.len(), Migrator::migrations().len());

    Ok(())
}

#[tokio::test]
async fn test_organization_delete_cascades() -> anyhow::Result<()> {
    let db = connect().await?;
    Migrator::up(&db, None).await?;

    let statements = [
        "INSERT INTO organizations (id, name, slug) VALUES (1, 'Acme', 'acme')",
        "INSERT INTO services (id, name, organization_id) VALUES (1, 'API', 1)",
        "INSERT INTO incidents (id, title, service_id, organization_id) VALUES (1, 'Down', 1, 1)",
        "INSERT INTO incident_updates (incident_id, message, status) VALUES (1, 'Looking', 'INVESTIGATING')",
        "DELETE FROM organizations WHERE id = 1",
    ];
    for sql in statements {
        db.execute(Statement::from_string(DbBackend::Sqlite, sql))
            .await?;
    }

    for table in ["services", "incidents", "incident_updates"] {
        let row = db
            .query_one(Statement::from_string(
                DbBackend::Sqlite,
                format!("SELECT COUNT(*) AS count FROM {table}"),
            ))
            .await?
            .expect("count row");
        assert_eq!(row.try_get::<i64>("", "count")?, 0, "{table} not emptied");
    }

    Ok(())
}

#[tokio::test]
async fn test_duplicate_slug_rejected() -> anyhow::Result<()> {
    let db = connect().await?;
    Migrator::up(&db, None).await?;

    db.execute(Statement::from_string(
        DbBackend::Sqlite,
        "INSERT INTO organizations (name, slug) VALUES ('Acme', 'acme')",
    ))
    .await?;

    let duplicate = db
        .execute(Statement::from_string(
            DbBackend::Sqlite,
            "INSERT INTO organizations (name, slug) VALUES ('Acme 2', 'acme')",
        ))
        .await;
    assert!(duplicate.is_err());

    Ok(())
}
