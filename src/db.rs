use migration::Migrator;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use sea_orm_migration::MigratorTrait;

use crate::error::CatalogResult;

/// Opens the pool and brings the schema up to date. The returned handle is
/// shared by every service for the life of the process; dropping the last
/// clone closes the pool.
pub async fn connect_and_migrate(
    options: impl Into<ConnectOptions>,
) -> CatalogResult<DatabaseConnection> {
    let db = Database::connect(options).await?;

    for pragma in ["PRAGMA journal_mode=WAL", "PRAGMA synchronous=NORMAL", "PRAGMA foreign_keys=ON"]
    {
        db.execute(Statement::from_string(db.get_database_backend(), pragma.to_string())).await?;
    }

    Migrator::up(&db, None).await?;
    tracing::debug!("database migrated");
    Ok(db)
}
