use anyhow::{Context, Result};
use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::PgConnection;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

pub fn create_conn(database_url: &str) -> Result<DbPool> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Pool::builder()
        .build(manager)
        .context("Failed to create database pool")
}

/// Apply every module's schema migration. Each migration is idempotent
/// SQL, so running this on every startup is safe.
pub fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = pool.get().context("Failed to get database connection")?;
    for migration in [
        crate::auth::create_users_tables_migration(),
        crate::contacts::create_contacts_tables_migration(),
    ] {
        conn.batch_execute(migration)
            .context("Failed to apply schema migration")?;
    }
    Ok(())
}
