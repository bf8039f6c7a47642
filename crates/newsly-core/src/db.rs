use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info};

use crate::errors::StoreError;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Opens the bookmark database and brings its schema up to date.
pub fn establish_connection(database_url: &str) -> Result<SqliteConnection, StoreError> {
    let mut connection = SqliteConnection::establish(database_url)?;
    run_migrations(&mut connection)?;
    info!(database_url = %database_url, "Connected to bookmark database");
    Ok(connection)
}

pub fn run_migrations(connection: &mut SqliteConnection) -> Result<(), StoreError> {
    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| StoreError::Migration(err.to_string()))?;
    debug!(applied = applied.len(), "Ran pending migrations");
    Ok(())
}
