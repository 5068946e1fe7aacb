use anyhow::Context;
use sqlx::Executor;

use crate::connection::{ConnectionSettings, Target};
use crate::table::quote_ident;

/// Outcome of [`ensure_database`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseState {
    Created,
    Existing,
}

/// Makes sure the configured database exists, dropping it first when
/// `recreate` is set.
///
/// Runs on a server-level connection; every statement is its own implicit
/// transaction, as `CREATE DATABASE` and `DROP DATABASE` require.
pub async fn ensure_database(
    settings: &ConnectionSettings,
    recreate: bool,
) -> anyhow::Result<DatabaseState> {
    let mut conn = settings.connect(Target::Server).await?;
    let db_name = quote_ident(&settings.db_name);

    if recreate {
        tracing::info!(db = %settings.db_name, "Dropping database before recreating it");
        conn.execute(format!("DROP DATABASE IF EXISTS {db_name}").as_str())
            .await
            .with_context(|| format!("cannot drop database {db_name}"))?;
    }

    let exists: Option<String> =
        sqlx::query_scalar("SELECT datname::TEXT FROM pg_database WHERE datname = $1")
            .bind(&settings.db_name)
            .fetch_optional(&mut conn)
            .await?;
    if exists.is_some() {
        tracing::info!(db = %settings.db_name, "Database already exists");
        return Ok(DatabaseState::Existing);
    }

    tracing::info!(db = %settings.db_name, "Database does not exist, creating");
    conn.execute(format!("CREATE DATABASE {db_name}").as_str())
        .await
        .with_context(|| format!("cannot create database {db_name}"))?;
    Ok(DatabaseState::Created)
}
