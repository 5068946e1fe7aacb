use anyhow::{Context, Result};
use facts_model::FactRow;
use facts_store::{ConnectionSettings, DatabaseState, FactStore, StoreSettings, ensure_database};

use crate::{application::ports::FactSink, config::Config};

/// An adapter that implements the `FactSink` port on PostgreSQL.
///
/// The database connection is only opened by `ensure_database`, since the
/// database may not exist before that.
pub struct PostgresSink {
    connection: ConnectionSettings,
    settings: StoreSettings,
    store: Option<FactStore>,
}

impl PostgresSink {
    pub fn new(config: &Config) -> Self {
        Self {
            connection: config.database.clone(),
            settings: config.store.clone(),
            store: None,
        }
    }

    fn store(&mut self) -> Result<&mut FactStore> {
        self.store
            .as_mut()
            .context("the database must be ensured before the table is used")
    }
}

// --- Port Implementation ---

impl FactSink for PostgresSink {
    async fn ensure_database(&mut self, recreate: bool) -> Result<()> {
        let state = ensure_database(&self.connection, recreate).await?;
        if state == DatabaseState::Created {
            tracing::info!(db = %self.connection.db_name, "Database created");
        }
        self.store = Some(FactStore::connect(&self.connection, &self.settings).await?);
        Ok(())
    }

    async fn reset_table(&mut self) -> Result<()> {
        let store = self.store()?;
        store.drop_table().await?;
        store.create_table().await?;
        Ok(())
    }

    async fn append(&mut self, rows: &[FactRow]) -> Result<u64> {
        self.store()?.append(rows).await
    }
}
