use anyhow::Context;
use facts_model::FactRow;
use sqlx::Executor;
use sqlx::postgres::PgConnection;

use crate::connection::{ConnectionSettings, Target};
use crate::table::FactsTable;

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct StoreSettings {
    pub table_name: String,
    /// Rows serialized per `COPY` data message.
    pub copy_chunk_rows: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            table_name: "facts".to_string(),
            copy_chunk_rows: 50_000,
        }
    }
}

/// A connection to the target database bound to the facts table.
pub struct FactStore {
    conn: PgConnection,
    table: FactsTable,
    copy_chunk_rows: usize,
}

impl FactStore {
    pub async fn connect(
        connection: &ConnectionSettings,
        settings: &StoreSettings,
    ) -> anyhow::Result<Self> {
        let conn = connection.connect(Target::Database).await?;
        Ok(FactStore {
            conn,
            table: FactsTable::new(&settings.table_name),
            copy_chunk_rows: settings.copy_chunk_rows.max(1),
        })
    }

    /// Creates the table unless it already exists.
    pub async fn create_table(&mut self) -> anyhow::Result<()> {
        tracing::info!(table = self.table.name(), "Creating table");
        self.conn
            .execute(self.table.create_statement().as_str())
            .await
            .with_context(|| format!("cannot create table {}", self.table.name()))?;
        Ok(())
    }

    /// Drops the table and everything in it.
    pub async fn drop_table(&mut self) -> anyhow::Result<()> {
        tracing::info!(table = self.table.name(), "Dropping table");
        self.conn
            .execute(self.table.drop_statement().as_str())
            .await
            .with_context(|| format!("cannot drop table {}", self.table.name()))?;
        Ok(())
    }

    /// Streams `rows` into the table with a single `COPY`, returning the
    /// number of rows the server reports as copied.
    pub async fn append(&mut self, rows: &[FactRow]) -> anyhow::Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let mut copy = self
            .conn
            .copy_in_raw(&self.table.copy_statement())
            .await
            .with_context(|| format!("cannot start copy into {}", self.table.name()))?;

        for chunk in rows.chunks(self.copy_chunk_rows) {
            let data = match encode_chunk(chunk) {
                Ok(data) => data,
                Err(e) => {
                    copy.abort(e.to_string()).await?;
                    return Err(e);
                }
            };
            copy.send(data).await?;
        }

        let copied = copy.finish().await?;
        tracing::debug!(table = self.table.name(), copied, "Copy finished");
        Ok(copied)
    }

    pub async fn row_count(&mut self) -> anyhow::Result<i64> {
        let statement = format!(
            "SELECT COUNT(*) FROM {}",
            crate::table::quote_ident(self.table.name())
        );
        let count = sqlx::query_scalar(&statement).fetch_one(&mut self.conn).await?;
        Ok(count)
    }

    /// Column names of the table in declaration order; empty when the table
    /// does not exist.
    pub async fn columns(&mut self) -> anyhow::Result<Vec<String>> {
        let columns = sqlx::query_scalar(
            "SELECT column_name::TEXT FROM information_schema.columns \
             WHERE table_schema = current_schema() AND table_name = $1 \
             ORDER BY ordinal_position",
        )
        .bind(self.table.name())
        .fetch_all(&mut self.conn)
        .await?;
        Ok(columns)
    }

    /// Closes the connection, so the database can be dropped afterwards.
    pub async fn close(self) -> anyhow::Result<()> {
        use sqlx::Connection;

        self.conn.close().await?;
        Ok(())
    }
}

fn encode_chunk(rows: &[FactRow]) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    for row in rows {
        row.serialize_csv(&mut writer)?;
    }
    let data = writer.into_inner()?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use facts_model::synthetic::{self, PopulationSettings};
    use facts_model::{DatumId, Universe, UniverseConfig};

    use super::*;
    use crate::database::ensure_database;

    #[test]
    fn chunks_encode_one_line_per_row() -> anyhow::Result<()> {
        let universe = Universe::from_config(&UniverseConfig {
            countries: 1,
            admin2_regions: 2,
            ..Default::default()
        })?;
        let batch = synthetic::population_batch(
            &universe,
            &PopulationSettings::default(),
            DatumId::ZERO,
            &mut synthetic::value_rng(),
        );
        let data = encode_chunk(&batch.rows)?;
        let text = String::from_utf8(data)?;
        assert_eq!(text.lines().count(), batch.len());
        assert!(!text.starts_with("admin0_code_iso3"));
        Ok(())
    }

    fn live_settings() -> ConnectionSettings {
        live_settings_for("facts_test")
    }

    fn live_settings_for(db_name: &str) -> ConnectionSettings {
        let mut settings = ConnectionSettings {
            db_name: db_name.to_string(),
            ..Default::default()
        };
        if let Ok(host) = std::env::var("FACTS_TEST_PG_HOST") {
            settings.host = host;
        }
        if let Ok(password) = std::env::var("FACTS_TEST_PG_PASSWORD") {
            settings.password = password;
        }
        settings
    }

    #[tokio::test]
    #[ignore = "requires a running postgres server"]
    async fn create_table_twice_leaves_one_table() -> anyhow::Result<()> {
        let connection = live_settings();
        ensure_database(&connection, false).await?;
        let settings = StoreSettings {
            table_name: "facts_create_twice".to_string(),
            ..Default::default()
        };
        let mut store = FactStore::connect(&connection, &settings).await?;

        store.drop_table().await?;
        store.create_table().await?;
        store.create_table().await?;

        let mut expected = vec!["id".to_string()];
        expected.extend(FactRow::COLUMNS.map(String::from));
        assert_eq!(store.columns().await?, expected);

        store.drop_table().await?;
        assert!(store.columns().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running postgres server"]
    async fn append_copies_every_row() -> anyhow::Result<()> {
        let connection = live_settings();
        ensure_database(&connection, false).await?;
        let settings = StoreSettings {
            table_name: "facts_append".to_string(),
            copy_chunk_rows: 7,
        };
        let mut store = FactStore::connect(&connection, &settings).await?;
        store.drop_table().await?;
        store.create_table().await?;

        let universe = Universe::from_config(&UniverseConfig {
            countries: 2,
            admin2_regions: 2,
            ..Default::default()
        })?;
        let batch = synthetic::population_batch(
            &universe,
            &PopulationSettings::default(),
            DatumId::ZERO,
            &mut synthetic::value_rng(),
        );

        assert_eq!(store.append(&batch.rows).await?, batch.len() as u64);
        assert_eq!(store.row_count().await?, batch.len() as i64);

        store.drop_table().await?;
        Ok(())
    }

    #[tokio::test]
    #[ignore = "requires a running postgres server"]
    async fn recreate_drops_existing_tables() -> anyhow::Result<()> {
        use crate::database::DatabaseState;

        let connection = live_settings_for("facts_test_recreate");
        let settings = StoreSettings::default();

        assert_eq!(ensure_database(&connection, true).await?, DatabaseState::Created);

        let mut store = FactStore::connect(&connection, &settings).await?;
        store.create_table().await?;
        let universe = Universe::from_config(&UniverseConfig {
            countries: 1,
            admin2_regions: 1,
            ..Default::default()
        })?;
        let batch = synthetic::population_batch(
            &universe,
            &PopulationSettings::default(),
            DatumId::ZERO,
            &mut synthetic::value_rng(),
        );
        store.append(&batch.rows).await?;
        store.close().await?;

        assert_eq!(ensure_database(&connection, false).await?, DatabaseState::Existing);
        let mut store = FactStore::connect(&connection, &settings).await?;
        assert_eq!(store.row_count().await?, batch.len() as i64);
        store.close().await?;

        assert_eq!(ensure_database(&connection, true).await?, DatabaseState::Created);
        let mut store = FactStore::connect(&connection, &settings).await?;
        assert!(store.columns().await?.is_empty());
        store.close().await?;
        Ok(())
    }
}
