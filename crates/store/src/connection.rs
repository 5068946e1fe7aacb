use anyhow::Context;
use sqlx::ConnectOptions;
use sqlx::postgres::{PgConnectOptions, PgConnection};

/// What a connection is opened against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The server itself, without naming the target database. Used to check
    /// for, create and drop the database.
    Server,
    /// The configured database.
    Database,
}

#[derive(serde::Deserialize, serde::Serialize, Clone, PartialEq)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub db_name: String,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        ConnectionSettings {
            host: "localhost".to_string(),
            port: 5432,
            username: "postgres".to_string(),
            password: "postgres".to_string(),
            db_name: "facts".to_string(),
        }
    }
}

impl std::fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"***")
            .field("db_name", &self.db_name)
            .finish()
    }
}

impl ConnectionSettings {
    /// Connection URL with the password masked, for logs.
    pub fn redacted_url(&self, target: Target) -> String {
        let mut url = format!(
            "postgres://{}:***@{}:{}/",
            self.username, self.host, self.port
        );
        if target == Target::Database {
            url.push_str(&self.db_name);
        }
        url
    }

    pub fn connect_options(&self, target: Target) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(&self.password);
        match target {
            Target::Server => options,
            Target::Database => options.database(&self.db_name),
        }
    }

    pub async fn connect(&self, target: Target) -> anyhow::Result<PgConnection> {
        tracing::debug!(url = %self.redacted_url(target), "Connecting to postgres");
        let conn = self
            .connect_options(target)
            .connect()
            .await
            .with_context(|| format!("cannot connect to {}", self.redacted_url(target)))?;
        Ok(conn)
    }
}
