use anyhow::{Context, Result};

use crate::{application::ports::DatasetSource, config::Config};

/// An adapter that implements the `DatasetSource` port over HTTP(S).
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("cannot build http client")?;
        Ok(Self {
            client,
            url: config.source.url.clone(),
        })
    }
}

// --- Port Implementation ---

impl DatasetSource for HttpSource {
    async fn fetch(&self) -> Result<Vec<u8>> {
        tracing::info!(url = %self.url, "Fetching population dataset");

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("cannot fetch {}", self.url))?
            .error_for_status()
            .with_context(|| format!("cannot fetch {}", self.url))?;
        let body = response
            .bytes()
            .await
            .with_context(|| format!("cannot read response body from {}", self.url))?;

        tracing::debug!(bytes = body.len(), "Population dataset fetched");
        Ok(body.to_vec())
    }
}
