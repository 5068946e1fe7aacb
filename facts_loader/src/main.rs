mod application;
mod config;
mod infrastructure;

use anyhow::Result;
use config::{Config, get_config};
use facts_model::{Universe, synthetic};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use application::service::{LoadPlan, LoadSummary, LoaderService};
use infrastructure::{http::HttpSource, postgres::PostgresSink};

fn setup_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level.parse()?)
        .from_env_lossy();

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}

/// Builds the pipeline from the configuration and runs it. Every failure,
/// including invalid settings, comes back through the returned error.
async fn run(config: &Config) -> Result<LoadSummary> {
    let universe = Universe::from_config(&config.universe)?;
    tracing::info!(
        seed = universe.seed(),
        countries = universe.country_codes().len(),
        admin2_regions = universe.admin2_codes().len(),
        "Identifier universe ready"
    );

    let plan = LoadPlan {
        recreate_db: config.setup.recreate_db,
        universe,
        population: config.population.clone(),
        general: config.general.clone(),
    };
    let sink = PostgresSink::new(config);
    let source = HttpSource::new(config)?;

    let mut service = LoaderService::new(sink, source, plan, synthetic::value_rng());
    service.run().await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = get_config()?;
    setup_tracing(&config.logging.level)?;
    tracing::info!("Configuration loaded successfully");

    tracing::info!("Starting facts-loader...");
    tracing::debug!(?config, "Full application configuration");

    match run(&config).await {
        Ok(summary) => {
            tracing::info!(
                batches = summary.batches,
                rows = summary.rows,
                next_datum_id = %summary.next_datum_id,
                "Loading completed successfully!"
            );
        }
        Err(e) => {
            tracing::error!("Application finished with an error: {:?}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
