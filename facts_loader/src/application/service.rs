use facts_model::synthetic::{self, GeneralSettings, PopulationSettings};
use facts_model::{Batch, DatumId, Universe, real};
use rand::rngs::SmallRng;

use super::ports::{DatasetSource, FactSink};

/// Everything the service needs to know about what to generate.
#[derive(Debug, Clone)]
pub struct LoadPlan {
    pub recreate_db: bool,
    pub universe: Universe,
    pub population: PopulationSettings,
    pub general: GeneralSettings,
}

/// What a finished run wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub batches: usize,
    pub rows: u64,
    /// Id the next batch would start from.
    pub next_datum_id: DatumId,
}

/// The main application service that orchestrates the loading process.
/// It is generic over the FactSink and DatasetSource traits, allowing for
/// dependency injection.
pub struct LoaderService<S: FactSink, D: DatasetSource> {
    sink: S,
    source: D,
    plan: LoadPlan,
    rng: SmallRng,
}

impl<S: FactSink, D: DatasetSource> LoaderService<S, D> {
    /// Creates a new service. `rng` drives the synthetic magnitudes and
    /// dates; the identifier universe comes from the plan.
    pub fn new(sink: S, source: D, plan: LoadPlan, rng: SmallRng) -> Self {
        Self {
            sink,
            source,
            plan,
            rng,
        }
    }

    /// Executes the entire pipeline: setup, the real dataset, the synthetic
    /// population and every general batch, each written before the next one
    /// is generated.
    pub async fn run(&mut self) -> anyhow::Result<LoadSummary> {
        tracing::info!("Starting Stage 1: Schema setup");
        self.sink.ensure_database(self.plan.recreate_db).await?;
        self.sink.reset_table().await?;
        tracing::info!("Stage 1: Schema setup finished successfully");

        tracing::info!("Starting Stage 2: Data generation");
        let mut summary = LoadSummary {
            batches: 0,
            rows: 0,
            next_datum_id: DatumId::ZERO,
        };

        let raw = self.source.fetch().await?;
        let batch = real::parse_population(raw.as_slice(), summary.next_datum_id)?;
        self.write_batch("population (AFG)", batch, &mut summary).await?;

        let batch = synthetic::population_batch(
            &self.plan.universe,
            &self.plan.population,
            summary.next_datum_id,
            &mut self.rng,
        );
        self.write_batch("population (synthetic)", batch, &mut summary)
            .await?;

        for dimension_size in self.plan.general.dimension_sizes.clone() {
            let batch = synthetic::general_batch(
                &self.plan.universe,
                &self.plan.general,
                dimension_size,
                summary.next_datum_id,
                &mut self.rng,
            )?;
            let name = format!("general (dimension size {dimension_size})");
            self.write_batch(&name, batch, &mut summary).await?;
        }
        tracing::info!("Stage 2: Data generation finished successfully");

        Ok(summary)
    }

    async fn write_batch(
        &mut self,
        name: &str,
        batch: Batch,
        summary: &mut LoadSummary,
    ) -> anyhow::Result<()> {
        tracing::info!(
            batch = name,
            rows = batch.len(),
            first_datum_id = %batch.datum_id_min(),
            last_datum_id = %batch.max_datum_id(),
            "Appending batch"
        );

        let written = self.sink.append(&batch.rows).await?;
        if written != batch.len() as u64 {
            anyhow::bail!(
                "batch {name}: wrote {written} of {} rows",
                batch.len()
            );
        }

        summary.batches += 1;
        summary.rows += written;
        summary.next_datum_id = batch.max_datum_id().next();
        Ok(())
    }
}
