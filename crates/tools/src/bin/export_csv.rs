use clap::Parser;
use facts_model::synthetic::{self, GeneralSettings, PopulationSettings};
use facts_model::{DatumId, Universe, UniverseConfig};

/// Writes the synthetic batches to CSV files instead of a database.
fn main() -> anyhow::Result<()> {
    let config = Config::parse();
    let data_dir = &config.data_dir;
    std::fs::create_dir_all(data_dir)?;

    let universe = Universe::from_config(&UniverseConfig {
        seed: config.seed,
        countries: config.countries,
        admin2_regions: config.admin2_regions,
        ..Default::default()
    })?;
    let mut rng = synthetic::value_rng();

    let batch = synthetic::population_batch(
        &universe,
        &PopulationSettings::default(),
        DatumId(config.datum_id_min),
        &mut rng,
    );
    let mut next = batch.max_datum_id().next();
    write_file(&data_dir.join("population.csv"), &batch)?;

    let general = GeneralSettings::default();
    for dimension_size in config.dimension_sizes.iter().copied() {
        let batch = synthetic::general_batch(&universe, &general, dimension_size, next, &mut rng)?;
        next = batch.max_datum_id().next();
        let file_name = format!("general_{dimension_size}.csv");
        write_file(&data_dir.join(file_name), &batch)?;
    }
    Ok(())
}

fn write_file(path: &std::path::Path, batch: &facts_model::Batch) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)?;
    facts_model::write_csv(std::io::BufWriter::new(file), batch)?;
    println!(
        "{}: {} rows, datum ids {}..={}",
        path.display(),
        batch.len(),
        batch.datum_id_min(),
        batch.max_datum_id()
    );
    Ok(())
}

#[derive(Clone, Debug, Parser)]
#[command()]
struct Config {
    #[arg()]
    data_dir: std::path::PathBuf,
    #[arg()]
    dimension_sizes: Vec<usize>,
    #[arg(long, default_value_t = 42)]
    seed: u64,
    #[arg(long, default_value_t = 5)]
    countries: usize,
    #[arg(long, default_value_t = 10)]
    admin2_regions: usize,
    #[arg(long, default_value_t = 0)]
    datum_id_min: i64,
}
