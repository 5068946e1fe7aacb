use project_root::get_project_root;

use clap::Parser;
use facts_model::UniverseConfig;
use facts_model::synthetic::{GeneralSettings, PopulationSettings};
use facts_store::{ConnectionSettings, StoreSettings};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use std::path::PathBuf;

const DEFAULT_CONFIG_FILE: &str = "config/settings.toml";
const ENV_PREFIX: &str = "FACTS_";

/// A single, unified struct holding all application settings.
/// Built from defaults, the TOML file, `FACTS_*` environment variables and
/// the command line, in increasing order of precedence.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub database: ConnectionSettings,
    pub store: StoreSettings,
    pub setup: SetupConfig,
    pub source: SourceConfig,
    pub universe: UniverseConfig,
    pub population: PopulationSettings,
    pub general: GeneralSettings,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, Default, PartialEq)]
pub struct SetupConfig {
    /// Drop the database before (re)creating it.
    pub recreate_db: bool,
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct SourceConfig {
    pub url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            url: facts_model::real::DATASET_URL.to_string(),
        }
    }
}

/// Parses command-line arguments using the clap derive macro.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Drop the target database before creating it again.
    #[arg(long)]
    pub recreate_db: bool,

    /// Settings file, `config/settings.toml` under the project root by default.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Loads configuration from the TOML file and merges it with CLI arguments.
pub fn get_config() -> anyhow::Result<Config> {
    load(Cli::parse())
}

fn load(cli: Cli) -> anyhow::Result<Config> {
    let config_path = match cli.config {
        Some(path) => path,
        None => get_project_root()
            .map(|root| root.join(DEFAULT_CONFIG_FILE))
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE)),
    };

    let mut figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(config_path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    if cli.recreate_db {
        figment = figment.merge(("setup.recreate_db", true));
    }

    let config: Config = figment.extract()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(recreate_db: bool) -> Cli {
        Cli {
            recreate_db,
            config: Some(PathBuf::from("settings.toml")),
        }
    }

    #[test]
    fn defaults_apply_without_a_file() {
        figment::Jail::expect_with(|_jail| {
            let config = load(cli(false)).map_err(|e| e.to_string())?;
            assert_eq!(config, Config::default());
            assert_eq!(config.universe.window_days, 9000);
            Ok(())
        });
    }

    #[test]
    fn file_env_and_cli_layer_in_order() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "settings.toml",
                r#"
                [logging]
                level = "debug"

                [database]
                host = "db.internal"
                db_name = "facts_bench"

                [universe]
                seed = 7
                countries = 2

                [general]
                dimension_sizes = [5, 50]
                "#,
            )?;
            jail.set_env("FACTS_DATABASE__PORT", 6543);
            jail.set_env("FACTS_UNIVERSE__SEED", 8);

            let config = load(cli(true)).map_err(|e| e.to_string())?;
            assert_eq!(config.logging.level, "debug");
            assert_eq!(config.database.host, "db.internal");
            assert_eq!(config.database.db_name, "facts_bench");
            assert_eq!(config.database.port, 6543);
            assert_eq!(config.database.username, "postgres");
            assert_eq!(config.universe.seed, 8);
            assert_eq!(config.universe.countries, 2);
            assert_eq!(config.universe.admin2_regions, 10);
            assert_eq!(config.general.dimension_sizes, [5, 50]);
            assert!(config.setup.recreate_db);
            Ok(())
        });
    }

    #[test]
    fn recreate_flag_defaults_to_the_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("settings.toml", "[setup]\nrecreate_db = true\n")?;
            let config = load(cli(false)).map_err(|e| e.to_string())?;
            assert!(config.setup.recreate_db);
            Ok(())
        });
    }
}
