use std::collections::HashSet;

use anyhow::Context;
use chrono::NaiveDate;
use rand::distr::{Alphanumeric, SampleString};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Parameters of the synthetic identifier universe.
#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct UniverseConfig {
    pub seed: u64,
    pub countries: usize,
    pub admin2_regions: usize,
    pub window_start: NaiveDate,
    pub window_days: u32,
}

impl Default for UniverseConfig {
    fn default() -> Self {
        UniverseConfig {
            seed: 42,
            countries: 5,
            admin2_regions: 10,
            window_start: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
            window_days: 9000,
        }
    }
}

/// Country codes, admin-2 codes and the day window shared by every
/// synthetic batch. Everything here is a pure function of the config, so two
/// universes built from the same seed are identical.
#[derive(Debug, Clone, PartialEq)]
pub struct Universe {
    seed: u64,
    country_codes: Vec<String>,
    admin2_codes: Vec<String>,
    days: Vec<NaiveDate>,
}

impl Universe {
    const ADMIN2_CODE_LENGTH: usize = 8;
    const MAX_COUNTRIES: usize = 26 * 26 * 26;
    /// Uppercased alphanumerics leave 36 symbols per position.
    const MAX_ADMIN2_REGIONS: u64 = 36u64.pow(Self::ADMIN2_CODE_LENGTH as u32);

    pub fn from_config(config: &UniverseConfig) -> anyhow::Result<Self> {
        if config.countries > Self::MAX_COUNTRIES {
            anyhow::bail!(
                "cannot draw {} distinct three letter country codes",
                config.countries
            );
        }
        if config.admin2_regions as u64 > Self::MAX_ADMIN2_REGIONS {
            anyhow::bail!(
                "cannot draw {} distinct admin-2 codes of length {}",
                config.admin2_regions,
                Self::ADMIN2_CODE_LENGTH
            );
        }
        if config.window_days == 0 {
            anyhow::bail!("the day window must span at least one day");
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let country_codes = distinct(config.countries, || country_code(&mut rng));
        let admin2_codes = distinct(config.admin2_regions, || {
            Alphanumeric
                .sample_string(&mut rng, Self::ADMIN2_CODE_LENGTH)
                .to_uppercase()
        });

        let days: Vec<NaiveDate> = config
            .window_start
            .iter_days()
            .take(config.window_days as usize)
            .collect();
        if days.len() != config.window_days as usize {
            anyhow::bail!(
                "day window of {} days starting {} overflows the calendar",
                config.window_days,
                config.window_start
            );
        }

        Ok(Universe {
            seed: config.seed,
            country_codes,
            admin2_codes,
            days,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn country_codes(&self) -> &[String] {
        &self.country_codes
    }

    pub fn admin2_codes(&self) -> &[String] {
        &self.admin2_codes
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    /// Draws one day from the window, with replacement.
    pub fn sample_day(&self, rng: &mut impl Rng) -> anyhow::Result<NaiveDate> {
        use rand::seq::IndexedRandom;

        self.days
            .choose(rng)
            .copied()
            .context("the day window is empty")
    }
}

fn country_code(rng: &mut impl Rng) -> String {
    (0..3).map(|_| rng.random_range('A'..='Z')).collect()
}

/// Keeps drawing until `count` distinct values are collected, preserving
/// draw order.
fn distinct(count: usize, mut draw: impl FnMut() -> String) -> Vec<String> {
    let mut seen = HashSet::with_capacity(count);
    let mut values = Vec::with_capacity(count);
    while values.len() < count {
        let value = draw();
        if seen.insert(value.clone()) {
            values.push(value);
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_universe() -> anyhow::Result<()> {
        let config = UniverseConfig::default();
        let first = Universe::from_config(&config)?;
        let second = Universe::from_config(&config)?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn different_seed_different_codes() -> anyhow::Result<()> {
        let config = UniverseConfig {
            countries: 50,
            ..Default::default()
        };
        let first = Universe::from_config(&config)?;
        let second = Universe::from_config(&UniverseConfig {
            seed: config.seed + 1,
            ..config
        })?;
        assert_ne!(first.country_codes(), second.country_codes());
        Ok(())
    }

    #[test]
    fn codes_are_distinct_and_well_formed() -> anyhow::Result<()> {
        let config = UniverseConfig {
            countries: 300,
            admin2_regions: 300,
            ..Default::default()
        };
        let universe = Universe::from_config(&config)?;

        let countries: HashSet<_> = universe.country_codes().iter().collect();
        assert_eq!(countries.len(), 300);
        assert!(universe.country_codes().iter().all(|code| {
            code.len() == 3 && code.chars().all(|c| c.is_ascii_uppercase())
        }));

        let admin2: HashSet<_> = universe.admin2_codes().iter().collect();
        assert_eq!(admin2.len(), 300);
        assert!(universe
            .admin2_codes()
            .iter()
            .all(|code| code.len() == Universe::ADMIN2_CODE_LENGTH));
        Ok(())
    }

    #[test]
    fn day_window_is_contiguous() -> anyhow::Result<()> {
        let universe = Universe::from_config(&UniverseConfig::default())?;
        let days = universe.days();
        assert_eq!(days.len(), 9000);
        assert_eq!(days[0], NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        assert_eq!((days[8999] - days[0]).num_days(), 8999);
        Ok(())
    }

    #[test]
    fn empty_day_window_is_rejected() {
        let config = UniverseConfig {
            window_days: 0,
            ..Default::default()
        };
        let error = Universe::from_config(&config).unwrap_err();
        assert!(error.to_string().contains("at least one day"));
    }

    #[test]
    fn too_many_admin2_regions_is_rejected() {
        let config = UniverseConfig {
            admin2_regions: (Universe::MAX_ADMIN2_REGIONS + 1) as usize,
            ..Default::default()
        };
        assert!(Universe::from_config(&config).is_err());
    }

    #[test]
    fn too_many_countries_is_rejected() {
        let config = UniverseConfig {
            countries: Universe::MAX_COUNTRIES + 1,
            ..Default::default()
        };
        assert!(Universe::from_config(&config).is_err());
    }
}
