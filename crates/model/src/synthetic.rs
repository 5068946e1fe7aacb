use std::ops::RangeInclusive;

use chrono::NaiveDate;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::fact::{Batch, DatumId, Location};
use crate::melt::{WideFrame, WideRecord};
use crate::universe::Universe;

/// Range of every synthetic population or indicator value.
pub const MAGNITUDE: RangeInclusive<u32> = 10_000..=200_000;

pub const POPULATION_THEME: &str = "population";
pub const POPULATION_FACETS: [&str; 3] = ["age", "sex", "population"];
pub const AGES: RangeInclusive<u32> = 0..=19;
pub const SEXES: [&str; 2] = ["F", "M"];

pub const GENERAL_FACETS: [&str; 3] = ["dim1", "dim2", "indicator"];

/// Source of the per-row magnitudes and sampled dates. Seeded from the OS,
/// so unlike the [`Universe`] these differ from run to run.
pub fn value_rng() -> SmallRng {
    SmallRng::from_os_rng()
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct PopulationSettings {
    pub admin1_code: String,
    pub start_date: NaiveDate,
}

impl Default for PopulationSettings {
    fn default() -> Self {
        PopulationSettings {
            admin1_code: "ADM1_01".to_string(),
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
        }
    }
}

#[derive(serde::Deserialize, serde::Serialize, Debug, Clone, PartialEq)]
pub struct GeneralSettings {
    pub themes: Vec<String>,
    pub admin1_code: String,
    /// One general batch is generated per entry, each with `n` values in
    /// both dimensions.
    pub dimension_sizes: Vec<usize>,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        GeneralSettings {
            themes: ["food_security", "humanitarian_needs", "national_risk", "operational_presence"]
                .map(String::from)
                .to_vec(),
            admin1_code: "ADM1_01".to_string(),
            dimension_sizes: vec![10],
        }
    }
}

fn location(country: &str, admin1_code: &str, admin2_code: &str) -> Location {
    Location {
        admin0_code_iso3: country.to_string(),
        admin1_name: None,
        admin1_code: admin1_code.to_string(),
        admin2_name: None,
        admin2_code: Some(admin2_code.to_string()),
    }
}

/// Population of every country × admin-2 region × age × sex, three facets
/// per datum.
pub fn population_batch(
    universe: &Universe,
    settings: &PopulationSettings,
    datum_id_min: DatumId,
    rng: &mut impl Rng,
) -> Batch {
    let observations = universe.country_codes().len()
        * universe.admin2_codes().len()
        * AGES.clone().count()
        * SEXES.len();
    let mut frame = WideFrame::with_capacity(POPULATION_FACETS, observations);

    let mut datum_id = datum_id_min;
    for country in universe.country_codes() {
        for admin2_code in universe.admin2_codes() {
            let location = location(country, &settings.admin1_code, admin2_code);
            for age in AGES {
                for sex in SEXES {
                    frame.push(WideRecord {
                        location: location.clone(),
                        theme: POPULATION_THEME.to_string(),
                        start_date: Some(settings.start_date),
                        end_date: None,
                        datum_id,
                        values: vec![
                            age.to_string(),
                            sex.to_string(),
                            rng.random_range(MAGNITUDE).to_string(),
                        ],
                    });
                    datum_id = datum_id.next();
                }
            }
        }
    }

    Batch::new(frame.melt(), datum_id_min, observations as u64)
}

/// Indicator values over theme × country × admin-2 region × dim1 × dim2,
/// with `dimension_size` values in each dimension. Every datum is dated with
/// one day drawn from the universe's window.
pub fn general_batch(
    universe: &Universe,
    settings: &GeneralSettings,
    dimension_size: usize,
    datum_id_min: DatumId,
    rng: &mut impl Rng,
) -> anyhow::Result<Batch> {
    let dim1: Vec<String> = (0..dimension_size).map(|i| format!("dim1_{i}")).collect();
    let dim2: Vec<String> = (0..dimension_size).map(|i| format!("dim2_{i}")).collect();

    let observations = settings.themes.len()
        * universe.country_codes().len()
        * universe.admin2_codes().len()
        * dim1.len()
        * dim2.len();
    let mut frame = WideFrame::with_capacity(GENERAL_FACETS, observations);

    let mut datum_id = datum_id_min;
    for theme in &settings.themes {
        for country in universe.country_codes() {
            for admin2_code in universe.admin2_codes() {
                let location = location(country, &settings.admin1_code, admin2_code);
                for value1 in &dim1 {
                    for value2 in &dim2 {
                        let day = universe.sample_day(rng)?;
                        frame.push(WideRecord {
                            location: location.clone(),
                            theme: theme.clone(),
                            start_date: Some(day),
                            end_date: Some(day),
                            datum_id,
                            values: vec![
                                value1.clone(),
                                value2.clone(),
                                rng.random_range(MAGNITUDE).to_string(),
                            ],
                        });
                        datum_id = datum_id.next();
                    }
                }
            }
        }
    }

    Ok(Batch::new(frame.melt(), datum_id_min, observations as u64))
}
