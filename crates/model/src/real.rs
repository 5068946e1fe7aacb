//! Admin-1 population counts for Afghanistan, published on HDX as a CSV
//! with one column per sex and age band (`F_0_4`, `M_80plus`, ...).

use anyhow::Context;

use crate::fact::{Batch, DatumId, Location};
use crate::melt::{WideFrame, WideRecord};

pub const DATASET_URL: &str = "https://data.humdata.org/dataset/17acb541-9431-409a-80a8-50eda7e8ebab/resource/dc7a5656-d557-404f-8b1d-494c7bbd0112/download/afg_admpop_adm1_2021_v2.csv";

pub const THEME: &str = "population";
pub const COUNTRY_CODE: &str = "AFG";

/// Facet columns of the melted dataset, in output order.
pub const FACETS: [&str; 3] = ["sex", "age", "population"];

const ADMIN1_NAME: &str = "Admin1_Name";
const ADMIN1_CODE: &str = "Admin1_Code";
const DROPPED: [&str; 2] = ["Admin0_Name", "Admin0_Code"];

/// Positions of the known columns within the header row.
struct Columns {
    admin1_name: usize,
    admin1_code: usize,
    /// (index, sex, age) for every sex/age encoded column.
    groups: Vec<(usize, String, String)>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> anyhow::Result<Self> {
        let headers: Vec<&str> = headers.iter().map(str::trim).collect();
        let position = |name: &str| {
            headers
                .iter()
                .position(|header| *header == name)
                .with_context(|| format!("population dataset has no '{name}' column"))
        };

        let admin1_name = position(ADMIN1_NAME)?;
        let admin1_code = position(ADMIN1_CODE)?;
        let dropped = DROPPED
            .iter()
            .map(|name| position(*name))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let mut groups = Vec::new();
        for (index, header) in headers.iter().enumerate() {
            if index == admin1_name || index == admin1_code || dropped.contains(&index) {
                continue;
            }
            let Some((sex, age)) = header.split_once('_') else {
                anyhow::bail!("population column '{header}' is not of the form <sex>_<age>");
            };
            groups.push((index, sex.to_string(), age.to_string()));
        }
        if groups.is_empty() {
            anyhow::bail!("population dataset has no sex/age columns");
        }

        Ok(Columns {
            admin1_name,
            admin1_code,
            groups,
        })
    }
}

/// Parses the published CSV into a batch of facts.
///
/// The row right after the header carries HXL tags rather than data and is
/// skipped. Every (region, sex/age column) pair becomes one datum with three
/// facets; ids are assigned column by column starting at `datum_id_min`.
pub fn parse_population<R: std::io::Read>(
    reader: R,
    datum_id_min: DatumId,
) -> anyhow::Result<Batch> {
    let mut reader = csv::ReaderBuilder::new().from_reader(reader);
    let columns = Columns::from_headers(reader.headers()?)?;

    let mut regions = Vec::new();
    for (line, result) in reader.records().enumerate().skip(1) {
        let record = result.with_context(|| format!("malformed population record {line}"))?;
        let field = |index: usize| {
            record
                .get(index)
                .map(|value| value.trim().to_string())
                .with_context(|| format!("population record {line} is missing column {index}"))
        };
        let location = Location {
            admin0_code_iso3: COUNTRY_CODE.to_string(),
            admin1_name: Some(field(columns.admin1_name)?),
            admin1_code: field(columns.admin1_code)?,
            admin2_name: None,
            admin2_code: None,
        };
        let counts = columns
            .groups
            .iter()
            .map(|(index, _, _)| field(*index))
            .collect::<anyhow::Result<Vec<_>>>()?;
        regions.push((location, counts));
    }

    let observations = regions.len() * columns.groups.len();
    let mut frame = WideFrame::with_capacity(FACETS, observations);
    let mut datum_id = datum_id_min;
    for (group, (_, sex, age)) in columns.groups.iter().enumerate() {
        for (location, counts) in &regions {
            frame.push(WideRecord {
                location: location.clone(),
                theme: THEME.to_string(),
                start_date: None,
                end_date: None,
                datum_id,
                values: vec![sex.clone(), age.clone(), counts[group].clone()],
            });
            datum_id = datum_id.next();
        }
    }

    Ok(Batch::new(frame.melt(), datum_id_min, observations as u64))
}
