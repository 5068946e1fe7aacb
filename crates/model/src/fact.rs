use chrono::NaiveDate;

/// Grouping key shared by every facet row of one logical observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DatumId(pub i64);

impl DatumId {
    pub const ZERO: DatumId = DatumId(0);

    /// The id `offset` observations after this one.
    pub fn offset(self, offset: u64) -> Self {
        DatumId(self.0 + offset as i64)
    }

    pub fn next(self) -> Self {
        self.offset(1)
    }
}

impl std::fmt::Display for DatumId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Country and sub-national region an observation belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub admin0_code_iso3: String,
    pub admin1_name: Option<String>,
    pub admin1_code: String,
    pub admin2_name: Option<String>,
    pub admin2_code: Option<String>,
}

/// One facet of one datum, the row shape of the facts table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactRow {
    pub location: Location,
    pub theme: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub datum_id: DatumId,
    pub key: String,
    pub value: String,
}

impl FactRow {
    /// Table columns in the order `serialize_csv` writes them.
    /// The surrogate `id` column is assigned by the database.
    pub const COLUMNS: [&'static str; 11] = [
        "admin0_code_iso3",
        "admin1_name",
        "admin1_code",
        "admin2_name",
        "admin2_code",
        "theme",
        "start_date",
        "end_date",
        "datum_id",
        "key",
        "value",
    ];

    const DATE_FORMAT: &'static str = "%Y-%m-%d";

    /// Writes the row as one CSV record. Absent values become empty
    /// unquoted fields, which `COPY ... (FORMAT csv)` reads as NULL.
    pub fn serialize_csv<W>(&self, writer: &mut csv::Writer<W>) -> anyhow::Result<()>
    where
        W: std::io::Write,
    {
        let date = |date: Option<NaiveDate>| {
            date.map(|date| date.format(Self::DATE_FORMAT).to_string())
                .unwrap_or_default()
        };
        let location = &self.location;
        writer.write_field(&location.admin0_code_iso3)?;
        writer.write_field(location.admin1_name.as_deref().unwrap_or_default())?;
        writer.write_field(&location.admin1_code)?;
        writer.write_field(location.admin2_name.as_deref().unwrap_or_default())?;
        writer.write_field(location.admin2_code.as_deref().unwrap_or_default())?;
        writer.write_field(&self.theme)?;
        writer.write_field(date(self.start_date))?;
        writer.write_field(date(self.end_date))?;
        writer.write_field(self.datum_id.0.to_string())?;
        writer.write_field(&self.key)?;
        writer.write_field(&self.value)?;
        writer.write_record(None::<&[u8]>)?;
        Ok(())
    }
}

/// Rows produced by one generator run, plus the id range they occupy.
#[derive(Debug, Clone)]
pub struct Batch {
    pub rows: Vec<FactRow>,
    datum_id_min: DatumId,
    observations: u64,
}

impl Batch {
    pub fn new(rows: Vec<FactRow>, datum_id_min: DatumId, observations: u64) -> Self {
        Batch {
            rows,
            datum_id_min,
            observations,
        }
    }

    pub fn datum_id_min(&self) -> DatumId {
        self.datum_id_min
    }

    /// Largest id used by this batch. For an empty batch this is one below
    /// `datum_id_min`, so `max_datum_id().next()` is always a safe start for
    /// the following batch.
    pub fn max_datum_id(&self) -> DatumId {
        DatumId(self.datum_id_min.0 + self.observations as i64 - 1)
    }

    pub fn observations(&self) -> u64 {
        self.observations
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
