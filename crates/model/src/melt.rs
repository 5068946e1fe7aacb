use chrono::NaiveDate;

use crate::fact::{DatumId, FactRow, Location};

/// One datum in wide shape: a value per facet column.
#[derive(Debug, Clone)]
pub struct WideRecord {
    pub location: Location,
    pub theme: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub datum_id: DatumId,
    pub values: Vec<String>,
}

/// Wide intermediate table, one column per facet.
#[derive(Debug, Clone)]
pub struct WideFrame {
    keys: Vec<String>,
    records: Vec<WideRecord>,
}

impl WideFrame {
    pub fn new<K: Into<String>>(keys: impl IntoIterator<Item = K>) -> Self {
        WideFrame {
            keys: keys.into_iter().map(Into::into).collect(),
            records: Vec::new(),
        }
    }

    pub fn with_capacity<K: Into<String>>(
        keys: impl IntoIterator<Item = K>,
        capacity: usize,
    ) -> Self {
        let mut frame = Self::new(keys);
        frame.records.reserve(capacity);
        frame
    }

    /// Appends a record. Panics in debug builds when the number of values
    /// does not match the number of facet columns.
    pub fn push(&mut self, record: WideRecord) {
        debug_assert_eq!(record.values.len(), self.keys.len());
        self.records.push(record);
    }

    /// Reshapes into one row per (record, facet).
    ///
    /// Rows come out facet-major: every record's first facet, then every
    /// record's second facet and so on.
    pub fn melt(self) -> Vec<FactRow> {
        let WideFrame { keys, records } = self;
        let mut rows = Vec::with_capacity(keys.len() * records.len());
        for (index, key) in keys.iter().enumerate() {
            for record in &records {
                rows.push(FactRow {
                    location: record.location.clone(),
                    theme: record.theme.clone(),
                    start_date: record.start_date,
                    end_date: record.end_date,
                    datum_id: record.datum_id,
                    key: key.clone(),
                    value: record.values[index].clone(),
                });
            }
        }
        rows
    }
}
