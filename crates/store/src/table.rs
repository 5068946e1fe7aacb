use facts_model::FactRow;

/// Quotes an SQL identifier, doubling embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Statements for the facts table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactsTable {
    name: String,
}

impl FactsTable {
    pub fn new(name: impl Into<String>) -> Self {
        FactsTable { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn create_statement(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\
                id SERIAL PRIMARY KEY, \
                admin0_code_iso3 VARCHAR, \
                admin1_name VARCHAR, \
                admin1_code VARCHAR, \
                admin2_name VARCHAR, \
                admin2_code VARCHAR, \
                theme VARCHAR, \
                start_date DATE, \
                end_date DATE, \
                datum_id BIGINT, \
                key VARCHAR, \
                value VARCHAR\
            )",
            quote_ident(&self.name)
        )
    }

    pub fn drop_statement(&self) -> String {
        format!("DROP TABLE IF EXISTS {}", quote_ident(&self.name))
    }

    /// `COPY` in the column order of [`FactRow::serialize_csv`]. Empty
    /// unquoted fields are NULL except for `key` and `value`, which are
    /// always present.
    pub fn copy_statement(&self) -> String {
        format!(
            "COPY {} ({}) FROM STDIN WITH (FORMAT csv, FORCE_NOT_NULL (key, value))",
            quote_ident(&self.name),
            FactRow::COLUMNS.join(", ")
        )
    }
}
