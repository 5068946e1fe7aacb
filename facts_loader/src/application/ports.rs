use facts_model::FactRow;

/// A contract for the storage the facts end up in.
///
/// Setup is split into explicit steps so that the destructive table reset
/// is always something the caller asks for.
pub trait FactSink {
    /// Makes sure the target database exists, dropping it first when
    /// `recreate` is set.
    fn ensure_database(&mut self, recreate: bool) -> impl Future<Output = anyhow::Result<()>>;

    /// Drops the facts table and creates it again, empty.
    fn reset_table(&mut self) -> impl Future<Output = anyhow::Result<()>>;

    /// Appends rows to the facts table, returning how many were written.
    fn append(&mut self, rows: &[FactRow]) -> impl Future<Output = anyhow::Result<u64>>;
}

/// A contract for fetching the raw population dataset.
pub trait DatasetSource {
    fn fetch(&self) -> impl Future<Output = anyhow::Result<Vec<u8>>>;
}
