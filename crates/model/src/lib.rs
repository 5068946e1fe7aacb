pub mod fact;
pub mod melt;
pub mod real;
pub mod synthetic;
pub mod universe;

pub use fact::{Batch, DatumId, FactRow, Location};
pub use universe::{Universe, UniverseConfig};

/// Writes a header line followed by every row of the batch.
pub fn write_csv<W>(writer: W, batch: &Batch) -> anyhow::Result<()>
where
    W: std::io::Write,
{
    let mut csv_file = csv::Writer::from_writer(writer);
    csv_file.write_record(FactRow::COLUMNS)?;
    for row in &batch.rows {
        row.serialize_csv(&mut csv_file)?;
    }
    csv_file.flush()?;
    Ok(())
}
