use anyhow::{Context, Result};
use measurements::RawMeasurement;
use std::io::Read;

/// Loads raw measurement records from CSV data.
///
/// The first row must be a header naming the nine raw measurement columns
/// (exact, case-sensitive); extra columns are ignored. A missing column or a
/// non-numeric cell is a fatal error naming the offending record. Row order
/// in the input determines dataset order.
pub fn load_measurements<R: Read>(reader: R) -> Result<Vec<RawMeasurement>> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    let mut records = Vec::new();
    for (row, result) in csv_reader.deserialize::<RawMeasurement>().enumerate() {
        let record =
            result.with_context(|| format!("Failed to parse measurement record {}", row + 1))?;
        records.push(record);
    }
    Ok(records)
}
