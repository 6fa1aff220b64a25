use crate::data::Dataset;
use crate::error::{RenderError, Result};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Read a CSV file into a Dataset. The first record is the header row.
pub fn read_csv_path(path: &Path) -> Result<Dataset> {
    let file = File::open(path)?;
    read_csv_from_reader(file)
}

/// Read CSV from stdin, for piped invocations.
pub fn read_csv_from_stdin() -> Result<Dataset> {
    read_csv_from_reader(io::stdin())
}

/// Read CSV from any reader. Leading and trailing whitespace is trimmed
/// from headers and cells.
pub fn read_csv_from_reader<R: Read>(reader: R) -> Result<Dataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() {
        return Err(RenderError::config("csv input has no header row"));
    }

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(Dataset::new(headers, rows))
}

// === Tests ===
