use crate::error::{CsvValidationError, LoadError, RowFailure};
use common::model::invoice::{InvoiceRow, REQUIRED_COLUMNS};
use common::model::schema::{validate_all, RawRecord};
use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use std::fs::File;
use std::path::Path;

/// Number of the first data row; the header is row 1.
pub const FIRST_DATA_ROW: usize = 2;

/// Loads and validates every invoice row of the CSV file at `path`.
pub fn load_invoices(path: &Path) -> Result<Vec<InvoiceRow>, LoadError> {
    if !path.is_file() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let read_error = |source: csv::Error| LoadError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|e| read_error(e.into()))?;
    // Short rows are reported per field by the schema, not rejected by the reader.
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(file);

    let headers = reader.headers().map_err(read_error)?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(LoadError::NoHeader(path.to_path_buf()));
    }
    check_columns(&headers)?;

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(read_error)?;
        records.push(to_raw_record(&headers, &record));
    }
    debug!("Read {} data rows from {}", records.len(), path.display());

    let rows = validate_all(records, InvoiceRow::from_record).map_err(|rejected| {
        let failures = rejected
            .into_iter()
            .map(|r| RowFailure {
                row: r.index + FIRST_DATA_ROW,
                errors: r.errors,
            })
            .collect();
        LoadError::Validation(CsvValidationError::new(failures))
    })?;

    info!("Loaded {} invoice rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Fails with every required column absent from `headers`, sorted by name.
fn check_columns(headers: &StringRecord) -> Result<(), LoadError> {
    let mut missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    missing.sort();
    Err(LoadError::MissingColumns(missing))
}

/// Pairs header titles with cell values. Cells past the end of a short row are
/// simply absent.
fn to_raw_record(headers: &StringRecord, record: &StringRecord) -> RawRecord {
    headers
        .iter()
        .zip(record.iter())
        .map(|(title, value)| (title.to_string(), value.to_string()))
        .collect()
}
