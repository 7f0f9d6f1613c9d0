//! Error types for every stage of a generation run.
//!
//! Loading, template and seller problems are preconditions: they abort a run
//! before the first row. Render and export problems belong to a single row and
//! end up in the run's `GenerationOutcome` instead.

use common::model::schema::FieldErrors;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Schema violations of one CSV data row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFailure {
    /// 1-based row number in the file; the header is row 1.
    pub row: usize,
    pub errors: FieldErrors,
}

/// Every invalid row of a CSV file, reported together.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvValidationError {
    failures: Vec<RowFailure>,
}

impl CsvValidationError {
    pub fn new(failures: Vec<RowFailure>) -> Self {
        Self { failures }
    }

    pub fn failures(&self) -> &[RowFailure] {
        &self.failures
    }
}

impl fmt::Display for CsvValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, failure) in self.failures.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "Row {}: {}", failure.row, failure.errors)?;
        }
        Ok(())
    }
}

impl std::error::Error for CsvValidationError {}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("CSV file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("CSV file is empty or has no header row: {}", .0.display())]
    NoHeader(PathBuf),

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("CSV validation failed:\n{0}")]
    Validation(CsvValidationError),

    #[error("Error reading CSV file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Template failures carry the resolved template path so the user knows which
/// file to fix.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("Template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("Template syntax error in {}: {message}", .path.display())]
    Syntax { path: PathBuf, message: String },

    #[error("Error rendering template {}: {message}", .path.display())]
    Render { path: PathBuf, message: String },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Cannot write PDF file: {}. Permission denied.", .0.display())]
    PermissionDenied(PathBuf),

    #[error("Cannot create PDF file: {}. {source}", .path.display())]
    Path {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Error generating PDF {}: {source}", .path.display())]
    Generation {
        path: PathBuf,
        #[source]
        source: genpdf::error::Error,
    },
}

impl ExportError {
    /// Classifies a filesystem error hit while preparing or writing `path`.
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::PermissionDenied {
            ExportError::PermissionDenied(path.to_path_buf())
        } else {
            ExportError::Path {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Why a single invoice could not be produced.
#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

/// Failures that stop a run before any row is processed.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("Template file not found: {}", .0.display())]
    TemplateNotFound(PathBuf),

    #[error("Invalid seller information: {0}")]
    InvalidSeller(FieldErrors),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("No invoices found in CSV file: {}", .0.display())]
    NoInvoices(PathBuf),

    #[error("Cannot create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
