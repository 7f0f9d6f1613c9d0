//! Reads invoice rows from a CSV data source.
//!
//! Loading is all-or-nothing: the header is checked for the required columns,
//! then every data row is validated, and either all rows come back as
//! `InvoiceRow`s or a single error lists every invalid row with its fields.
//! A header without data rows is not an error; the caller decides what an
//! empty batch means.

mod load;

pub use load::{load_invoices, FIRST_DATA_ROW};
