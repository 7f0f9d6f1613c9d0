//! `invoice-cli`: generate PDF invoices from a CSV file.
//!
//! Exits with 0 only when every row produced a PDF.

use clap::Parser;
use common::model::outcome::GenerationOutcome;
use common::model::template::TemplateLanguage;
use env_logger::Env;
use invoice_generator::config::Config;
use invoice_generator::error::{GenerateError, LoadError};
use invoice_generator::services::generate::{generate_invoices, GenerationRequest};
use invoice_generator::services::templates::pdf::PdfExporter;
use invoice_generator::services::templates::TemplateSource;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "invoice-cli", about = "Generate PDF invoices from a CSV file")]
struct Cli {
    /// Path to the input CSV file
    #[arg(long)]
    csv: PathBuf,
    /// Seller's full name
    #[arg(long)]
    name: String,
    /// Seller's address
    #[arg(long)]
    address: String,
    /// Seller's IČO (identification number)
    #[arg(long)]
    ico: String,
    /// Output directory for generated PDFs [default: ./output]
    #[arg(long)]
    output: Option<PathBuf>,
    /// Path to a custom HTML template (default: built-in template)
    #[arg(long)]
    template: Option<PathBuf>,
    /// Built-in template used when no --template is given: en or cz
    #[arg(long, default_value = "en")]
    lang: TemplateLanguage,
    /// Directory containing the font family files
    #[arg(long)]
    fonts_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init_from_env(Env::default().default_filter_or("warn"));
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(dir) = cli.fonts_dir {
        config.fonts_dir = dir;
    }

    let request = GenerationRequest {
        csv_path: cli.csv,
        seller_name: cli.name,
        seller_address: cli.address,
        seller_ico: cli.ico,
        output_dir: cli.output.unwrap_or_else(|| config.output_dir.clone()),
        template: match cli.template {
            Some(path) => TemplateSource::Custom(path),
            None => TemplateSource::Builtin(cli.lang),
        },
    };

    let exporter = PdfExporter::from_config(&config);
    let result = generate_invoices(
        &request,
        &config.templates_dir,
        &exporter,
        |current, total, filename| println!("Processed {} ({}/{})", filename, current, total),
    );

    let (stdout, stderr) = (io::stdout(), io::stderr());
    let (mut out, mut err) = (stdout.lock(), stderr.lock());
    let succeeded = match result {
        Ok(outcome) => report_outcome(&outcome, &request.output_dir, &mut out, &mut err),
        Err(e) => report_error(&e, &mut err).map(|()| false),
    };

    match succeeded {
        Ok(true) => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    }
}

/// Prints the run summary. Returns whether every row produced a PDF.
fn report_outcome(
    outcome: &GenerationOutcome,
    output_dir: &Path,
    out: &mut impl Write,
    err: &mut impl Write,
) -> io::Result<bool> {
    writeln!(out)?;
    if outcome.all_succeeded() {
        writeln!(
            out,
            "Generated {} PDF invoices in {}",
            outcome.successful().len(),
            output_dir.display()
        )?;
        return Ok(true);
    }

    writeln!(out, "Generated {} PDF invoices successfully", outcome.successful().len())?;
    writeln!(err, "{} invoice(s) failed:", outcome.failed().len())?;
    for (filename, error) in outcome.failed() {
        writeln!(err, "  {}: {}", filename, error)?;
    }
    Ok(false)
}

fn report_error(error: &GenerateError, err: &mut impl Write) -> io::Result<()> {
    match error {
        GenerateError::InvalidSeller(errors) => {
            writeln!(err, "Error: Invalid seller information")?;
            for e in errors.iter() {
                writeln!(err, "  {}: {}", e.field, e.message)?;
            }
        }
        GenerateError::Load(LoadError::Validation(failures)) => {
            writeln!(err, "Error: CSV validation failed")?;
            writeln!(err, "{}", failures)?;
        }
        other => writeln!(err, "Error: {}", other)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::schema::FieldErrors;
    use invoice_generator::error::{CsvValidationError, RowFailure};

    fn run_report(outcome: &GenerationOutcome) -> (bool, String, String) {
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let ok = report_outcome(outcome, Path::new("./output"), &mut out, &mut err).unwrap();
        (ok, String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
    }

    #[test]
    fn full_success_reports_to_stdout_only() {
        let mut outcome = GenerationOutcome::new();
        outcome.record_success("TXN001.pdf");
        outcome.record_success("TXN002.pdf");

        let (ok, out, err) = run_report(&outcome);

        assert!(ok);
        assert!(out.contains("Generated 2 PDF invoices in ./output"));
        assert!(err.is_empty());
    }

    #[test]
    fn partial_failure_lists_failed_files_on_stderr() {
        let mut outcome = GenerationOutcome::new();
        outcome.record_success("TXN001.pdf");
        outcome.record_failure("TXN002.pdf", "Cannot write PDF file: out/TXN002.pdf. Permission denied.");
        outcome.record_success("TXN003.pdf");

        let (ok, out, err) = run_report(&outcome);

        assert!(!ok);
        assert!(out.contains("Generated 2 PDF invoices successfully"));
        assert!(err.starts_with("1 invoice(s) failed:\n"));
        assert!(err.contains("  TXN002.pdf: Cannot write PDF file: out/TXN002.pdf. Permission denied."));
    }

    #[test]
    fn seller_errors_are_listed_per_field() {
        let mut errors = FieldErrors::new();
        errors.push("full_name", "must not be empty");
        errors.push("ico", "must not be empty");
        let mut err = Vec::new();

        report_error(&GenerateError::InvalidSeller(errors), &mut err).unwrap();

        assert_eq!(
            String::from_utf8(err).unwrap(),
            "Error: Invalid seller information\n  full_name: must not be empty\n  ico: must not be empty\n"
        );
    }

    #[test]
    fn csv_validation_errors_list_every_row() {
        let mut row3 = FieldErrors::new();
        row3.push("date", "must be a valid date in YYYY-MM-DD format");
        let mut row5 = FieldErrors::new();
        row5.push("amount", "must be greater than 0");
        let failures = CsvValidationError::new(vec![
            RowFailure { row: 3, errors: row3 },
            RowFailure { row: 5, errors: row5 },
        ]);
        let mut err = Vec::new();

        report_error(&GenerateError::Load(LoadError::Validation(failures)), &mut err).unwrap();

        let text = String::from_utf8(err).unwrap();
        assert!(text.starts_with("Error: CSV validation failed\n"));
        assert!(text.contains("Row 3: 'date': must be a valid date in YYYY-MM-DD format"));
        assert!(text.contains("Row 5: 'amount': must be greater than 0"));
    }

    #[test]
    fn other_errors_use_their_message() {
        let mut err = Vec::new();

        report_error(&GenerateError::NoInvoices(PathBuf::from("empty.csv")), &mut err).unwrap();

        assert_eq!(
            String::from_utf8(err).unwrap(),
            "Error: No invoices found in CSV file: empty.csv\n"
        );
    }
}
