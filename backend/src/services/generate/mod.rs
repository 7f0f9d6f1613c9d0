//! # Invoice Generation
//!
//! The generation routine shared by every front end, and the HTTP endpoints
//! the GUI uses to run it in the background.
//!
//! A run has two phases:
//!
//! 1.  **Preconditions** (all-or-nothing): the custom template must exist, the
//!     seller must be valid, and the CSV must load and validate completely and
//!     hold at least one row. Any failure here stops the run before a single
//!     file is written.
//! 2.  **Rows** (best-effort): each row is rendered and exported on its own. A
//!     failing row is recorded in the `GenerationOutcome` and the run moves on.
//!     The progress callback fires once per row, in file order.
//!
//! Routes, under `/api/generate`:
//! - `POST /start`: schedules a run on a blocking worker and returns its `job_id`.
//! - `GET /status/{job_id}`: current `JobStatus` of a run.

mod start;
mod status;

use crate::error::{GenerateError, InvoiceError, RenderError};
use crate::services::data_sources::csv::load_invoices;
use crate::services::templates::pdf::DocumentExporter;
use crate::services::templates::render::InvoiceRenderer;
use crate::services::templates::TemplateSource;
use actix_web::web::{get, post, scope};
use actix_web::Scope;
use common::model::invoice::InvoiceRow;
use common::model::outcome::GenerationOutcome;
use common::model::seller::SellerInfo;
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

const API_PATH: &str = "/api/generate";

/// Everything a front end collects before starting a run.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub csv_path: PathBuf,
    pub seller_name: String,
    pub seller_address: String,
    pub seller_ico: String,
    pub output_dir: PathBuf,
    pub template: TemplateSource,
}

/// Generates one PDF per CSV row into `request.output_dir`.
///
/// `on_progress(completed, total, filename)` is called synchronously after
/// every row, whether it succeeded or not.
pub fn generate_invoices<X, F>(
    request: &GenerationRequest,
    templates_dir: &Path,
    exporter: &X,
    mut on_progress: F,
) -> Result<GenerationOutcome, GenerateError>
where
    X: DocumentExporter + ?Sized,
    F: FnMut(usize, usize, &str),
{
    if let TemplateSource::Custom(path) = &request.template {
        if !path.exists() {
            return Err(GenerateError::TemplateNotFound(path.clone()));
        }
    }
    let template_path = request.template.resolve(templates_dir);

    let seller = SellerInfo::new(
        request.seller_name.as_str(),
        request.seller_address.as_str(),
        request.seller_ico.as_str(),
    )
    .map_err(GenerateError::InvalidSeller)?;

    let invoices = load_invoices(&request.csv_path)?;
    if invoices.is_empty() {
        return Err(GenerateError::NoInvoices(request.csv_path.clone()));
    }

    fs::create_dir_all(&request.output_dir).map_err(|source| GenerateError::OutputDir {
        path: request.output_dir.clone(),
        source,
    })?;

    let total = invoices.len();
    info!(
        "Generating {} invoices into {} with template {}",
        total,
        request.output_dir.display(),
        template_path.display()
    );

    // Compiled once; a broken template fails every row rather than the run.
    let renderer = InvoiceRenderer::from_file(&template_path);
    if let Err(e) = &renderer {
        warn!("{}", e);
    }

    let mut outcome = GenerationOutcome::new();
    for (i, invoice) in invoices.iter().enumerate() {
        let filename = pdf_file_name(invoice.transaction_id());
        let output = request.output_dir.join(&filename);

        match produce_invoice(&renderer, &seller, invoice, exporter, &output) {
            Ok(()) => {
                debug!("Generated {}", output.display());
                outcome.record_success(filename.as_str());
            }
            Err(e) => {
                warn!("Failed to generate {}: {}", filename, e);
                outcome.record_failure(filename.as_str(), e.to_string());
            }
        }

        on_progress(i + 1, total, &filename);
    }

    info!(
        "Generation finished: {} succeeded, {} failed",
        outcome.successful().len(),
        outcome.failed().len()
    );
    Ok(outcome)
}

fn produce_invoice<X: DocumentExporter + ?Sized>(
    renderer: &Result<InvoiceRenderer, RenderError>,
    seller: &SellerInfo,
    invoice: &InvoiceRow,
    exporter: &X,
    output: &Path,
) -> Result<(), InvoiceError> {
    let renderer = renderer.as_ref().map_err(Clone::clone)?;
    let html = renderer.render(seller, invoice)?;
    exporter.export(&html, output)?;
    Ok(())
}

/// Output filename for a transaction: only alphanumerics, `-`, `_` and `.`
/// survive, so the id can never escape the output directory.
pub fn pdf_file_name(transaction_id: &str) -> String {
    let stem: String = transaction_id
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect();
    format!("{}.pdf", stem)
}

/// Configures and returns the Actix `Scope` for generation routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/start", post().to(start::process))
        .route("/status/{job_id}", get().to(status::process))
}
