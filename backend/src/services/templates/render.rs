use crate::error::RenderError;
use crate::services::templates::filters::add_days_filter;
use common::model::invoice::InvoiceRow;
use common::model::seller::SellerInfo;
use log::debug;
use std::error::Error as _;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context, Tera};

/// A compiled invoice template.
///
/// The template sees two bindings, `seller` and `invoice`, plus the
/// `add_days` filter. Every substituted value is HTML-escaped, whatever the
/// template file is called.
pub struct InvoiceRenderer {
    tera: Tera,
    name: String,
    path: PathBuf,
}

impl InvoiceRenderer {
    /// Reads and compiles the template at `path`.
    ///
    /// Files next to it with the same extension are loaded as well, so the
    /// template can `include` or `extend` them by file name. A syntax error in
    /// any of them makes the template unusable.
    pub fn from_file(path: &Path) -> Result<Self, RenderError> {
        if !path.is_file() {
            return Err(RenderError::TemplateNotFound(path.to_path_buf()));
        }
        let read_error = |e: std::io::Error| RenderError::Render {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        let name = template_name(path);
        let source = fs::read_to_string(path).map_err(read_error)?;

        let mut sources = siblings(path).map_err(read_error)?;
        sources.push((name.clone(), source));
        Self::compile(path, name, sources)
    }

    /// Compiles `source`; `path` only names the template in error messages.
    pub fn from_source(path: &Path, source: &str) -> Result<Self, RenderError> {
        let name = template_name(path);
        Self::compile(path, name.clone(), vec![(name, source.to_string())])
    }

    fn compile(path: &Path, name: String, sources: Vec<(String, String)>) -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        // An empty suffix matches every template name.
        tera.autoescape_on(vec![""]);
        tera.register_filter("add_days", add_days_filter);
        tera.add_raw_templates(sources)
            .map_err(|e| RenderError::Syntax {
                path: path.to_path_buf(),
                message: describe(&e),
            })?;

        Ok(InvoiceRenderer {
            tera,
            name,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn render(&self, seller: &SellerInfo, invoice: &InvoiceRow) -> Result<String, RenderError> {
        let mut context = Context::new();
        context.insert("seller", seller);
        context.insert("invoice", invoice);

        self.tera
            .render(&self.name, &context)
            .map_err(|e| RenderError::Render {
                path: self.path.clone(),
                message: describe(&e),
            })
    }
}

/// Compiles the template at `template` and renders a single invoice with it.
pub fn render_invoice(
    seller: &SellerInfo,
    invoice: &InvoiceRow,
    template: &Path,
) -> Result<String, RenderError> {
    InvoiceRenderer::from_file(template)?.render(seller, invoice)
}

fn template_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "invoice".to_string())
}

/// UTF-8 files in the directory of `path` that share its extension, keyed by
/// file name. Unreadable files are left out.
fn siblings(path: &Path) -> std::io::Result<Vec<(String, String)>> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let extension = path.extension();

    let mut sources = Vec::new();
    for entry in fs::read_dir(dir)? {
        let sibling = entry?.path();
        if sibling.file_name() == path.file_name() || !sibling.is_file() || sibling.extension() != extension {
            continue;
        }
        match fs::read_to_string(&sibling) {
            Ok(source) => sources.push((template_name(&sibling), source)),
            Err(e) => debug!("Skipping {}: {}", sibling.display(), e),
        }
    }
    Ok(sources)
}

/// Tera keeps the useful part of a message (line, column, missing variable)
/// in the error's sources.
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
