use crate::config::Config;
use crate::error::ExportError;
use crate::services::templates::markup::{self, Block, Row, Span};
use genpdf::elements::{Break, FrameCellDecorator, LinearLayout, Paragraph, TableLayout};
use genpdf::style::{Style, StyledString};
use genpdf::{Document, Element as _};
use log::debug;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

const BODY_FONT_SIZE: u8 = 10;
const MARGIN_MM: i32 = 15;

/// Turns rendered markup into a document file.
///
/// The generation run only talks to this trait, so the PDF engine can be
/// swapped (or faked in tests) without touching the orchestration.
pub trait DocumentExporter {
    fn export(&self, html: &str, output: &Path) -> Result<(), ExportError>;
}

/// Writes PDFs with `genpdf`, using a font family loaded from disk.
#[derive(Debug, Clone)]
pub struct PdfExporter {
    fonts_dir: PathBuf,
    font_family: String,
}

impl PdfExporter {
    pub fn new(fonts_dir: impl Into<PathBuf>, font_family: impl Into<String>) -> Self {
        PdfExporter {
            fonts_dir: fonts_dir.into(),
            font_family: font_family.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.fonts_dir, &config.font_family)
    }

    /// Configure and return a genpdf Document with font and decorator set.
    fn configure_document(&self, title: &str) -> Result<Document, genpdf::error::Error> {
        let font_family = genpdf::fonts::from_files(&self.fonts_dir, &self.font_family, None)?;
        let mut doc = Document::new(font_family);
        doc.set_title(title);
        doc.set_font_size(BODY_FONT_SIZE);
        doc.set_line_spacing(1.25);

        let mut decorator = genpdf::SimplePageDecorator::new();
        decorator.set_margins(MARGIN_MM);
        doc.set_page_decorator(decorator);
        Ok(doc)
    }
}

impl DocumentExporter for PdfExporter {
    fn export(&self, html: &str, output: &Path) -> Result<(), ExportError> {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ExportError::from_io(output, e))?;
        }

        let generation = |source: genpdf::error::Error| ExportError::Generation {
            path: output.to_path_buf(),
            source,
        };

        let title = output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut doc = self.configure_document(&title).map_err(generation)?;

        let blocks = markup::parse(html);
        debug!("Laying out {} blocks for {}", blocks.len(), output.display());
        for block in &blocks {
            push_block(&mut doc, block).map_err(generation)?;
        }

        let file = File::create(output).map_err(|e| ExportError::from_io(output, e))?;
        if let Err(e) = doc.render(BufWriter::new(file)) {
            // Do not leave a truncated PDF behind.
            let _ = fs::remove_file(output);
            return Err(generation(e));
        }
        Ok(())
    }
}

fn push_block(doc: &mut Document, block: &Block) -> Result<(), genpdf::error::Error> {
    match block {
        Block::Heading { level, spans } => {
            let size = match level {
                1 => 18,
                2 => 14,
                _ => 12,
            };
            let mut p = Paragraph::new("");
            push_spans_into_paragraph(&mut p, spans, Some(size), true);
            doc.push(p);
            doc.push(Break::new(0.5));
        }
        Block::Paragraph(spans) => {
            let mut p = Paragraph::new("");
            push_spans_into_paragraph(&mut p, spans, None, false);
            doc.push(p);
        }
        Block::ListItem(spans) => handle_list_item(doc, spans),
        Block::Table(rows) => {
            doc.push(Break::new(0.5));
            doc.push(build_table(rows)?);
            doc.push(Break::new(0.5));
        }
        Block::Rule => doc.push(Break::new(1)),
    }
    Ok(())
}

/// Push spans into a Paragraph, converting each `Span` into a `StyledString`.
fn push_spans_into_paragraph(p: &mut Paragraph, spans: &[Span], font_size: Option<u8>, bold: bool) {
    for span in spans {
        let mut style = Style::new();
        if let Some(size) = font_size {
            style = style.with_font_size(size);
        }
        if bold || span.bold {
            style = style.bold();
        }
        if span.italic {
            style = style.italic();
        }
        p.push(StyledString::new(span.text.clone(), style));
    }
}

/// Handle a list item, prefixed with a bullet.
fn handle_list_item(doc: &mut Document, spans: &[Span]) {
    let mut p = Paragraph::new("");
    p.push(StyledString::new("• ", Style::new()));
    push_spans_into_paragraph(&mut p, spans, None, false);
    let mut layout = LinearLayout::vertical();
    layout.push(p);
    doc.push(layout);
}

/// Lays rows out on a grid as wide as the widest row; short rows are padded.
fn build_table(rows: &[Row]) -> Result<TableLayout, genpdf::error::Error> {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
    let mut table = TableLayout::new(vec![1; columns]);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));

    for row in rows {
        let mut table_row = table.row();
        for i in 0..columns {
            let mut p = Paragraph::new("");
            if let Some(cell) = row.get(i) {
                push_spans_into_paragraph(&mut p, cell, None, false);
            }
            table_row.push_element(p.padded(1));
        }
        table_row.push()?;
    }
    Ok(table)
}
