//! services/api/src/adapters/export.rs
//!
//! Renders summaries into downloadable documents. Implements the
//! `DocumentRenderer` port from the `core` crate.
//!
//! PDFs are laid out by `genpdf` with TrueType faces loaded at startup, so any
//! script the font covers survives export. DOCX packages are written with
//! `docx-rust`. Summary text goes through `strip_markup` first.

use async_trait::async_trait;
use docx_rust::{document::Paragraph, Docx};
use genpdf::{
    elements,
    fonts::{FontData, FontFamily},
    style::Style,
    Element as _,
};
use recap_core::{
    domain::{ExportFormat, Summary},
    markup::strip_markup,
    ports::{DocumentRenderer, PortError, PortResult},
};
use std::io::Cursor;
use std::path::Path;

const MARGIN_MM: i32 = 20;
const BODY_SIZE: u8 = 11;
const META_SIZE: u8 = 9;
const TITLE_SIZE: u8 = 18;

#[derive(Clone)]
pub struct DocumentExporter {
    fonts: FontFamily<FontData>,
}

impl DocumentExporter {
    /// Loads the regular and bold faces. The italic slots reuse them, since
    /// stripped summaries carry no emphasis.
    pub fn from_font_files(regular: &Path, bold: &Path) -> PortResult<Self> {
        let regular = load_font(regular)?;
        let bold = load_font(bold)?;
        Ok(Self {
            fonts: FontFamily {
                italic: regular.clone(),
                bold_italic: bold.clone(),
                regular,
                bold,
            },
        })
    }
}

fn load_font(path: &Path) -> PortResult<FontData> {
    let data = std::fs::read(path).map_err(|e| {
        PortError::Unexpected(format!("Failed to read font {}: {}", path.display(), e))
    })?;
    FontData::new(data, None).map_err(|e| {
        PortError::Unexpected(format!("Failed to load font {}: {}", path.display(), e))
    })
}

#[async_trait]
impl DocumentRenderer for DocumentExporter {
    async fn render(&self, summary: &Summary, format: ExportFormat) -> PortResult<Vec<u8>> {
        let title = summary.title.clone();
        let body = strip_markup(&summary.summary_content);
        let meta = format!(
            "Status: {} | {} words | Updated {}",
            summary.status,
            summary.word_count,
            summary.updated_at.format("%Y-%m-%d %H:%M UTC")
        );
        match format {
            ExportFormat::Pdf => {
                let fonts = self.fonts.clone();
                tokio::task::spawn_blocking(move || render_pdf(fonts, title, meta, &body))
                    .await
                    .map_err(|e| PortError::Unexpected(format!("Task join error: {}", e)))?
            }
            ExportFormat::Docx => render_docx(title, meta, &body),
        }
    }
}

fn render_pdf(
    fonts: FontFamily<FontData>,
    title: String,
    meta: String,
    body: &str,
) -> PortResult<Vec<u8>> {
    let mut doc = genpdf::Document::new(fonts);
    doc.set_title(title.clone());
    doc.set_paper_size(genpdf::PaperSize::Letter);
    doc.set_font_size(BODY_SIZE);
    doc.set_line_spacing(1.25);
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(MARGIN_MM);
    doc.set_page_decorator(decorator);

    doc.push(
        elements::Paragraph::new(title).styled(Style::new().bold().with_font_size(TITLE_SIZE)),
    );
    doc.push(elements::Paragraph::new(meta).styled(Style::new().with_font_size(META_SIZE)));
    doc.push(elements::Break::new(1));
    for line in body.lines() {
        if line.trim().is_empty() {
            doc.push(elements::Break::new(1));
        } else {
            doc.push(elements::Paragraph::new(line.to_string()));
        }
    }

    let mut out = Vec::new();
    doc.render(&mut out)
        .map_err(|e| PortError::Unexpected(format!("Failed to render PDF: {}", e)))?;
    Ok(out)
}

/// Title, metadata, a blank paragraph, then one paragraph per body line.
fn render_docx(title: String, meta: String, body: &str) -> PortResult<Vec<u8>> {
    let mut docx = Docx::default();
    docx.document.push(Paragraph::default().push_text(title));
    docx.document.push(Paragraph::default().push_text(meta));
    docx.document.push(Paragraph::default());
    for line in body.lines() {
        let paragraph = if line.is_empty() {
            Paragraph::default()
        } else {
            Paragraph::default().push_text(line.to_string())
        };
        docx.document.push(paragraph);
    }

    let mut out = Cursor::new(Vec::new());
    docx.write(&mut out)
        .map_err(|e| PortError::Unexpected(format!("Failed to build DOCX: {}", e)))?;
    Ok(out.into_inner())
}
