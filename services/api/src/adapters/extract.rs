//! services/api/src/adapters/extract.rs
//!
//! Turns uploaded transcripts into plain text. Implements the
//! `TextExtractionService` port from the `core` crate.
//!
//! PDF and DOCX parsing is CPU-bound and runs on the blocking pool.

use async_trait::async_trait;
use docx_rust::document::{
    BodyContent, Paragraph, ParagraphContent, RunContent, Table, TableCellContent,
    TableRowContent,
};
use recap_core::{
    domain::UploadKind,
    ports::{PortError, PortResult, TextExtractionService},
};
use std::path::{Path, PathBuf};

#[derive(Clone, Default)]
pub struct FileTextExtractor;

impl FileTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractionService for FileTextExtractor {
    async fn extract_text(&self, path: &Path, kind: UploadKind) -> PortResult<String> {
        match kind {
            UploadKind::Text => {
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| PortError::Unexpected(format!("Failed to read file: {}", e)))?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            UploadKind::Pdf => run_blocking(path.to_path_buf(), extract_pdf).await,
            UploadKind::Docx => run_blocking(path.to_path_buf(), extract_docx).await,
        }
    }
}

async fn run_blocking(
    path: PathBuf,
    parse: fn(&Path) -> PortResult<String>,
) -> PortResult<String> {
    tokio::task::spawn_blocking(move || parse(&path))
        .await
        .map_err(|e| PortError::Unexpected(format!("Task join error: {}", e)))?
}

fn extract_pdf(path: &Path) -> PortResult<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| PortError::Unexpected(format!("Failed to read PDF: {}", e)))?;
    pdf_extract::extract_text_from_mem(&bytes)
        .map_err(|e| PortError::Unexpected(format!("Failed to parse PDF: {}", e)))
}

fn extract_docx(path: &Path) -> PortResult<String> {
    let file = docx_rust::DocxFile::from_file(path)
        .map_err(|e| PortError::Unexpected(format!("Failed to open DOCX file: {}", e)))?;
    let docx = file
        .parse()
        .map_err(|e| PortError::Unexpected(format!("Failed to parse DOCX: {}", e)))?;
    Ok(docx_text(&docx))
}

/// One line per paragraph. Table rows become a line each with tab-separated cells.
fn docx_text(docx: &docx_rust::Docx) -> String {
    let mut lines = Vec::new();
    for content in &docx.document.body.content {
        match content {
            BodyContent::Paragraph(paragraph) => lines.push(paragraph_text(paragraph)),
            BodyContent::Table(table) => lines.extend(table_rows(table)),
            _ => {}
        }
    }
    lines.join("\n")
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    for content in &paragraph.content {
        let ParagraphContent::Run(run) = content else {
            continue;
        };
        for run_content in &run.content {
            match run_content {
                RunContent::Text(t) => text.push_str(&t.text),
                RunContent::Tab(_) => text.push('\t'),
                RunContent::Break(_) => text.push('\n'),
                _ => {}
            }
        }
    }
    text
}

fn table_rows(table: &Table) -> Vec<String> {
    let mut rows = Vec::new();
    for row in &table.rows {
        let mut cells = Vec::new();
        for cell_content in &row.cells {
            if let TableRowContent::TableCell(cell) = cell_content {
                let paragraphs: Vec<String> = cell
                    .content
                    .iter()
                    .map(|content| match content {
                        TableCellContent::Paragraph(p) => paragraph_text(p),
                    })
                    .collect();
                cells.push(paragraphs.join(" "));
            }
        }
        rows.push(cells.join("\t"));
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Writes a DOCX package whose body is `document_xml`. The other parts
    /// come from a package written by docx-rust.
    fn docx_with_body(document_xml: &str) -> tempfile::NamedTempFile {
        let mut base = std::io::Cursor::new(Vec::new());
        docx_rust::Docx::default().write(&mut base).unwrap();
        base.set_position(0);
        let mut archive = zip::ZipArchive::new(base).unwrap();

        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).unwrap();
            let name = entry.name().to_string();
            let mut contents = Vec::new();
            std::io::Read::read_to_end(&mut entry, &mut contents).unwrap();
            writer
                .start_file(name.as_str(), zip::write::SimpleFileOptions::default())
                .unwrap();
            if name == "word/document.xml" {
                writer.write_all(document_xml.as_bytes()).unwrap();
            } else {
                writer.write_all(&contents).unwrap();
            }
        }
        let bytes = writer.finish().unwrap().into_inner();

        let mut file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        file.write_all(&bytes).unwrap();
        file
    }

    #[tokio::test]
    async fn docx_decodes_entities_and_page_breaks() {
        let file = docx_with_body(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t>It&#8217;s done</w:t><w:br w:type="page"/><w:t>Next</w:t></w:r></w:p></w:body></w:document>"#,
        );

        let text = FileTextExtractor::new()
            .extract_text(file.path(), UploadKind::Docx)
            .await
            .unwrap();

        assert_eq!(text, "It\u{2019}s done\nNext");
    }

    #[tokio::test]
    async fn docx_paragraphs_and_tabs() {
        let file = docx_with_body(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><w:p><w:r><w:t xml:space="preserve">Weekly </w:t></w:r><w:r><w:t>sync</w:t></w:r></w:p><w:p><w:r><w:t>Alice</w:t><w:tab/><w:t>R&amp;D &lt;update&gt;</w:t></w:r></w:p></w:body></w:document>"#,
        );

        let text = FileTextExtractor::new()
            .extract_text(file.path(), UploadKind::Docx)
            .await
            .unwrap();

        assert_eq!(text, "Weekly sync\nAlice\tR&D <update>");
    }

    #[tokio::test]
    async fn extracts_plain_text_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all("Bob: let's ship it.\n".as_bytes()).unwrap();

        let text = FileTextExtractor::new()
            .extract_text(file.path(), UploadKind::Text)
            .await
            .unwrap();

        assert_eq!(text, "Bob: let's ship it.\n");
    }

    #[tokio::test]
    async fn rejects_corrupt_docx() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"definitely not a zip archive").unwrap();

        let result = FileTextExtractor::new()
            .extract_text(file.path(), UploadKind::Docx)
            .await;

        assert!(matches!(result, Err(PortError::Unexpected(_))));
    }
}
