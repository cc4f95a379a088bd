//! Text Extractor: turns an uploaded document into resume text.
//!
//! PDF bytes go to the model as inline data; plain text is decoded locally;
//! DOCX paragraphs are read with `docx-rs` and handed to the model as context.
//! The model's transcription is the extracted text in every case.

use docx_rs::{
    read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCellContent,
    TableChild, TableRowChild,
};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::{LanguageModel, Part};
use crate::resume::prompts::EXTRACT_TEXT_PROMPT;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    PlainText,
    Docx,
}

impl DocumentKind {
    /// Matches on the MIME essence, so `text/plain; charset=utf-8` is accepted.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            MIME_PDF => Some(DocumentKind::Pdf),
            MIME_TEXT => Some(DocumentKind::PlainText),
            MIME_DOCX => Some(DocumentKind::Docx),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            DocumentKind::Pdf => MIME_PDF,
            DocumentKind::PlainText => MIME_TEXT,
            DocumentKind::Docx => MIME_DOCX,
        }
    }
}

/// Builds the model part that represents the uploaded document.
pub fn document_part(kind: DocumentKind, bytes: &[u8]) -> Result<Part, AppError> {
    match kind {
        DocumentKind::Pdf => Ok(Part::inline(MIME_PDF, bytes)),
        DocumentKind::PlainText => Ok(Part::text(String::from_utf8_lossy(bytes).into_owned())),
        DocumentKind::Docx => Ok(Part::text(extract_docx_text(bytes)?)),
    }
}

/// Asks the model for a plain-text transcription of the document part.
pub async fn transcribe(llm: &dyn LanguageModel, document: &Part) -> Result<String, AppError> {
    let text = llm
        .generate_from_parts(vec![Part::text(EXTRACT_TEXT_PROMPT), document.clone()])
        .await?;
    info!(text_len = text.len(), "Resume text extracted");
    Ok(text)
}

/// Reads paragraph text (body, tables, hyperlinks) from a DOCX archive.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, AppError> {
    let docx = read_docx(bytes)
        .map_err(|e| AppError::Validation(format!("Could not read DOCX file: {e}")))?;

    let mut lines = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => lines.push(paragraph_text(paragraph)),
            DocumentChild::Table(table) => push_table_lines(table, &mut lines),
            _ => {}
        }
    }

    Ok(lines.join("\n").trim().to_string())
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut out = String::new();
    for child in &paragraph.children {
        push_paragraph_child(child, &mut out);
    }
    out
}

fn push_paragraph_child(child: &ParagraphChild, out: &mut String) {
    match child {
        ParagraphChild::Run(run) => {
            for run_child in &run.children {
                match run_child {
                    RunChild::Text(text) => out.push_str(&text.text),
                    RunChild::Tab(_) => out.push('\t'),
                    RunChild::Break(_) => out.push('\n'),
                    _ => {}
                }
            }
        }
        ParagraphChild::Hyperlink(link) => {
            for nested in &link.children {
                push_paragraph_child(nested, out);
            }
        }
        _ => {}
    }
}

#[allow(irrefutable_let_patterns)]
fn push_table_lines(table: &Table, lines: &mut Vec<String>) {
    for row in &table.rows {
        if let TableChild::TableRow(row) = row {
            let mut cells = Vec::new();
            for cell in &row.cells {
                if let TableRowChild::TableCell(cell) = cell {
                    let mut cell_text = Vec::new();
                    for content in &cell.children {
                        if let TableCellContent::Paragraph(paragraph) = content {
                            cell_text.push(paragraph_text(paragraph));
                        }
                    }
                    cells.push(cell_text.join(" "));
                }
            }
            lines.push(cells.join("\t"));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use docx_rs::{Docx, Run, TableCell, TableRow};

    use super::*;
    use crate::llm_client::testing::ScriptedModel;

    fn pack(docx: Docx) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        docx.build().pack(&mut buf).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_from_mime_accepts_the_three_supported_types() {
        assert_eq!(DocumentKind::from_mime("application/pdf"), Some(DocumentKind::Pdf));
        assert_eq!(
            DocumentKind::from_mime("text/plain; charset=utf-8"),
            Some(DocumentKind::PlainText)
        );
        assert_eq!(DocumentKind::from_mime(MIME_DOCX), Some(DocumentKind::Docx));
    }

    #[test]
    fn test_from_mime_rejects_everything_else() {
        assert_eq!(DocumentKind::from_mime("image/png"), None);
        assert_eq!(DocumentKind::from_mime("application/msword"), None);
        assert_eq!(DocumentKind::from_mime(""), None);
    }

    #[test]
    fn test_plain_text_part_is_decoded_locally() {
        let part = document_part(DocumentKind::PlainText, "Jane Doe\nRust".as_bytes()).unwrap();
        assert_eq!(part.as_text(), Some("Jane Doe\nRust"));
    }

    #[test]
    fn test_pdf_part_is_inline_data() {
        let part = document_part(DocumentKind::Pdf, b"%PDF-1.4").unwrap();
        assert!(part.as_text().is_none());
    }

    #[test]
    fn test_extract_docx_reads_paragraphs_and_tables() {
        let docx = Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("Jane Doe")))
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text("Experience: "))
                    .add_run(Run::new().add_text("Acme Corp")),
            )
            .add_table(Table::new(vec![TableRow::new(vec![
                TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("Skills"))),
                TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text("Rust"))),
            ])]));

        let text = extract_docx_text(&pack(docx)).unwrap();

        assert!(text.contains("Jane Doe"));
        assert!(text.contains("Acme Corp"));
        assert!(text.contains("Skills"));
        assert!(text.contains("Rust"));
    }

    #[test]
    fn test_extract_docx_rejects_garbage() {
        let err = extract_docx_text(b"definitely not a zip archive").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_transcribe_sends_instruction_then_document() {
        let model = ScriptedModel::replying("Jane Doe - Rust Engineer");
        let part = Part::text("raw resume");

        let text = transcribe(model.as_ref(), &part).await.unwrap();

        assert_eq!(text, "Jane Doe - Rust Engineer");
        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0].parts[0].as_text(), Some(EXTRACT_TEXT_PROMPT));
        assert_eq!(calls[0][0].parts[1], part);
    }
}
