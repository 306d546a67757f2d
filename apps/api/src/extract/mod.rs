//! Text Extractor — turns an uploaded file into plain text.
//!
//! Dispatch is strictly by filename extension (case-insensitive): PDF goes
//! through `pdf-extract`, DOCX through `docx-rs`, TXT is decoded directly.
//! Format internals are treated as black boxes; anything the decoders cannot
//! handle surfaces as `ExtractionFailed` for that one file.

use docx_rs::{
    read_docx, DocumentChild, Insert, InsertChild, Paragraph, ParagraphChild, Run, RunChild,
    Table, TableCellContent, TableChild, TableRowChild,
};
use pdf_extract::extract_text_from_mem;
use std::path::Path;
use thiserror::Error;

use crate::models::SourceFormat;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file format ({0}); upload a PDF, DOCX, or TXT file")]
    UnsupportedFormat(String),

    #[error("failed to extract text from '{filename}': {reason}")]
    ExtractionFailed { filename: String, reason: String },
}

/// Plain text pulled out of one uploaded file.
#[derive(Debug, Clone)]
pub struct Extracted {
    pub text: String,
    pub source_format: SourceFormat,
}

/// Extracts plain text from `bytes`, dispatching on the extension of
/// `filename`.
pub fn extract_document(filename: &str, bytes: &[u8]) -> Result<Extracted, ExtractError> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());

    let failed = |reason: String| ExtractError::ExtractionFailed {
        filename: filename.to_string(),
        reason,
    };

    match extension.as_deref() {
        Some("pdf") => {
            let text = extract_text_from_mem(bytes).map_err(|e| failed(e.to_string()))?;
            Ok(Extracted {
                text: text.trim().to_string(),
                source_format: SourceFormat::Pdf,
            })
        }
        Some("docx") => {
            let text = extract_docx_text(bytes).map_err(failed)?;
            Ok(Extracted {
                text,
                source_format: SourceFormat::Docx,
            })
        }
        Some("txt") => Ok(Extracted {
            text: String::from_utf8_lossy(bytes).into_owned(),
            source_format: SourceFormat::Txt,
        }),
        Some(other) => Err(ExtractError::UnsupportedFormat(other.to_string())),
        None => Err(ExtractError::UnsupportedFormat("(none)".to_string())),
    }
}

/// Raw-text extraction from a DOCX package: paragraphs and table cells are
/// walked in document order and joined with newlines. No formatting survives.
fn extract_docx_text(bytes: &[u8]) -> Result<String, String> {
    let package = read_docx(bytes).map_err(|e| e.to_string())?;

    let mut segments = Vec::new();
    for child in &package.document.children {
        collect_document_child(child, &mut segments);
    }
    Ok(segments.join("\n"))
}

fn collect_document_child(child: &DocumentChild, segments: &mut Vec<String>) {
    match child {
        DocumentChild::Paragraph(paragraph) => {
            if let Some(text) = paragraph_text(paragraph.as_ref()) {
                segments.push(text);
            }
        }
        DocumentChild::Table(table) => collect_table(table.as_ref(), segments),
        _ => {}
    }
}

fn paragraph_text(paragraph: &Paragraph) -> Option<String> {
    let mut buffer = String::new();
    for child in &paragraph.children {
        match child {
            ParagraphChild::Run(run) => append_run_text(run.as_ref(), &mut buffer),
            ParagraphChild::Insert(insert) => append_insert_text(insert, &mut buffer),
            ParagraphChild::Hyperlink(hyperlink) => {
                for inner in &hyperlink.children {
                    if let ParagraphChild::Run(run) = inner {
                        append_run_text(run.as_ref(), &mut buffer);
                    }
                }
            }
            _ => {}
        }
    }

    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn collect_table(table: &Table, segments: &mut Vec<String>) {
    for row in &table.rows {
        let TableChild::TableRow(row) = row;
        for cell in &row.cells {
            let TableRowChild::TableCell(cell) = cell;
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(paragraph) => {
                        if let Some(text) = paragraph_text(paragraph) {
                            segments.push(text);
                        }
                    }
                    TableCellContent::Table(inner) => collect_table(inner, segments),
                    _ => {}
                }
            }
        }
    }
}

fn append_insert_text(insert: &Insert, buffer: &mut String) {
    for child in &insert.children {
        if let InsertChild::Run(run) = child {
            append_run_text(run.as_ref(), buffer);
        }
    }
}

fn append_run_text(run: &Run, buffer: &mut String) {
    for child in &run.children {
        match child {
            RunChild::Text(text) => buffer.push_str(&text.text),
            RunChild::Break(_) => buffer.push('\n'),
            RunChild::Tab(_) => buffer.push('\t'),
            _ => {}
        }
    }
}
