//! Batch Ingestion Controller — accepts a batch of uploaded resume files,
//! extracts each one independently, and appends the successes to the
//! session's document list.
//!
//! Best-effort by design: one corrupt file is recorded in the report and
//! does not stop its siblings. (Contrast with analysis, which is
//! all-or-nothing.)

use anyhow::anyhow;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::extract::extract_document;
use crate::models::{DocumentSummary, UploadedDocument};
use crate::state::AppState;

/// One file lifted out of a multipart upload.
#[derive(Debug)]
pub struct IngestedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct IngestFailure {
    pub filename: String,
    pub error: String,
}

/// Outcome of one upload batch: which documents were added, which files
/// failed and why.
#[derive(Debug, Default, Serialize)]
pub struct BatchIngestReport {
    pub added: Vec<DocumentSummary>,
    pub failures: Vec<IngestFailure>,
}

/// Extracts every file in the batch and appends the successes to the
/// session document list in completion order. The session shows
/// `ParsingFiles` for the duration and returns to `Idle` afterwards,
/// whether or not some files failed.
///
/// Decoding runs on the blocking pool: PDF/DOCX parsing is CPU-bound and
/// must not stall the async workers serving progress polls.
pub async fn ingest_files(
    state: &AppState,
    files: Vec<IngestedFile>,
) -> Result<BatchIngestReport, AppError> {
    state.session_mut().begin_parsing()?;

    let outcomes = tokio::task::spawn_blocking(move || {
        files
            .into_iter()
            .map(|file| {
                let outcome = extract_document(&file.filename, &file.bytes);
                (file.filename, outcome)
            })
            .collect::<Vec<_>>()
    })
    .await;

    let outcomes = match outcomes {
        Ok(outcomes) => outcomes,
        Err(join_err) => {
            state.session_mut().finish_parsing();
            return Err(AppError::Internal(anyhow!(
                "extraction task failed: {join_err}"
            )));
        }
    };

    let mut report = BatchIngestReport::default();
    for (filename, outcome) in outcomes {
        match outcome {
            Ok(extracted) => {
                let document = UploadedDocument::new(filename, extracted);
                info!(
                    document = %document.name,
                    format = %document.source_format,
                    chars = document.text.chars().count(),
                    "resume ingested"
                );
                report.added.push(DocumentSummary::from(&document));
                state.session_mut().push_document(document);
            }
            Err(err) => {
                warn!(filename = %filename, "resume ingestion failed: {err}");
                report.failures.push(IngestFailure {
                    filename,
                    error: err.to_string(),
                });
            }
        }
    }

    state.session_mut().finish_parsing();
    Ok(report)
}
