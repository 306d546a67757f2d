//! Core data model: uploaded documents, analysis reports, and the run status
//! state machine shared by the whole session.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::extract::Extracted;

/// Source format of an uploaded document, derived from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Pdf,
    Docx,
    Txt,
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::Pdf => write!(f, "pdf"),
            SourceFormat::Docx => write!(f, "docx"),
            SourceFormat::Txt => write!(f, "txt"),
        }
    }
}

/// A successfully ingested resume. Immutable after creation; owned by the
/// session's document list and removable by id.
#[derive(Debug, Clone, Serialize)]
pub struct UploadedDocument {
    pub id: Uuid,
    pub name: String,
    pub text: String,
    pub source_format: SourceFormat,
}

impl UploadedDocument {
    pub fn new(name: String, extracted: Extracted) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            text: extracted.text,
            source_format: extracted.source_format,
        }
    }
}

/// Listing view of a document — everything but the extracted text, which can
/// run to many kilobytes and is never needed by the client.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub name: String,
    pub source_format: SourceFormat,
}

impl From<&UploadedDocument> for DocumentSummary {
    fn from(doc: &UploadedDocument) -> Self {
        Self {
            id: doc.id,
            name: doc.name.clone(),
            source_format: doc.source_format,
        }
    }
}

/// One of the four fixed competency sub-scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetencyDimension {
    pub name: String,
    pub score: u8,
}

/// Full match report for one candidate, tagged with its source filename.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub filename: String,
    pub match_score: u8,
    pub summary: String,
    pub dimensions: Vec<CompetencyDimension>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub interview_questions: Vec<String>,
}

/// Process-wide run status. A single value owned by the session; every
/// mutation goes through `Session`, which enforces the transition table
/// below instead of leaving the status as ambient mutable state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    #[default]
    Idle,
    ParsingFiles,
    Analyzing,
    Success,
    Error,
}

impl RunStatus {
    /// Legal transitions:
    /// Idle -> ParsingFiles -> Idle, Idle -> Analyzing -> {Success, Error},
    /// and back to Idle (or a new batch) from the terminal states.
    /// There is no way out of Analyzing other than the run settling.
    pub fn can_transition_to(self, next: RunStatus) -> bool {
        use RunStatus::*;
        matches!(
            (self, next),
            (Idle, Idle)
                | (Idle, ParsingFiles)
                | (Idle, Analyzing)
                | (ParsingFiles, Idle)
                | (Analyzing, Success)
                | (Analyzing, Error)
                | (Success, Idle)
                | (Success, ParsingFiles)
                | (Success, Analyzing)
                | (Error, Idle)
                | (Error, ParsingFiles)
                | (Error, Analyzing)
        )
    }

    /// True while file parsing or an analysis run is in flight.
    pub fn is_busy(self) -> bool {
        matches!(self, RunStatus::ParsingFiles | RunStatus::Analyzing)
    }
}

/// Batch progress, observable while status is `Analyzing`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}
