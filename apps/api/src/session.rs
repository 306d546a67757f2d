//! The single coordinating context that owns all shared run state: job
//! description, document list, result list, run status, progress, and the
//! last error. Nothing here survives a process restart.
//!
//! Every mutation goes through a method that enforces the `RunStatus`
//! transition table, so the status can only move along defined edges.

use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{
    AnalysisResult, DocumentSummary, Progress, RunStatus, UploadedDocument,
};

#[derive(Debug, Default)]
pub struct Session {
    jd: String,
    documents: Vec<UploadedDocument>,
    results: Vec<AnalysisResult>,
    status: RunStatus,
    progress: Progress,
    last_error: Option<String>,
}

/// Client-facing view of the session.
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub status: RunStatus,
    pub progress: Progress,
    pub jd_chars: usize,
    pub documents: Vec<DocumentSummary>,
    pub results: Vec<AnalysisResult>,
    pub last_error: Option<String>,
}

impl Session {
    pub fn status(&self) -> RunStatus {
        self.status
    }

    pub fn results(&self) -> &[AnalysisResult] {
        &self.results
    }

    pub fn set_jd(&mut self, text: String) {
        self.jd = text;
    }

    fn transition(&mut self, next: RunStatus) {
        debug_assert!(
            self.status.can_transition_to(next),
            "illegal run status transition {:?} -> {next:?}",
            self.status
        );
        tracing::debug!(from = ?self.status, to = ?next, "run status transition");
        self.status = next;
    }

    /// Marks the start of a file-parsing batch. Rejected while another batch
    /// or an analysis run is in flight.
    pub fn begin_parsing(&mut self) -> Result<(), AppError> {
        if self.status.is_busy() {
            return Err(AppError::Conflict(
                "another operation is already in flight".to_string(),
            ));
        }
        if self.status != RunStatus::Idle {
            // Coming out of Success/Error: adding more files starts a fresh
            // editing phase, but existing results stay visible until reset.
            self.transition(RunStatus::Idle);
        }
        self.transition(RunStatus::ParsingFiles);
        Ok(())
    }

    /// Ends a file-parsing batch, successful or not.
    pub fn finish_parsing(&mut self) {
        self.transition(RunStatus::Idle);
    }

    /// Appends a successfully extracted document. Never replaces the list.
    pub fn push_document(&mut self, doc: UploadedDocument) {
        self.documents.push(doc);
    }

    /// Removes exactly one document by id, preserving the relative order of
    /// the rest.
    pub fn remove_document(&mut self, id: Uuid) -> Result<(), AppError> {
        let index = self
            .documents
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| AppError::NotFound(format!("document {id} not found")))?;
        self.documents.remove(index);
        Ok(())
    }

    /// Validates preconditions and transitions into `Analyzing`, handing the
    /// caller an owned copy of the inputs for the run task. No network call
    /// may happen before this succeeds.
    pub fn begin_analysis(&mut self) -> Result<(String, Vec<UploadedDocument>), AppError> {
        if self.status.is_busy() {
            let message = if self.status == RunStatus::ParsingFiles {
                "files are still being parsed"
            } else {
                "an analysis run is already in flight"
            };
            return Err(AppError::Conflict(message.to_string()));
        }
        if self.jd.trim().is_empty() {
            return Err(AppError::PreconditionViolation(
                "job description is empty".to_string(),
            ));
        }
        if self.documents.is_empty() {
            return Err(AppError::PreconditionViolation(
                "no resumes uploaded".to_string(),
            ));
        }

        self.results.clear();
        self.last_error = None;
        self.progress = Progress {
            completed: 0,
            total: self.documents.len(),
        };
        self.transition(RunStatus::Analyzing);
        Ok((self.jd.clone(), self.documents.clone()))
    }

    pub fn record_progress(&mut self, completed: usize) {
        self.progress.completed = completed;
    }

    /// Commits a completed batch atomically and settles the run.
    pub fn complete_analysis(&mut self, results: Vec<AnalysisResult>) {
        self.progress.completed = self.progress.total;
        self.results = results;
        self.transition(RunStatus::Success);
    }

    /// Aborts the run: partial results never reach the success path.
    pub fn fail_analysis(&mut self, message: String) {
        self.results.clear();
        self.last_error = Some(message);
        self.transition(RunStatus::Error);
    }

    /// Discards results and error state. Documents and the JD are kept, as
    /// the recruiter typically tweaks the batch and re-runs.
    pub fn reset(&mut self) -> Result<(), AppError> {
        if self.status == RunStatus::Analyzing {
            return Err(AppError::Conflict(
                "cannot reset while an analysis run is in flight".to_string(),
            ));
        }
        if self.status == RunStatus::ParsingFiles {
            return Err(AppError::Conflict(
                "cannot reset while files are being parsed".to_string(),
            ));
        }
        self.results.clear();
        self.last_error = None;
        self.progress = Progress::default();
        self.transition(RunStatus::Idle);
        Ok(())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            progress: self.progress,
            jd_chars: self.jd.chars().count(),
            documents: self.documents.iter().map(DocumentSummary::from).collect(),
            results: self.results.clone(),
            last_error: self.last_error.clone(),
        }
    }
}
