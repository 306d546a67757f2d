//! Batch Analysis Orchestrator — one sequential pass over the ingested
//! documents, one LLM call each, abort on the first failure.
//!
//! Sequencing is deliberate: predictable load on the reasoning service wins
//! over throughput here. Note the asymmetry with ingestion, which tolerates
//! per-file failures; a failed analysis discards the whole batch.

use tracing::{error, info};

use crate::analysis::MatchAnalyzer;
use crate::errors::AppError;
use crate::llm_client::LlmError;
use crate::models::{AnalysisResult, UploadedDocument};
use crate::state::AppState;

/// Runs the batch as an explicit task sequence: strictly one document at a
/// time, in ingestion order. The first failure aborts the loop and the
/// partial results are dropped with the returned error. `on_progress` fires
/// after each completed document with (completed, total).
pub async fn run_batch<F>(
    jd: &str,
    documents: &[UploadedDocument],
    analyzer: &dyn MatchAnalyzer,
    mut on_progress: F,
) -> Result<Vec<AnalysisResult>, LlmError>
where
    F: FnMut(usize, usize),
{
    let total = documents.len();
    let mut results = Vec::with_capacity(total);

    for (index, document) in documents.iter().enumerate() {
        info!(
            document = %document.name,
            position = index + 1,
            total,
            "analyzing candidate"
        );
        let report = analyzer.analyze(jd, &document.text).await?;
        results.push(report.into_result(document.name.clone()));
        on_progress(index + 1, total);
    }

    Ok(results)
}

/// Validates preconditions, transitions the session into `Analyzing`, and
/// spawns the batch run. Returns the number of documents queued. The spawned
/// task re-locks the session between documents, so status and progress stay
/// observable for the whole run.
pub fn start_run(state: &AppState) -> Result<usize, AppError> {
    let (jd, documents) = state.session_mut().begin_analysis()?;
    let total = documents.len();

    let task_state = state.clone();
    tokio::spawn(async move {
        let analyzer = task_state.analyzer.clone();
        let progress_state = task_state.clone();

        let outcome = run_batch(&jd, &documents, analyzer.as_ref(), |completed, _total| {
            progress_state.session_mut().record_progress(completed);
        })
        .await;

        match outcome {
            Ok(results) => {
                info!(count = results.len(), "analysis batch complete");
                task_state.session_mut().complete_analysis(results);
            }
            Err(err) => {
                error!("analysis batch failed: {err}");
                task_state.session_mut().fail_analysis(err.to_string());
            }
        }
    });

    Ok(total)
}
