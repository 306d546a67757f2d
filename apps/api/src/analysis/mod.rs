//! Match Analysis Client — scores one (JD, resume) pair via the reasoning
//! service and validates the structured response.
//!
//! The orchestrator talks to the `MatchAnalyzer` trait, not the Gemini
//! backend directly, so batch semantics can be tested with a scripted
//! analyzer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::llm_client::prompts::{match_report_schema, MATCH_PROMPT_TEMPLATE, MATCH_SYSTEM};
use crate::llm_client::{LlmClient, LlmError};
use crate::models::{AnalysisResult, CompetencyDimension};

pub mod orchestrator;

/// Number of competency dimensions the report must carry
/// (technical fit, experience, education/background, soft skills).
pub const DIMENSION_COUNT: usize = 4;

/// One validated match report, before it is tagged with a filename.
/// Deserialization fails closed: a response missing any field is rejected
/// whole, never accepted partially.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub match_score: u8,
    pub summary: String,
    pub dimensions: Vec<CompetencyDimension>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub interview_questions: Vec<String>,
}

impl AnalysisReport {
    /// Checks the invariants serde cannot express: exactly four dimensions,
    /// every score within 0-100.
    pub fn validate(&self) -> Result<(), LlmError> {
        if self.dimensions.len() != DIMENSION_COUNT {
            return Err(LlmError::MalformedResponse(format!(
                "expected {DIMENSION_COUNT} competency dimensions, got {}",
                self.dimensions.len()
            )));
        }
        if self.match_score > 100 {
            return Err(LlmError::MalformedResponse(format!(
                "match_score {} is out of range",
                self.match_score
            )));
        }
        if let Some(dim) = self.dimensions.iter().find(|d| d.score > 100) {
            return Err(LlmError::MalformedResponse(format!(
                "dimension '{}' score {} is out of range",
                dim.name, dim.score
            )));
        }
        Ok(())
    }

    /// Tags the report with its source filename, producing the batch-level
    /// result entry.
    pub fn into_result(self, filename: String) -> AnalysisResult {
        AnalysisResult {
            filename,
            match_score: self.match_score,
            summary: self.summary,
            dimensions: self.dimensions,
            pros: self.pros,
            cons: self.cons,
            interview_questions: self.interview_questions,
        }
    }
}

/// Scores one resume against one job description.
#[async_trait]
pub trait MatchAnalyzer: Send + Sync {
    async fn analyze(&self, jd: &str, resume_text: &str) -> Result<AnalysisReport, LlmError>;
}

/// Gemini-backed analyzer. One LLM call per resume, no retries.
pub struct GeminiAnalyzer {
    llm: LlmClient,
}

impl GeminiAnalyzer {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl MatchAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, jd: &str, resume_text: &str) -> Result<AnalysisReport, LlmError> {
        let prompt = MATCH_PROMPT_TEMPLATE
            .replace("{jd}", jd)
            .replace("{cv_text}", resume_text);

        let report: AnalysisReport = self
            .llm
            .call_json(&prompt, MATCH_SYSTEM, match_report_schema())
            .await?;
        report.validate()?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::decode_json;

    fn dimension(name: &str, score: u8) -> CompetencyDimension {
        CompetencyDimension {
            name: name.to_string(),
            score,
        }
    }

    fn valid_report() -> AnalysisReport {
        AnalysisReport {
            match_score: 82,
            summary: "整體契合度高".to_string(),
            dimensions: vec![
                dimension("技術契合度", 85),
                dimension("經驗水平", 80),
                dimension("學歷背景", 75),
                dimension("軟實力", 88),
            ],
            pros: vec!["五年 Rust 後端經驗".to_string()],
            cons: vec!["缺乏團隊管理經驗".to_string()],
            interview_questions: vec!["請描述你處理過最複雜的併發問題".to_string()],
        }
    }

    const FULL_RESPONSE: &str = r#"{
        "match_score": 76,
        "summary": "技術面符合，經驗稍淺",
        "dimensions": [
            {"name": "技術契合度", "score": 80},
            {"name": "經驗水平", "score": 65},
            {"name": "學歷背景", "score": 85},
            {"name": "軟實力", "score": 70}
        ],
        "pros": ["熟悉分散式系統"],
        "cons": ["缺少雲端部署經驗"],
        "interview_questions": ["如何設計一個高可用的任務佇列？"]
    }"#;

    #[test]
    fn test_full_response_parses_and_validates() {
        let report: AnalysisReport = decode_json(FULL_RESPONSE).unwrap();
        assert_eq!(report.match_score, 76);
        assert_eq!(report.dimensions.len(), 4);
        report.validate().unwrap();
    }

    #[test]
    fn test_response_missing_pros_is_malformed() {
        // Same payload with the `pros` array removed: rejected whole,
        // not coerced into a partial report.
        let raw = r#"{
            "match_score": 76,
            "summary": "ok",
            "dimensions": [
                {"name": "a", "score": 1},
                {"name": "b", "score": 2},
                {"name": "c", "score": 3},
                {"name": "d", "score": 4}
            ],
            "cons": [],
            "interview_questions": []
        }"#;
        let err = decode_json::<AnalysisReport>(raw).unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }

    #[test]
    fn test_fenced_response_still_parses() {
        let fenced = format!("```json\n{FULL_RESPONSE}\n```");
        let report: AnalysisReport = decode_json(&fenced).unwrap();
        assert_eq!(report.dimensions.len(), 4);
    }

    #[test]
    fn test_wrong_dimension_count_fails_validation() {
        let mut report = valid_report();
        report.dimensions.pop();
        let err = report.validate().unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }

    #[test]
    fn test_out_of_range_scores_fail_validation() {
        let mut report = valid_report();
        report.match_score = 101;
        assert!(report.validate().is_err());

        let mut report = valid_report();
        report.dimensions[2].score = 120;
        assert!(report.validate().is_err());
    }

    #[test]
    fn test_into_result_tags_filename() {
        let result = valid_report().into_result("jane.pdf".to_string());
        assert_eq!(result.filename, "jane.pdf");
        assert_eq!(result.match_score, 82);
        assert_eq!(result.dimensions.len(), 4);
    }
}
