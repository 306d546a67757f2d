//! Prompt and response-schema constants for the match analysis call.

use serde_json::{json, Value};

/// System prompt for JD/CV match analysis. Input documents may be in any
/// language; every textual field of the output is Traditional Chinese.
pub const MATCH_SYSTEM: &str = "你是一位資深的 HR 招聘專家。請根據使用者提供的【職位描述 JD】與【候選人簡歷 CV】，進行人崗匹配度分析。

核心指標分析要求：
1. 技術契合度 (Technical Fit)
2. 經驗水平 (Experience Level)
3. 學歷與背景 (Education & Background)
4. 軟實力與文化 (Soft Skills & Culture)

無論原文是什麼語言，請務必使用繁體中文回答。請以 JSON 格式輸出，不要包含 Markdown 標記。";

/// Match analysis prompt template. Replace `{jd}` and `{cv_text}` before
/// sending.
pub const MATCH_PROMPT_TEMPLATE: &str = "職位描述 (JD):\n{jd}\n\n候選人簡歷 (CV):\n{cv_text}\n";

/// Structured-output schema for the match report. Gemini enforces this
/// server-side; the client still re-validates the parsed result and fails
/// closed on any mismatch.
pub fn match_report_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "match_score": {
                "type": "INTEGER",
                "description": "0-100 的總體匹配分數"
            },
            "summary": {
                "type": "STRING",
                "description": "一句話核心評語"
            },
            "dimensions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "指標名稱" },
                        "score": { "type": "INTEGER", "description": "0-100 的分項分數" }
                    },
                    "required": ["name", "score"]
                },
                "description": "包含：技術契合度、經驗水平、學歷背景、軟實力這四個指標"
            },
            "pros": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "優點/加分項清單"
            },
            "cons": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "缺失技能或風險項清單"
            },
            "interview_questions": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "建議面試題目"
            }
        },
        "required": ["match_score", "summary", "dimensions", "pros", "cons", "interview_questions"]
    })
}
