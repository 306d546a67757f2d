pub mod handlers;
pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/session", get(handlers::handle_get_session))
        .route("/api/v1/jd", put(handlers::handle_set_jd))
        .route("/api/v1/jd/file", post(handlers::handle_upload_jd))
        .route("/api/v1/resumes", post(handlers::handle_upload_resumes))
        .route(
            "/api/v1/resumes/:id",
            delete(handlers::handle_remove_resume),
        )
        .route("/api/v1/analyze", post(handlers::handle_analyze))
        .route("/api/v1/results", get(handlers::handle_get_results))
        .route("/api/v1/reset", post(handlers::handle_reset))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisReport, MatchAnalyzer};
    use crate::llm_client::LlmError;
    use crate::models::{CompetencyDimension, RunStatus};
    use crate::state::AppState;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct FixedAnalyzer;

    #[async_trait]
    impl MatchAnalyzer for FixedAnalyzer {
        async fn analyze(&self, _jd: &str, _cv: &str) -> Result<AnalysisReport, LlmError> {
            Ok(AnalysisReport {
                match_score: 88,
                summary: "整體契合度高".to_string(),
                dimensions: vec![
                    CompetencyDimension {
                        name: "技術契合度".to_string(),
                        score: 90,
                    },
                    CompetencyDimension {
                        name: "經驗水平".to_string(),
                        score: 85,
                    },
                    CompetencyDimension {
                        name: "學歷背景".to_string(),
                        score: 80,
                    },
                    CompetencyDimension {
                        name: "軟實力".to_string(),
                        score: 92,
                    },
                ],
                pros: vec!["扎實的系統程式背景".to_string()],
                cons: vec![],
                interview_questions: vec!["介紹一個你主導的專案".to_string()],
            })
        }
    }

    fn test_state() -> AppState {
        AppState::new(Arc::new(FixedAnalyzer))
    }

    const BOUNDARY: &str = "test-boundary";

    fn multipart_body(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (filename, bytes) in files {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(uri: &str, files: &[(&str, &[u8])]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(files)))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let response = build_router(test_state())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_analyze_without_documents_is_precondition_violation() {
        let state = test_state();
        state.session_mut().set_jd("Senior Rust Engineer".to_string());

        let response = build_router(state)
            .oneshot(
                Request::post("/api/v1/analyze")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "PRECONDITION_VIOLATION");
    }

    #[tokio::test]
    async fn test_remove_unknown_resume_is_404() {
        let response = build_router(test_state())
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/v1/resumes/{}", uuid::Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_resume_upload_reports_partial_failure() {
        let state = test_state();
        let request = multipart_request(
            "/api/v1/resumes",
            &[
                ("good.txt", b"candidate resume text".as_slice()),
                ("bad.csv", b"a,b,c".as_slice()),
            ],
        );

        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["added"].as_array().unwrap().len(), 1);
        assert_eq!(body["failures"].as_array().unwrap().len(), 1);
        assert_eq!(body["failures"][0]["filename"], "bad.csv");
        assert_eq!(state.session().snapshot().documents.len(), 1);
    }

    #[tokio::test]
    async fn test_jd_file_upload_sets_job_description() {
        let state = test_state();
        let request = multipart_request("/api/v1/jd/file", &[("jd.txt", b"Rust backend role".as_slice())]);

        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["filename"], "jd.txt");
        assert_eq!(state.session().snapshot().jd_chars, 17);
    }

    #[tokio::test]
    async fn test_jd_file_upload_with_unsupported_format_is_415() {
        let response = build_router(test_state())
            .oneshot(multipart_request(
                "/api/v1/jd/file",
                &[("jd.csv", b"a,b".as_slice())],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_full_flow_upload_analyze_poll_results() {
        let state = test_state();
        let router = build_router(state.clone());

        // Upload two resumes and a JD
        router
            .clone()
            .oneshot(multipart_request(
                "/api/v1/resumes",
                &[
                    ("alice.txt", b"alice resume".as_slice()),
                    ("bob.txt", b"bob resume".as_slice()),
                ],
            ))
            .await
            .unwrap();
        router
            .clone()
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/v1/jd")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"text": "Senior Rust Engineer"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        // Start the run
        let response = router
            .clone()
            .oneshot(
                Request::post("/api/v1/analyze")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        let body = json_body(response).await;
        assert_eq!(body["total"], 2);

        // Wait for the spawned run to settle
        for _ in 0..1000 {
            if state.session().status() == RunStatus::Success {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(state.session().status(), RunStatus::Success);

        let response = router
            .clone()
            .oneshot(Request::get("/api/v1/results").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let results = json_body(response).await;
        let results = results.as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["filename"], "alice.txt");
        assert_eq!(results[1]["filename"], "bob.txt");
        assert_eq!(results[0]["dimensions"].as_array().unwrap().len(), 4);

        // Reset discards results but keeps documents
        let response = router
            .clone()
            .oneshot(Request::post("/api/v1/reset").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let snapshot = state.session().snapshot();
        assert_eq!(snapshot.status, RunStatus::Idle);
        assert!(snapshot.results.is_empty());
        assert_eq!(snapshot.documents.len(), 2);
    }
}
