pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::quiz::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/catalog", get(handlers::handle_catalog))
        // Custom-topic flow
        .route(
            "/api/v1/custom-tests",
            post(handlers::handle_create_custom_test),
        )
        // Quiz sessions
        .route("/api/v1/sessions", post(handlers::handle_start_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_close_session),
        )
        .route(
            "/api/v1/sessions/:id/answer",
            put(handlers::handle_select_answer),
        )
        .route("/api/v1/sessions/:id/next", post(handlers::handle_next))
        .route(
            "/api/v1/sessions/:id/previous",
            post(handlers::handle_previous),
        )
        .route("/api/v1/sessions/:id/submit", post(handlers::handle_submit))
        // Results
        .route("/api/v1/results", get(handlers::handle_get_results))
        .route("/api/v1/results/retake", post(handlers::handle_retake))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::config::Config;
    use crate::handoff::{Handoff, MemoryHandoffStore};
    use crate::llm_client::{scripted::ScriptedGenerator, LlmError};
    use crate::quiz::session::SessionRegistry;

    fn test_state(llm: ScriptedGenerator) -> AppState {
        let config = Config::for_tests();
        let handoff = Handoff::new(Arc::new(MemoryHandoffStore::new()));
        AppState {
            llm: Arc::new(llm),
            sessions: SessionRegistry::new(handoff.clone(), config.timer()),
            handoff,
            config,
        }
    }

    /// Model output with `n` questions whose correct answer is always option 1.
    fn questions_reply(n: usize) -> String {
        let items: Vec<Value> = (0..n)
            .map(|i| {
                json!({
                    "question": format!("What does line {i} print?"),
                    "options": ["0", "1", "2", "3"],
                    "correctAnswer": 1,
                    "explanation": "It prints one."
                })
            })
            .collect();
        format!("Here are your questions:\n```json\n{}\n```", Value::Array(items))
    }

    async fn send(state: &AppState, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = build_router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn test_health_check() {
        let state = test_state(ScriptedGenerator::new());
        let (status, body) = send(&state, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "techprep-api");
    }

    #[tokio::test]
    async fn test_catalog_lists_roles_and_levels() {
        let state = test_state(ScriptedGenerator::new());
        let (status, body) = send(&state, "GET", "/api/v1/catalog", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["roles"].as_array().unwrap().len(), 6);
        assert_eq!(body["levels"][2]["value"], "mid-level");
    }

    #[tokio::test]
    async fn test_role_quiz_end_to_end() {
        let llm = ScriptedGenerator::new()
            .with_response(questions_reply(3))
            .with_response("Strengths:\n- Reads code carefully\n\nWeaknesses:\n- Guessing");
        let state = test_state(llm);
        let client = Uuid::new_v4();

        let (status, session) = send(
            &state,
            "POST",
            "/api/v1/sessions",
            Some(json!({"client_id": client, "role": "backend", "level": "senior", "type": "mcq"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(session["phase"], "ready");
        assert_eq!(session["total"], 3);
        assert_eq!(session["title"], "Backend Developer Assessment");
        assert!(session["current_question"].get("correct_answer").is_none());
        let id = session["id"].as_str().unwrap().to_string();

        let (status, view) = send(
            &state,
            "PUT",
            &format!("/api/v1/sessions/{id}/answer"),
            Some(json!({"option": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["selected"], 1);

        let (_, step) = send(&state, "POST", &format!("/api/v1/sessions/{id}/next"), None).await;
        assert_eq!(step["outcome"], "moved");
        assert_eq!(step["current_index"], 1);

        send(
            &state,
            "PUT",
            &format!("/api/v1/sessions/{id}/answer"),
            Some(json!({"option": 3})),
        )
        .await;

        let (status, submitted) =
            send(&state, "POST", &format!("/api/v1/sessions/{id}/submit"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(submitted["correct"], 1);
        assert_eq!(submitted["total"], 3);
        assert_eq!(submitted["score"], 33);
        assert_eq!(submitted["redirect"], "/result");

        let (status, again) =
            send(&state, "POST", &format!("/api/v1/sessions/{id}/submit"), None).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(again["error"]["code"], "INVALID_STATE");

        let (status, results) =
            send(&state, "GET", &format!("/api/v1/results?client_id={client}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(results["breakdown"]["correct"], 1);
        assert_eq!(results["breakdown"]["questions"][1]["user_answer"], 3);
        assert_eq!(results["breakdown"]["questions"][1]["is_correct"], false);
        assert_eq!(results["feedback"]["status"], "ready");
        assert_eq!(
            results["feedback"]["sections"]["strengths"]["text"],
            "- Reads code carefully"
        );

        let (status, retake) = send(
            &state,
            "POST",
            "/api/v1/results/retake",
            Some(json!({"client_id": client})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(retake["redirect"], "/test");
        assert_eq!(retake["role"], "backend");
        assert_eq!(retake["level"], "senior");

        let (status, _) =
            send(&state, "GET", &format!("/api/v1/results?client_id={client}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_missing_results_offers_return_home() {
        let state = test_state(ScriptedGenerator::new());
        let (status, body) = send(
            &state,
            "GET",
            &format!("/api/v1/results?client_id={}", Uuid::new_v4()),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "MISSING_STATE");
        assert_eq!(
            body["error"]["message"],
            "No test results found. Please complete a test first."
        );
        assert_eq!(body["error"]["action"], "return_home");
    }

    #[tokio::test]
    async fn test_generation_failure_is_generic() {
        let state = test_state(ScriptedGenerator::new().with_response("I cannot help with that."));
        let (status, body) = send(
            &state,
            "POST",
            "/api/v1/sessions",
            Some(json!({"client_id": Uuid::new_v4(), "role": "qa"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "GENERATION_ERROR");
        assert_eq!(
            body["error"]["message"],
            "Failed to generate questions. Please try again later."
        );
        assert_eq!(body["error"]["action"], "retry");
    }

    #[tokio::test]
    async fn test_custom_test_is_consumed_once() {
        let state = test_state(ScriptedGenerator::new().with_response(questions_reply(2)));
        let client = Uuid::new_v4();

        let (status, created) = send(
            &state,
            "POST",
            "/api/v1/custom-tests",
            Some(json!({"client_id": client, "category": "  Kubernetes  ", "level": "fresher"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["category"], "Kubernetes");
        assert_eq!(created["type"], "custom");
        assert_eq!(created["level"], "fresher");

        let start = json!({"client_id": client, "type": "custom"});
        let (status, session) = send(&state, "POST", "/api/v1/sessions", Some(start.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(session["title"], "Custom Test");
        assert_eq!(session["level"], "fresher");
        assert_eq!(session["total"], 2);

        let (status, body) = send(&state, "POST", "/api/v1/sessions", Some(start)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body["error"]["message"],
            "Custom test not found. Please create a new one."
        );
    }

    #[tokio::test]
    async fn test_custom_category_is_validated_before_generation() {
        let state = test_state(ScriptedGenerator::new());
        let too_long = "x".repeat(51);
        for category in ["   ", too_long.as_str()] {
            let (status, body) = send(
                &state,
                "POST",
                "/api/v1/custom-tests",
                Some(json!({"client_id": Uuid::new_v4(), "category": category})),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        }
    }

    #[tokio::test]
    async fn test_overlong_role_is_rejected_before_generation() {
        let state = test_state(ScriptedGenerator::new().with_response(questions_reply(3)));
        let (status, body) = send(
            &state,
            "POST",
            "/api/v1/sessions",
            Some(json!({"client_id": Uuid::new_v4(), "role": "r".repeat(51)})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        // The queued reply is still unused.
        let (status, _) = send(
            &state,
            "POST",
            "/api/v1/sessions",
            Some(json!({"client_id": Uuid::new_v4(), "role": "qa"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_feedback_failure_still_returns_breakdown() {
        let llm = ScriptedGenerator::new()
            .with_response(questions_reply(3))
            .with_error(LlmError::Api {
                status: 503,
                message: "overloaded".to_string(),
            });
        let state = test_state(llm);
        let client = Uuid::new_v4();

        let (_, session) = send(
            &state,
            "POST",
            "/api/v1/sessions",
            Some(json!({"client_id": client})),
        )
        .await;
        let id = session["id"].as_str().unwrap().to_string();
        send(&state, "POST", &format!("/api/v1/sessions/{id}/submit"), None).await;

        let (status, results) =
            send(&state, "GET", &format!("/api/v1/results?client_id={client}"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(results["breakdown"]["score"], 0);
        assert_eq!(results["breakdown"]["role"], "developer");
        assert_eq!(results["feedback"]["status"], "failed");
        assert_eq!(
            results["feedback"]["message"],
            "Failed to generate personalized feedback. Please try again later."
        );
    }

    #[tokio::test]
    async fn test_answer_out_of_range_and_unknown_session() {
        let state = test_state(ScriptedGenerator::new().with_response(questions_reply(3)));
        let (_, session) = send(
            &state,
            "POST",
            "/api/v1/sessions",
            Some(json!({"client_id": Uuid::new_v4(), "type": "mcq"})),
        )
        .await;
        let id = session["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &state,
            "PUT",
            &format!("/api/v1/sessions/{id}/answer"),
            Some(json!({"option": 4})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&state, "DELETE", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&state, "GET", &format!("/api/v1/sessions/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }
}
