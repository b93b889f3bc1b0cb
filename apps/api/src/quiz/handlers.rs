//! Axum route handlers for the quiz API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::handoff::HandoffError;
use crate::models::question::{Level, Question, QuestionType, TestKind};
use crate::models::result::CustomTest;
use crate::quiz::catalog::{catalog, Catalog};
use crate::quiz::generator::{generate_feedback, generate_questions};
use crate::quiz::result_view::{
    build_breakdown, retake_route, FeedbackView, ResultBreakdown, RetakeRoute,
};
use crate::quiz::session::{SessionView, Step, SubmissionOutcome};
use crate::state::AppState;

pub const MAX_TOPIC_LEN: usize = 50;
const DEFAULT_ROLE: &str = "developer";
const CUSTOM_TEST_MISSING: &str = "Custom test not found. Please create a new one.";
const RESULTS_MISSING: &str = "No test results found. Please complete a test first.";
const RESULTS_CORRUPT: &str = "Failed to parse test results";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CustomTestRequest {
    pub client_id: Uuid,
    pub category: String,
    #[serde(default)]
    pub level: Level,
}

#[derive(Debug, Serialize)]
pub struct CustomTestResponse {
    pub category: String,
    pub question_count: usize,
    pub redirect: &'static str,
    #[serde(rename = "type")]
    pub test_type: TestKind,
    pub level: Level,
}

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub client_id: Uuid,
    pub role: Option<String>,
    #[serde(default)]
    pub level: Level,
    #[serde(rename = "type", default)]
    pub test_type: TestKind,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub option: usize,
}

#[derive(Debug, Deserialize)]
pub struct ClientQuery {
    pub client_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct RetakeRequest {
    pub client_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub breakdown: ResultBreakdown,
    pub feedback: FeedbackView,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/catalog
pub async fn handle_catalog() -> Json<Catalog> {
    Json(catalog())
}

/// POST /api/v1/custom-tests
///
/// Generates a multiple-choice question set for a free-text topic and parks it in the
/// `customTest` handoff entry, where the next custom session picks it up.
pub async fn handle_create_custom_test(
    State(state): State<AppState>,
    Json(request): Json<CustomTestRequest>,
) -> Result<(StatusCode, Json<CustomTestResponse>), AppError> {
    let category = request.category.trim();
    if category.is_empty() {
        return Err(AppError::Validation(
            "Please enter a category name".to_string(),
        ));
    }
    if category.chars().count() > MAX_TOPIC_LEN {
        return Err(AppError::Validation(format!(
            "Category name must be less than {MAX_TOPIC_LEN} characters"
        )));
    }

    let questions = generate_questions(
        state.llm.as_ref(),
        category,
        request.level,
        QuestionType::MultipleChoice,
        state.config.custom_question_count,
    )
    .await?;

    let question_count = questions.len();
    let test = CustomTest {
        questions,
        category: category.to_string(),
        level: request.level,
        test_type: TestKind::Custom,
    };

    // A stale, never-consumed set is replaced.
    state.handoff.clear_custom_test(request.client_id).await?;
    state
        .handoff
        .write_custom_test(request.client_id, &test)
        .await?;
    info!(
        "Custom test on '{}' stored for client {}",
        test.category, request.client_id
    );

    Ok((
        StatusCode::CREATED,
        Json(CustomTestResponse {
            category: test.category,
            question_count,
            redirect: "/test",
            test_type: TestKind::Custom,
            level: test.level,
        }),
    ))
}

/// POST /api/v1/sessions
///
/// Starts a quiz. Custom sessions consume the pending `customTest` entry; role sessions
/// generate their questions now. Any previous result for this client is discarded.
pub async fn handle_start_session(
    State(state): State<AppState>,
    Json(request): Json<StartSessionRequest>,
) -> Result<(StatusCode, Json<SessionView>), AppError> {
    let client_id = request.client_id;
    let role = request
        .role
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_ROLE)
        .to_string();
    if role.chars().count() > MAX_TOPIC_LEN {
        return Err(AppError::Validation(format!(
            "Role must be less than {MAX_TOPIC_LEN} characters"
        )));
    }

    state.handoff.clear_test_results(client_id).await?;

    let view = match request.test_type.question_type() {
        None => start_custom_session(&state, client_id).await?,
        Some(question_type) => {
            let id = state
                .sessions
                .create(client_id, role.clone(), request.level, request.test_type)
                .await;

            let generated = generate_questions(
                state.llm.as_ref(),
                &role,
                request.level,
                question_type,
                state.config.role_question_count,
            )
            .await;

            match generated {
                Ok(questions) => ready_or_fail(&state, id, questions).await?,
                Err(e) => {
                    state.sessions.mark_failed(id, &e.user_message()).await?;
                    return Err(e);
                }
            }
        }
    };

    Ok((StatusCode::CREATED, Json(view)))
}

async fn start_custom_session(state: &AppState, client_id: Uuid) -> Result<SessionView, AppError> {
    let pending = match state.handoff.take_custom_test(client_id).await {
        Ok(pending) => pending,
        Err(HandoffError::Corrupt { source, .. }) => {
            warn!("Pending custom test for client {client_id} is unreadable: {source}");
            None
        }
        Err(e) => return Err(e.into()),
    };

    let Some(test) = pending else {
        let id = state
            .sessions
            .create(client_id, "custom".to_string(), Level::default(), TestKind::Custom)
            .await;
        state.sessions.mark_failed(id, CUSTOM_TEST_MISSING).await?;
        return Err(AppError::MissingState(CUSTOM_TEST_MISSING.to_string()));
    };

    let id = state
        .sessions
        .create(client_id, test.category, test.level, TestKind::Custom)
        .await;
    ready_or_fail(state, id, test.questions).await
}

async fn ready_or_fail(
    state: &AppState,
    id: Uuid,
    questions: Vec<Question>,
) -> Result<SessionView, AppError> {
    match state.sessions.mark_ready(id, questions).await {
        Ok(view) => Ok(view),
        Err(e) => {
            state.sessions.mark_failed(id, &e.user_message()).await?;
            Err(e)
        }
    }
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.sessions.view(id).await?))
}

/// PUT /api/v1/sessions/:id/answer
pub async fn handle_select_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.sessions.select_answer(id, request.option).await?))
}

/// POST /api/v1/sessions/:id/next
///
/// On the last question this submits the test instead of advancing.
pub async fn handle_next(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Step>, AppError> {
    Ok(Json(state.sessions.next(id).await?))
}

/// POST /api/v1/sessions/:id/previous
pub async fn handle_previous(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.sessions.previous(id).await?))
}

/// POST /api/v1/sessions/:id/submit
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SubmissionOutcome>, AppError> {
    Ok(Json(state.sessions.submit(id).await?))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_close_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/results
///
/// Serves the score breakdown and asks for personalized feedback. A feedback failure is
/// reported inline; the breakdown does not depend on it.
pub async fn handle_get_results(
    State(state): State<AppState>,
    Query(params): Query<ClientQuery>,
) -> Result<Json<ResultResponse>, AppError> {
    let result = match state.handoff.read_test_results(params.client_id).await {
        Ok(Some(result)) => result,
        Ok(None) => return Err(AppError::MissingState(RESULTS_MISSING.to_string())),
        Err(HandoffError::Corrupt { source, .. }) => {
            warn!(
                "Stored results for client {} are unreadable: {source}",
                params.client_id
            );
            return Err(AppError::MissingState(RESULTS_CORRUPT.to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    let breakdown = build_breakdown(&result);
    let feedback = FeedbackView::from_outcome(generate_feedback(state.llm.as_ref(), &result).await);

    Ok(Json(ResultResponse {
        breakdown,
        feedback,
    }))
}

/// POST /api/v1/results/retake
pub async fn handle_retake(
    State(state): State<AppState>,
    Json(request): Json<RetakeRequest>,
) -> Result<Json<RetakeRoute>, AppError> {
    let result = match state.handoff.read_test_results(request.client_id).await {
        Ok(Some(result)) => result,
        Ok(None) => return Err(AppError::MissingState(RESULTS_MISSING.to_string())),
        Err(HandoffError::Corrupt { .. }) => {
            return Err(AppError::MissingState(RESULTS_CORRUPT.to_string()))
        }
        Err(e) => return Err(e.into()),
    };

    state.handoff.clear_test_results(request.client_id).await?;
    Ok(Json(retake_route(&result)))
}
