//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs basic result info.

use std::sync::Arc;
use axum::{extract::{Path, State}, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::error::EngineError;
use crate::logic::*;
use crate::protocol::*;
use crate::state::AppState;

const ROOT_MESSAGE: &str = "Adaptive Quiz Difficulty Adjustor Service is running.";

#[instrument(level = "info")]
pub async fn http_root() -> impl IntoResponse { Json(RootOut { message: ROOT_MESSAGE }) }

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let attempts = state.engine.issued().scope_count().await;
  Json(HealthOut { ok: true, questions: state.bank.len(), attempts })
}

#[instrument(level = "info", skip(state, body), fields(difficulty = %body.current_difficulty, responses = body.responses.len()))]
pub async fn http_post_next_questions(
  State(state): State<Arc<AppState>>,
  Json(body): Json<NextQuestionsIn>,
) -> Result<Json<NextQuestionsOut>, EngineError> {
  let out = next_questions(&state, body).await?;
  info!(target: "engine", score = out.computed_score, next = %out.next_difficulty, count = out.question_ids.len(), "HTTP next_questions served");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(responses = body.responses.len()))]
pub async fn http_post_evaluate(
  State(state): State<Arc<AppState>>,
  Json(body): Json<EvaluateIn>,
) -> Result<Json<EvaluateOut>, EngineError> {
  evaluate_responses(&state, &body.responses).map(Json)
}

#[instrument(level = "info")]
pub async fn http_post_attempt() -> impl IntoResponse { Json(new_attempt()) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_attempt(
  State(state): State<Arc<AppState>>,
  Path(attempt_id): Path<String>,
) -> impl IntoResponse {
  Json(issued_for(&state, attempt_id).await)
}

/// Clears one attempt's issued set. In global scope the set is shared, so the
/// reset is refused and `cleared` is always `false`.
#[instrument(level = "info", skip(state))]
pub async fn http_delete_attempt(
  State(state): State<Arc<AppState>>,
  Path(attempt_id): Path<String>,
) -> impl IntoResponse {
  Json(reset_attempt(&state, attempt_id).await)
}
