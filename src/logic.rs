//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Evaluating a batch and sampling the next questions
//!   - Per-response evaluation detail
//!   - Attempt lifecycle (new id, issued snapshot, reset)

use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::Response;
use crate::engine::aggregator::total_score;
use crate::error::EngineError;
use crate::protocol::{
  AttemptOut, EvaluateOut, IssuedOut, NextQuestionsIn, NextQuestionsOut, ResetOut, ResponseResultOut,
};
use crate::state::AppState;

#[instrument(level = "info", skip(state, req), fields(difficulty = %req.current_difficulty, max = req.max_questions))]
pub async fn next_questions(state: &AppState, req: NextQuestionsIn) -> Result<NextQuestionsOut, EngineError> {
  let attempt_id = req.attempt_id.into_key();
  let batch = state
    .engine
    .evaluate_and_sample(
      state.bank.as_ref(),
      &attempt_id,
      &req.responses,
      &req.current_difficulty,
      req.max_questions,
    )
    .await?;
  Ok(batch.into())
}

#[instrument(level = "info", skip(state, responses), fields(responses = responses.len()))]
pub fn evaluate_responses(state: &AppState, responses: &[Response]) -> Result<EvaluateOut, EngineError> {
  let outcomes = state.engine.evaluate(state.bank.as_ref(), responses)?;
  Ok(EvaluateOut {
    computed_score: total_score(&outcomes),
    results: outcomes.iter().map(ResponseResultOut::from).collect(),
  })
}

pub fn new_attempt() -> AttemptOut {
  let attempt_id = Uuid::new_v4().to_string();
  info!(target: "adaptive_quiz", %attempt_id, "New attempt");
  AttemptOut { attempt_id }
}

pub async fn issued_for(state: &AppState, attempt_id: String) -> IssuedOut {
  let issued = state.engine.issued().snapshot(&attempt_id).await;
  IssuedOut { attempt_id, issued }
}

#[instrument(level = "info", skip(state))]
pub async fn reset_attempt(state: &AppState, attempt_id: String) -> ResetOut {
  let cleared = state.engine.issued().reset(&attempt_id).await;
  info!(target: "adaptive_quiz", %attempt_id, cleared, "Attempt history reset");
  ResetOut { attempt_id, cleared }
}
