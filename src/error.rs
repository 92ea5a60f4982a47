//! Engine error types and their HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::domain::QuestionId;
use crate::protocol::ErrorOut;

/// Typed outcomes the engine returns instead of a result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Difficulty label is not one of `easy|medium|hard`
    #[error("Invalid difficulty level: {0:?}")]
    InvalidTier(String),

    /// Batch size must be strictly positive
    #[error("Max questions must be greater than 0 (got {0})")]
    InvalidBatchSize(i64),

    /// A response referenced a question the bank does not know (strict lookup mode)
    #[error("Unknown question id: {0}")]
    UnknownQuestion(QuestionId),

    /// Every consulted tier pool is used up for this scope
    #[error("No available questions in any difficulty tier.")]
    Exhausted,
}

impl EngineError {
    /// Stable machine-readable code used in HTTP and WebSocket error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::InvalidTier(_) | EngineError::InvalidBatchSize(_) => "invalid_input",
            EngineError::UnknownQuestion(_) => "unknown_question",
            EngineError::Exhausted => "exhausted",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            EngineError::InvalidTier(_) | EngineError::InvalidBatchSize(_) => StatusCode::BAD_REQUEST,
            EngineError::UnknownQuestion(_) => StatusCode::NOT_FOUND,
            EngineError::Exhausted => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let body = ErrorOut {
            error: self.code().to_string(),
            detail: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
