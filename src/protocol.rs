//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Field names follow the existing JSON contract (`computed_score`, `next_difficulty`, ...).

use serde::{Deserialize, Serialize};

use crate::domain::{ErrorKind, QuestionId, Response, Tier};
use crate::engine::aggregator::ResponseOutcome;
use crate::engine::NextBatch;

/// Attempt ids arrive as JSON numbers from older clients and as strings (UUIDs) from newer ones.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum AttemptIdIn {
    Number(i64),
    Text(String),
}

impl AttemptIdIn {
    pub fn into_key(self) -> String {
        match self {
            AttemptIdIn::Number(n) => n.to_string(),
            AttemptIdIn::Text(s) => s,
        }
    }
}

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    NextQuestions(NextQuestionsIn),
    Evaluate { responses: Vec<Response> },
    ResetAttempt { attempt_id: AttemptIdIn },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    NextQuestions(NextQuestionsOut),
    Evaluation(EvaluateOut),
    AttemptReset(ResetOut),
    Error { code: String, message: String },
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct NextQuestionsIn {
    pub attempt_id: AttemptIdIn,
    pub current_difficulty: String,
    #[serde(default)]
    pub responses: Vec<Response>,
    pub max_questions: i64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct NextQuestionsOut {
    pub computed_score: f64,
    pub next_difficulty: Tier,
    pub question_ids: Vec<QuestionId>,
}

impl From<NextBatch> for NextQuestionsOut {
    fn from(b: NextBatch) -> Self {
        Self {
            computed_score: b.aggregate_score,
            next_difficulty: b.next_tier,
            question_ids: b.question_ids,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EvaluateIn {
    pub responses: Vec<Response>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct EvaluateOut {
    pub computed_score: f64,
    pub results: Vec<ResponseResultOut>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ResponseResultOut {
    pub question_id: QuestionId,
    pub found: bool,
    pub score: f64,
    /// `null` when the question was not found.
    pub error_type: Option<ErrorKind>,
}

impl From<&ResponseOutcome> for ResponseResultOut {
    fn from(o: &ResponseOutcome) -> Self {
        Self {
            question_id: o.question_id,
            found: o.evaluation.is_some(),
            score: o.evaluation.map_or(0.0, |e| e.score),
            error_type: o.evaluation.map(|e| e.kind),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AttemptOut {
    pub attempt_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IssuedOut {
    pub attempt_id: String,
    pub issued: Vec<QuestionId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResetOut {
    pub attempt_id: String,
    pub cleared: bool,
}

#[derive(Serialize)]
pub struct RootOut {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub questions: usize,
    /// Issued-question scopes currently tracked.
    pub attempts: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorOut {
    pub error: String,
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attempt_id_accepts_numbers_and_strings() {
        let n: AttemptIdIn = serde_json::from_str("17").unwrap();
        let s: AttemptIdIn = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(n.into_key(), "17");
        assert_eq!(s.into_key(), "abc");
    }

    #[test]
    fn ws_next_questions_parses_flat_fields() {
        let msg: ClientWsMessage = serde_json::from_str(
            r#"{"type":"next_questions","attempt_id":3,"current_difficulty":"medium","max_questions":6,
                "responses":[{"question_id":1,"selected_option":"A"}]}"#,
        )
        .unwrap();
        match msg {
            ClientWsMessage::NextQuestions(req) => {
                assert_eq!(req.attempt_id, AttemptIdIn::Number(3));
                assert_eq!(req.responses.len(), 1);
                assert_eq!(req.max_questions, 6);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn server_messages_are_tagged() {
        let out = ServerWsMessage::NextQuestions(NextQuestionsOut {
            computed_score: 3.0,
            next_difficulty: Tier::Medium,
            question_ids: vec![4, 5],
        });
        let v = serde_json::to_value(&out).unwrap();
        assert_eq!(v["type"], "next_questions");
        assert_eq!(v["next_difficulty"], "medium");
        assert_eq!(v["question_ids"], serde_json::json!([4, 5]));
    }
}
