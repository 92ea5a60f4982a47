//! Score aggregation over a batch of responses.
//!
//! Each response's correct option and error metric come from the repository.
//! The bank stores one metric per question, so every option in the alphabet
//! maps to that same value; an option outside the alphabet counts as a
//! conceptual error.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{Evaluation, Question, QuestionId, Response};
use crate::engine::evaluator::evaluate;
use crate::error::EngineError;
use crate::repository::QuestionRepository;

pub const OPTION_ALPHABET: [&str; 4] = ["A", "B", "C", "D"];

/// Metric used for a selected option that is not in the alphabet.
const UNLISTED_OPTION_METRIC: f64 = 1.0;

/// What to do when a response names a question the repository doesn't have.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupMissPolicy {
  /// Drop the response; it contributes zero.
  #[default]
  Skip,
  /// Fail the whole batch with `EngineError::UnknownQuestion`.
  Strict,
}

/// Per-option error metrics for one question.
struct ErrorMetricMap {
  metric: Option<f64>,
}

impl ErrorMetricMap {
  fn uniform(q: &Question) -> Self {
    Self { metric: q.error_metric }
  }

  /// `None` means basic scoring.
  fn for_option(&self, option: &str) -> Option<f64> {
    let m = self.metric?;
    if OPTION_ALPHABET.contains(&option) { Some(m) } else { Some(UNLISTED_OPTION_METRIC) }
  }
}

/// One response's outcome; `evaluation` is `None` when the question was not found.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseOutcome {
  pub question_id: QuestionId,
  pub evaluation: Option<Evaluation>,
}

/// Evaluate every response, keeping per-response detail.
pub fn evaluate_batch<R: QuestionRepository + ?Sized>(
  responses: &[Response],
  repo: &R,
  policy: LookupMissPolicy,
) -> Result<Vec<ResponseOutcome>, EngineError> {
  let mut out = Vec::with_capacity(responses.len());
  for r in responses {
    let Some(q) = repo.lookup_question(r.question_id) else {
      match policy {
        LookupMissPolicy::Skip => {
          warn!(target: "engine", question_id = r.question_id, "Response references unknown question; skipped.");
          out.push(ResponseOutcome { question_id: r.question_id, evaluation: None });
          continue;
        }
        LookupMissPolicy::Strict => return Err(EngineError::UnknownQuestion(r.question_id)),
      }
    };
    let metrics = ErrorMetricMap::uniform(&q);
    let e = evaluate(&r.selected_option, &q.correct_option, metrics.for_option(&r.selected_option));
    debug!(target: "engine", question_id = q.id, score = e.score, kind = e.kind.as_str(), "Response evaluated");
    out.push(ResponseOutcome { question_id: r.question_id, evaluation: Some(e) });
  }
  Ok(out)
}

/// Sum of per-response scores; lies in `[0, responses.len()]`.
pub fn aggregate<R: QuestionRepository + ?Sized>(
  responses: &[Response],
  repo: &R,
  policy: LookupMissPolicy,
) -> Result<f64, EngineError> {
  Ok(total_score(&evaluate_batch(responses, repo, policy)?))
}

pub fn total_score(outcomes: &[ResponseOutcome]) -> f64 {
  outcomes.iter().filter_map(|o| o.evaluation).fold(0.0, |acc, e| acc + e.score)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{ErrorKind, Tier};
  use crate::repository::QuestionBank;

  fn bank() -> QuestionBank {
    let mut b = QuestionBank::new();
    for (id, correct, metric) in [(1, "A", Some(0.8)), (2, "B", Some(0.8)), (3, "C", Some(0.8)), (4, "D", Some(0.3)), (5, "A", None)] {
      b.insert(Question { id, difficulty: Tier::Medium, correct_option: correct.into(), error_metric: metric });
    }
    b
  }

  fn resp(question_id: QuestionId, opt: &str) -> Response {
    Response { question_id, selected_option: opt.into() }
  }

  #[test]
  fn all_correct_sums_to_batch_len() {
    let rs = [resp(1, "A"), resp(2, "B"), resp(3, "C")];
    assert_eq!(aggregate(&rs, &bank(), LookupMissPolicy::Skip).unwrap(), 3.0);
  }

  #[test]
  fn conceptual_errors_sum_to_zero() {
    let rs = [resp(1, "B"), resp(2, "C"), resp(3, "D")];
    assert_eq!(aggregate(&rs, &bank(), LookupMissPolicy::Skip).unwrap(), 0.0);
  }

  #[test]
  fn uniform_metric_applies_to_any_wrong_option() {
    for opt in ["A", "B", "C"] {
      let out = evaluate_batch(&[resp(4, opt)], &bank(), LookupMissPolicy::Skip).unwrap();
      assert_eq!(out[0].evaluation, Some(Evaluation::new(0.53, ErrorKind::Careless)));
    }
  }

  #[test]
  fn unlisted_option_is_conceptual_in_detailed_mode() {
    let out = evaluate_batch(&[resp(4, "E")], &bank(), LookupMissPolicy::Skip).unwrap();
    assert_eq!(out[0].evaluation.unwrap().kind, ErrorKind::Conceptual);
  }

  #[test]
  fn missing_metric_uses_basic_mode() {
    let out = evaluate_batch(&[resp(5, "C")], &bank(), LookupMissPolicy::Skip).unwrap();
    assert_eq!(out[0].evaluation, Some(Evaluation::new(0.0, ErrorKind::Incorrect)));
  }

  #[test]
  fn unknown_question_is_dropped_by_default() {
    let rs = [resp(1, "A"), resp(99, "A"), resp(4, "A")];
    let out = evaluate_batch(&rs, &bank(), LookupMissPolicy::Skip).unwrap();
    assert_eq!(out[1].evaluation, None);
    assert_eq!(total_score(&out), 1.53);
  }

  #[test]
  fn strict_policy_fails_on_unknown_question() {
    let rs = [resp(1, "A"), resp(99, "A")];
    assert_eq!(aggregate(&rs, &bank(), LookupMissPolicy::Strict), Err(EngineError::UnknownQuestion(99)));
  }

  #[test]
  fn empty_batch_scores_zero() {
    assert_eq!(aggregate(&[], &bank(), LookupMissPolicy::Skip).unwrap(), 0.0);
  }
}
