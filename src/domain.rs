//! Domain models used by the engine: difficulty tiers, questions, responses and evaluation results.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Question identifiers are the bank's integer primary keys.
pub type QuestionId = u64;

/// Ordered difficulty levels, `easy < medium < hard`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
  Easy,
  Medium,
  Hard,
}

impl Tier {
  pub const ALL: [Tier; 3] = [Tier::Easy, Tier::Medium, Tier::Hard];

  pub fn as_str(&self) -> &'static str {
    match self {
      Tier::Easy => "easy",
      Tier::Medium => "medium",
      Tier::Hard => "hard",
    }
  }

  /// Parse a wire label. Exact, lowercase match only.
  pub fn from_label(label: &str) -> Option<Tier> {
    match label {
      "easy" => Some(Tier::Easy),
      "medium" => Some(Tier::Medium),
      "hard" => Some(Tier::Hard),
      _ => None,
    }
  }

  pub fn index(&self) -> usize {
    match self {
      Tier::Easy => 0,
      Tier::Medium => 1,
      Tier::Hard => 2,
    }
  }

  /// Clamping index lookup: anything past the top is `hard`.
  pub fn from_index(index: usize) -> Tier {
    match index {
      0 => Tier::Easy,
      1 => Tier::Medium,
      _ => Tier::Hard,
    }
  }

  /// One tier up, clamped at `hard`.
  pub fn above(&self) -> Tier {
    Tier::from_index(self.index() + 1)
  }

  /// One tier down, clamped at `easy`.
  pub fn below(&self) -> Tier {
    Tier::from_index(self.index().saturating_sub(1))
  }
}

impl fmt::Display for Tier {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A bank question as the engine sees it. Immutable once loaded.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Question {
  pub id: QuestionId,
  pub difficulty: Tier,
  pub correct_option: String,
  /// One scalar in `[0, 1]` that applies to every wrong option.
  /// `None` means the question is scored in basic mode.
  #[serde(default)]
  pub error_metric: Option<f64>,
}

/// One student answer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Response {
  pub question_id: QuestionId,
  pub selected_option: String,
}

/// How an answer went wrong, if it did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  None,
  Careless,
  Conceptual,
  /// Basic-mode wrong answer (no error metric available).
  Incorrect,
}

impl ErrorKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      ErrorKind::None => "none",
      ErrorKind::Careless => "careless",
      ErrorKind::Conceptual => "conceptual",
      ErrorKind::Incorrect => "incorrect",
    }
  }
}

/// Score in `[0, 1]` plus the error classification.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Evaluation {
  pub score: f64,
  pub kind: ErrorKind,
}

impl Evaluation {
  pub fn new(score: f64, kind: ErrorKind) -> Self {
    Self { score, kind }
  }
}
