//! Response evaluation: scores one answer and classifies the mistake.
//!
//! Two modes:
//!   - basic (no error metric): 1.0 for correct, 0.0 otherwise
//!   - detailed (error metric present): partial credit for careless slips
//!     (`metric < 0.5`), nothing for conceptual errors

use crate::domain::{ErrorKind, Evaluation};
use crate::util::round_half_away;

/// Metrics below this mark a wrong answer as a careless slip.
pub const CARELESS_THRESHOLD: f64 = 0.5;

/// Credit multiplier applied to `1 - metric` for careless slips.
pub const PARTIAL_CREDIT: f64 = 0.75;

/// Score `selected` against `correct`. The option alphabet is not validated here.
/// Metrics are clamped into [0, 1], so a score never leaves [0, 1].
pub fn evaluate(selected: &str, correct: &str, error_metric: Option<f64>) -> Evaluation {
  if selected == correct {
    return Evaluation::new(1.0, ErrorKind::None);
  }
  match error_metric.map(|m| m.clamp(0.0, 1.0)) {
    None => Evaluation::new(0.0, ErrorKind::Incorrect),
    Some(m) if m < CARELESS_THRESHOLD => {
      Evaluation::new(round_half_away((1.0 - m) * PARTIAL_CREDIT, 2), ErrorKind::Careless)
    }
    Some(_) => Evaluation::new(0.0, ErrorKind::Conceptual),
  }
}
