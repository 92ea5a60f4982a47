//! Built-in question bank so the service is usable without a config file.

use crate::domain::{Question, QuestionId, Tier};

/// Eight questions per tier, ids 1..=24. Every fourth question has no error
/// metric and is scored in basic mode.
pub fn seed_questions() -> Vec<Question> {
  const OPTIONS: [&str; 4] = ["A", "B", "C", "D"];
  const METRICS: [Option<f64>; 4] = [Some(0.2), Some(0.6), Some(0.4), None];

  let mut out = Vec::with_capacity(24);
  for (t, tier) in Tier::ALL.iter().enumerate() {
    for n in 0..8usize {
      let id = (t * 8 + n + 1) as QuestionId;
      out.push(Question {
        id,
        difficulty: *tier,
        correct_option: OPTIONS[(n + t) % OPTIONS.len()].to_string(),
        error_metric: METRICS[n % METRICS.len()],
      });
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  #[test]
  fn seeds_cover_every_tier_with_unique_ids() {
    let seeds = seed_questions();
    let ids: HashSet<_> = seeds.iter().map(|q| q.id).collect();
    assert_eq!(ids.len(), seeds.len());
    for tier in Tier::ALL {
      assert_eq!(seeds.iter().filter(|q| q.difficulty == tier).count(), 8);
    }
    assert!(seeds.iter().all(|q| q.error_metric.map_or(true, |m| (0.0..=1.0).contains(&m))));
  }
}
