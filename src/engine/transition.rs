//! Difficulty transitions between `easy`, `medium` and `hard`.

use crate::domain::Tier;

/// Scores below this move one tier down.
pub const LOWER_BOUND: f64 = 2.0;
/// Scores above this move one tier up.
pub const UPPER_BOUND: f64 = 4.0;

/// Where an aggregate score falls. Both bounds belong to `Steady`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreBand {
  Low,
  Steady,
  High,
}

impl ScoreBand {
  pub fn of(score: f64) -> ScoreBand {
    if score > UPPER_BOUND {
      ScoreBand::High
    } else if score < LOWER_BOUND {
      ScoreBand::Low
    } else {
      ScoreBand::Steady
    }
  }
}

/// Next tier for a typed current tier.
pub fn next_tier(score: f64, current: Tier) -> Tier {
  match ScoreBand::of(score) {
    ScoreBand::High => current.above(),
    ScoreBand::Low => current.below(),
    ScoreBand::Steady => current,
  }
}

/// Total form of `next_tier` over raw labels: an unrecognized label counts
/// as `easy` instead of being rejected. For callers holding labels that were
/// never validated; the engine itself validates first and uses `next_tier`.
#[allow(dead_code)]
pub fn next_tier_from_label(score: f64, current: &str) -> Tier {
  next_tier(score, Tier::from_label(current).unwrap_or(Tier::Easy))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn high_scores_move_up() {
    assert_eq!(next_tier(5.0, Tier::Easy), Tier::Medium);
    assert_eq!(next_tier(4.01, Tier::Medium), Tier::Hard);
    assert_eq!(next_tier(6.0, Tier::Hard), Tier::Hard);
  }

  #[test]
  fn low_scores_move_down() {
    assert_eq!(next_tier(1.0, Tier::Medium), Tier::Easy);
    assert_eq!(next_tier(0.0, Tier::Hard), Tier::Medium);
    assert_eq!(next_tier(1.99, Tier::Easy), Tier::Easy);
  }

  #[test]
  fn bounds_are_inclusive_in_the_stay_band() {
    for t in Tier::ALL {
      assert_eq!(next_tier(2.0, t), t);
      assert_eq!(next_tier(3.0, t), t);
      assert_eq!(next_tier(4.0, t), t);
    }
  }

  #[test]
  fn never_leaves_the_tier_range() {
    for i in 0..=60 {
      let score = i as f64 / 10.0;
      assert!(next_tier(score, Tier::Hard) <= Tier::Hard);
      assert!(next_tier(score, Tier::Easy) >= Tier::Easy);
    }
  }

  #[test]
  fn monotonic_in_score() {
    for t in Tier::ALL {
      let mut prev = next_tier(0.0, t);
      for i in 1..=60 {
        let cur = next_tier(i as f64 / 10.0, t);
        assert!(cur >= prev);
        prev = cur;
      }
    }
  }

  #[test]
  fn unknown_label_defaults_to_easy() {
    assert_eq!(next_tier_from_label(3.0, "expert"), Tier::Easy);
    assert_eq!(next_tier_from_label(5.0, ""), Tier::Medium);
    assert_eq!(next_tier_from_label(1.0, "hard"), Tier::Medium);
  }
}
