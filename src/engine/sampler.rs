//! Stratified question sampling without replacement.
//!
//! Flow:
//! 1) Pick a (same, above, below) ratio from the score band.
//! 2) Turn ratios into counts with independent rounding (no remainder fix-up).
//! 3) Resolve the three pools around the *current* tier, minus issued ids.
//! 4) Draw uniformly from each pool, never backfilling a short pool from another.
//! 5) Record every drawn id as issued.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::{QuestionId, Tier};
use crate::engine::transition::ScoreBand;
use crate::repository::QuestionRepository;
use crate::util::round_count;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ratio {
  pub same: f64,
  pub above: f64,
  pub below: f64,
}

impl Ratio {
  pub fn for_score(score: f64) -> Ratio {
    match ScoreBand::of(score) {
      ScoreBand::Steady => Ratio { same: 0.6, above: 0.2, below: 0.2 },
      ScoreBand::Low => Ratio { same: 0.2, above: 0.1, below: 0.7 },
      ScoreBand::High => Ratio { same: 0.4, above: 0.5, below: 0.1 },
    }
  }

  pub fn counts(&self, batch_size: usize) -> DrawCounts {
    let n = batch_size as f64;
    DrawCounts {
      same: round_count(n * self.same),
      above: round_count(n * self.above),
      below: round_count(n * self.below),
    }
  }
}

/// Desired draws per pool. May not add up to the batch size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawCounts {
  pub same: usize,
  pub above: usize,
  pub below: usize,
}

/// Snapshot of every tier's ids.
#[derive(Clone, Debug, Default)]
pub struct TierPools {
  pools: [Vec<QuestionId>; 3],
}

impl TierPools {
  pub fn new(easy: Vec<QuestionId>, medium: Vec<QuestionId>, hard: Vec<QuestionId>) -> Self {
    Self { pools: [easy, medium, hard] }
  }

  pub fn from_repository<R: QuestionRepository + ?Sized>(repo: &R) -> Self {
    Self::new(
      repo.pool_for_tier(Tier::Easy),
      repo.pool_for_tier(Tier::Medium),
      repo.pool_for_tier(Tier::Hard),
    )
  }

  pub fn get(&self, tier: Tier) -> &[QuestionId] {
    &self.pools[tier.index()]
  }
}

/// Result of one sampling call, split by pool.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draw {
  pub same: Vec<QuestionId>,
  pub above: Vec<QuestionId>,
  pub below: Vec<QuestionId>,
}

impl Draw {
  pub fn is_empty(&self) -> bool {
    self.same.is_empty() && self.above.is_empty() && self.below.is_empty()
  }

  pub fn len(&self) -> usize {
    self.same.len() + self.above.len() + self.below.len()
  }

  /// Same-tier ids first, then above, then below.
  pub fn into_ids(self) -> Vec<QuestionId> {
    let mut out = self.same;
    out.extend(self.above);
    out.extend(self.below);
    out
  }
}

/// Draw up to `batch_size` unseen questions around `current` and mark them issued.
///
/// At the extremes "above" or "below" resolves to the same tier as "same"; ids
/// drawn earlier in the call are then excluded from the later pools, so the
/// result never holds duplicates.
pub fn sample<R: Rng + ?Sized>(
  score: f64,
  current: Tier,
  batch_size: usize,
  pools: &TierPools,
  issued: &mut HashSet<QuestionId>,
  rng: &mut R,
) -> Draw {
  let counts = Ratio::for_score(score).counts(batch_size);

  let same = draw_from(pools.get(current), counts.same, issued, &mut *rng);
  let above = draw_from(pools.get(current.above()), counts.above, issued, &mut *rng);
  let below = draw_from(pools.get(current.below()), counts.below, issued, &mut *rng);

  Draw { same, above, below }
}

/// Draw `min(available, want)` ids from `pool \ issued`, inserting each into `issued`.
fn draw_from<R: Rng + ?Sized>(
  pool: &[QuestionId],
  want: usize,
  issued: &mut HashSet<QuestionId>,
  rng: &mut R,
) -> Vec<QuestionId> {
  let available: Vec<QuestionId> = pool.iter().copied().filter(|id| !issued.contains(id)).collect();
  let picked: Vec<QuestionId> = available
    .choose_multiple(rng, want.min(available.len()))
    .copied()
    .collect();
  issued.extend(picked.iter().copied());
  picked
}
