//! Question repository: the engine's read-only view of the question bank.
//!
//! The engine needs exactly two lookups:
//!   - question metadata by id (tier, correct option, error metric)
//!   - the pool of ids for one tier
//!
//! `QuestionBank` is the in-memory implementation built at startup from the
//! TOML bank plus built-in seeds.

use std::collections::HashMap;

use tracing::{error, info, instrument};

use crate::config::QuestionCfg;
use crate::domain::{Question, QuestionId, Tier};

pub trait QuestionRepository: Send + Sync {
    fn lookup_question(&self, id: QuestionId) -> Option<Question>;

    /// Ids belonging to `tier`, unique, in a stable order.
    fn pool_for_tier(&self, tier: Tier) -> Vec<QuestionId>;
}

#[derive(Clone, Debug, Default)]
pub struct QuestionBank {
    by_id: HashMap<QuestionId, Question>,
    by_tier: HashMap<Tier, Vec<QuestionId>>,
}

impl QuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a question. Returns `false` (and leaves the bank untouched) if the id exists.
    pub fn insert(&mut self, q: Question) -> bool {
        if self.by_id.contains_key(&q.id) {
            return false;
        }
        self.by_tier.entry(q.difficulty).or_default().push(q.id);
        self.by_id.insert(q.id, q);
        true
    }

    /// Build a bank from config entries, then top up with `seeds` that don't clash.
    /// Invalid config entries are logged and skipped.
    #[instrument(level = "info", skip_all, fields(configured = entries.len(), seeds = seeds.len()))]
    pub fn from_entries(entries: &[QuestionCfg], seeds: Vec<Question>) -> Self {
        let mut bank = Self::new();

        for entry in entries {
            let Some(difficulty) = Tier::from_label(&entry.difficulty) else {
                error!(target: "bank", id = entry.id, difficulty = %entry.difficulty, "Skipping bank item: unknown difficulty.");
                continue;
            };
            if let Some(m) = entry.error_metric {
                if !(0.0..=1.0).contains(&m) {
                    error!(target: "bank", id = entry.id, error_metric = m, "Skipping bank item: error metric outside [0, 1].");
                    continue;
                }
            }
            let q = Question {
                id: entry.id,
                difficulty,
                correct_option: entry.correct_option.clone(),
                error_metric: entry.error_metric,
            };
            if !bank.insert(q) {
                error!(target: "bank", id = entry.id, "Skipping bank item: duplicate id.");
            }
        }

        for q in seeds {
            bank.insert(q);
        }

        for tier in Tier::ALL {
            info!(target: "bank", %tier, count = bank.pool_for_tier(tier).len(), "Startup question inventory");
        }
        bank
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }
}

impl QuestionRepository for QuestionBank {
    fn lookup_question(&self, id: QuestionId) -> Option<Question> {
        self.by_id.get(&id).cloned()
    }

    fn pool_for_tier(&self, tier: Tier) -> Vec<QuestionId> {
        self.by_tier.get(&tier).cloned().unwrap_or_default()
    }
}
