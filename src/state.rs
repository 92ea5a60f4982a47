//! Application state: the question bank and the adaptive engine.
//!
//! The bank is immutable after startup; all mutable state (issued-question
//! sets, sampling RNG) lives inside the engine.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::config::{load_config_from_env, ServiceConfig};
use crate::engine::Engine;
use crate::repository::QuestionBank;
use crate::seeds::seed_questions;

#[derive(Clone)]
pub struct AppState {
    pub bank: Arc<QuestionBank>,
    pub engine: Arc<Engine>,
}

impl AppState {
    /// Build state from env: load config, build the bank, init the engine.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_config_from_env().unwrap_or_default();
        Self::from_config(&cfg)
    }

    pub fn from_config(cfg: &ServiceConfig) -> Self {
        let seeds = if cfg.bank.include_seeds { seed_questions() } else { Vec::new() };
        let bank = QuestionBank::from_entries(&cfg.questions, seeds);
        let engine = Engine::new(&cfg.engine);

        info!(
            target: "adaptive_quiz",
            questions = bank.len(),
            lookup_miss = ?engine.lookup_miss(),
            issued_scope = ?engine.issued().scope(),
            seeded = cfg.engine.seed.is_some(),
            "Engine ready"
        );

        Self {
            bank: Arc::new(bank),
            engine: Arc::new(engine),
        }
    }
}
