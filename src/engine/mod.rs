//! Adaptive decision engine: scoring, tier transition and stratified sampling.
//!
//! `Engine::evaluate_and_sample` is the one entry point the transport layer uses:
//!   1) validate the current tier and batch size
//!   2) aggregate the batch score through the repository
//!   3) compute the next tier (reported only)
//!   4) sample the next batch around the *current* tier under the attempt's lock

pub mod aggregator;
pub mod evaluator;
pub mod issued;
pub mod sampler;
pub mod transition;

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::config::EngineCfg;
use crate::domain::{QuestionId, Response, Tier};
use crate::error::EngineError;
use crate::repository::QuestionRepository;

use aggregator::{aggregate, evaluate_batch, LookupMissPolicy, ResponseOutcome};
use issued::IssuedRegistry;
use sampler::{sample, TierPools};
use transition::next_tier;

/// What the transport layer gets back for one batch.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NextBatch {
    pub aggregate_score: f64,
    pub next_tier: Tier,
    pub question_ids: Vec<QuestionId>,
}

pub struct Engine {
    lookup_miss: LookupMissPolicy,
    issued: IssuedRegistry,
    rng: Mutex<StdRng>,
}

impl Engine {
    pub fn new(cfg: &EngineCfg) -> Self {
        let rng = match cfg.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            lookup_miss: cfg.lookup_miss,
            issued: IssuedRegistry::with_limits(cfg.issued_scope, cfg.registry_limits()),
            rng: Mutex::new(rng),
        }
    }

    pub fn issued(&self) -> &IssuedRegistry {
        &self.issued
    }

    pub fn lookup_miss(&self) -> LookupMissPolicy {
        self.lookup_miss
    }

    /// Per-response detail without touching the issued sets.
    pub fn evaluate<R: QuestionRepository + ?Sized>(
        &self,
        repo: &R,
        responses: &[Response],
    ) -> Result<Vec<ResponseOutcome>, EngineError> {
        evaluate_batch(responses, repo, self.lookup_miss)
    }

    #[instrument(level = "info", skip(self, repo, responses), fields(responses = responses.len()))]
    pub async fn evaluate_and_sample<R: QuestionRepository + ?Sized>(
        &self,
        repo: &R,
        attempt_id: &str,
        responses: &[Response],
        current_tier: &str,
        batch_size: i64,
    ) -> Result<NextBatch, EngineError> {
        let current = Tier::from_label(current_tier)
            .ok_or_else(|| EngineError::InvalidTier(current_tier.to_string()))?;
        if batch_size <= 0 {
            return Err(EngineError::InvalidBatchSize(batch_size));
        }
        let batch = usize::try_from(batch_size).map_err(|_| EngineError::InvalidBatchSize(batch_size))?;

        let score = aggregate(responses, repo, self.lookup_miss)?;
        let next = next_tier(score, current);
        debug!(target: "engine", score, %current, %next, "Tier transition");

        let pools = TierPools::from_repository(repo);
        let handle = self.issued.handle(attempt_id).await;
        let draw = {
            let mut issued = handle.lock().await;
            let mut rng = self.rng.lock().unwrap_or_else(|p| p.into_inner());
            sample(score, current, batch, &pools, &mut issued, &mut *rng)
        };

        if draw.is_empty() {
            self.issued.discard_if_empty(attempt_id, handle).await;
            warn!(target: "engine", %attempt_id, %current, "No available questions in any consulted tier");
            return Err(EngineError::Exhausted);
        }
        info!(
            target: "engine",
            %attempt_id, score, %current, %next,
            total = draw.len(), same = draw.same.len(), above = draw.above.len(), below = draw.below.len(),
            "Next batch sampled"
        );

        Ok(NextBatch {
            aggregate_score: score,
            next_tier: next,
            question_ids: draw.into_ids(),
        })
    }
}
