//! Loading service configuration (engine settings + optional question bank) from TOML.
//!
//! See `ServiceConfig`, `EngineCfg` and `QuestionCfg` for the expected schema.

use std::time::Duration;

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::QuestionId;
use crate::engine::aggregator::LookupMissPolicy;
use crate::engine::issued::{IssuedScope, RegistryLimits};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct ServiceConfig {
  #[serde(default)]
  pub engine: EngineCfg,
  #[serde(default)]
  pub bank: BankCfg,
  #[serde(default)]
  pub questions: Vec<QuestionCfg>,
}

/// Engine knobs. Every field has a default so `[engine]` may be omitted.
#[derive(Clone, Debug, Deserialize)]
pub struct EngineCfg {
  #[serde(default)] pub lookup_miss: LookupMissPolicy,
  #[serde(default)] pub issued_scope: IssuedScope,
  /// Fixed seed for the sampling RNG; entropy-seeded when absent.
  #[serde(default)] pub seed: Option<u64>,
  /// Cap on live attempt scopes (0 = unbounded).
  #[serde(default = "default_max_scopes")] pub max_scopes: usize,
  /// Attempt scopes idle this long are dropped (0 = never).
  #[serde(default = "default_scope_idle_secs")] pub scope_idle_secs: u64,
}

impl Default for EngineCfg {
  fn default() -> Self {
    Self {
      lookup_miss: LookupMissPolicy::default(),
      issued_scope: IssuedScope::default(),
      seed: None,
      max_scopes: default_max_scopes(),
      scope_idle_secs: default_scope_idle_secs(),
    }
  }
}

impl EngineCfg {
  pub fn registry_limits(&self) -> RegistryLimits {
    RegistryLimits {
      max_scopes: (self.max_scopes > 0).then_some(self.max_scopes),
      idle_ttl: (self.scope_idle_secs > 0).then(|| Duration::from_secs(self.scope_idle_secs)),
    }
  }
}

fn default_max_scopes() -> usize { 100_000 }
fn default_scope_idle_secs() -> u64 { 24 * 60 * 60 }

#[derive(Clone, Debug, Deserialize)]
pub struct BankCfg {
  #[serde(default = "default_true")]
  pub include_seeds: bool,
}

impl Default for BankCfg {
  fn default() -> Self {
    Self { include_seeds: true }
  }
}

fn default_true() -> bool { true }

/// Question entry accepted in TOML configuration.
/// `difficulty` stays a string here so bad labels can be reported and skipped.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionCfg {
  pub id: QuestionId,
  pub difficulty: String,
  pub correct_option: String,
  #[serde(default)] pub error_metric: Option<f64>,
}

pub fn parse_config(s: &str) -> Result<ServiceConfig, toml::de::Error> {
  toml::from_str::<ServiceConfig>(s)
}

/// Attempt to load `ServiceConfig` from QUIZ_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_config_from_env() -> Option<ServiceConfig> {
  let path = std::env::var("QUIZ_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "adaptive_quiz", %path, questions = cfg.questions.len(), "Loaded service config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "adaptive_quiz", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "adaptive_quiz", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
