//! Registry of issued-question sets, one per scope key.
//!
//! Each scope owns its own `Mutex`, so draws for one attempt serialize while
//! different attempts never contend on each other's lock.
//!
//! In attempt scope the registry is bounded: a scope untouched for longer
//! than `idle_ttl` is dropped, and once `max_scopes` is reached the least
//! recently used idle scope makes room for a new one. A scope whose handle is
//! still held by a caller is never evicted.

use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex as StdMutex},
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, instrument, warn};

use crate::domain::QuestionId;

/// Key shared by every attempt in `IssuedScope::Global`.
const GLOBAL_KEY: &str = "*";

pub type IssuedSet = HashSet<QuestionId>;

/// How far the no-repeat guarantee reaches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuedScope {
    /// One set per attempt id.
    #[default]
    Attempt,
    /// One set for the whole process, shared by all attempts.
    Global,
}

/// Bounds on the attempt-scope registry. `None` disables a bound.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegistryLimits {
    pub max_scopes: Option<usize>,
    pub idle_ttl: Option<Duration>,
}

/// One scope's issued set plus the time it was last locked.
#[derive(Debug)]
pub struct ScopeEntry {
    set: Mutex<IssuedSet>,
    last_used: StdMutex<Instant>,
}

impl ScopeEntry {
    fn new() -> Self {
        Self {
            set: Mutex::new(IssuedSet::new()),
            last_used: StdMutex::new(Instant::now()),
        }
    }

    /// Lock the set and mark the scope as used.
    pub async fn lock(&self) -> MutexGuard<'_, IssuedSet> {
        let guard = self.set.lock().await;
        self.touch();
        guard
    }

    fn touch(&self) {
        *self.last_used.lock().unwrap_or_else(|p| p.into_inner()) = Instant::now();
    }

    fn last_used(&self) -> Instant {
        *self.last_used.lock().unwrap_or_else(|p| p.into_inner())
    }
}

/// Only the map holds it, so nobody is mid-draw on this scope.
fn is_idle(entry: &Arc<ScopeEntry>) -> bool {
    Arc::strong_count(entry) == 1
}

#[derive(Debug, Default)]
pub struct IssuedRegistry {
    scope: IssuedScope,
    limits: RegistryLimits,
    sets: RwLock<HashMap<String, Arc<ScopeEntry>>>,
}

impl IssuedRegistry {
    pub fn new(scope: IssuedScope) -> Self {
        Self::with_limits(scope, RegistryLimits::default())
    }

    pub fn with_limits(scope: IssuedScope, limits: RegistryLimits) -> Self {
        Self {
            scope,
            limits,
            sets: RwLock::new(HashMap::new()),
        }
    }

    pub fn scope(&self) -> IssuedScope {
        self.scope
    }

    fn key<'a>(&self, attempt_id: &'a str) -> &'a str {
        match self.scope {
            IssuedScope::Attempt => attempt_id,
            IssuedScope::Global => GLOBAL_KEY,
        }
    }

    /// The lock guarding `attempt_id`'s set, created empty on first use.
    ///
    /// Callers that end up drawing nothing from a fresh scope should hand it
    /// back through `discard_if_empty`.
    #[instrument(level = "debug", skip(self))]
    pub async fn handle(&self, attempt_id: &str) -> Arc<ScopeEntry> {
        let key = self.key(attempt_id);
        if let Some(h) = { self.sets.read().await.get(key).cloned() } {
            return h;
        }
        let mut sets = self.sets.write().await;
        if let Some(h) = sets.get(key) {
            return h.clone();
        }
        self.evict(&mut sets);
        debug!(target: "engine", %key, "New issued-question scope");
        let h = Arc::new(ScopeEntry::new());
        sets.insert(key.to_string(), h.clone());
        h
    }

    /// Drop `attempt_id`'s scope if it is still empty and `handle` is its
    /// only outside holder. Returns whether the scope was removed.
    pub async fn discard_if_empty(&self, attempt_id: &str, handle: Arc<ScopeEntry>) -> bool {
        let key = self.key(attempt_id);
        let mut sets = self.sets.write().await;
        let Some(stored) = sets.get(key) else {
            return false;
        };
        // map + `handle`; any other clone means a concurrent draw is pending
        if !Arc::ptr_eq(stored, &handle) || Arc::strong_count(&handle) > 2 {
            return false;
        }
        let empty = match handle.set.try_lock() {
            Ok(set) => set.is_empty(),
            Err(_) => false,
        };
        if empty {
            sets.remove(key);
            debug!(target: "engine", %key, "Discarded empty issued-question scope");
        }
        empty
    }

    /// Make room before a new scope is inserted. Attempt scope only.
    fn evict(&self, sets: &mut HashMap<String, Arc<ScopeEntry>>) {
        if self.scope == IssuedScope::Global {
            return;
        }
        if let Some(ttl) = self.limits.idle_ttl {
            let before = sets.len();
            sets.retain(|_, e| !is_idle(e) || e.last_used().elapsed() < ttl);
            if sets.len() < before {
                debug!(target: "engine", evicted = before - sets.len(), "Evicted idle issued-question scopes");
            }
        }
        if let Some(max) = self.limits.max_scopes {
            while sets.len() >= max.max(1) {
                let victim = sets
                    .iter()
                    .filter(|(_, e)| is_idle(e))
                    .min_by_key(|(_, e)| e.last_used())
                    .map(|(k, _)| k.clone());
                match victim {
                    Some(k) => {
                        sets.remove(&k);
                        debug!(target: "engine", key = %k, "Evicted least recently used issued-question scope");
                    }
                    None => break,
                }
            }
        }
    }

    /// Issued ids for `attempt_id`, sorted. Empty if the scope was never used.
    pub async fn snapshot(&self, attempt_id: &str) -> Vec<QuestionId> {
        let h = { self.sets.read().await.get(self.key(attempt_id)).cloned() };
        let mut ids: Vec<QuestionId> = match h {
            Some(h) => h.set.lock().await.iter().copied().collect(),
            None => Vec::new(),
        };
        ids.sort_unstable();
        ids
    }

    /// Forget `attempt_id`'s history. Returns whether anything was cleared.
    ///
    /// Refused in global scope: the shared set belongs to every attempt, so
    /// one caller may not wipe it.
    pub async fn reset(&self, attempt_id: &str) -> bool {
        if self.scope == IssuedScope::Global {
            warn!(target: "engine", %attempt_id, "Reset refused: issued set is shared by all attempts");
            return false;
        }
        self.sets.write().await.remove(attempt_id).is_some()
    }

    pub async fn scope_count(&self) -> usize {
        self.sets.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn attempts_are_isolated() {
        let reg = IssuedRegistry::new(IssuedScope::Attempt);
        reg.handle("a").await.lock().await.insert(1);
        reg.handle("b").await.lock().await.insert(2);
        assert_eq!(reg.snapshot("a").await, vec![1]);
        assert_eq!(reg.snapshot("b").await, vec![2]);
        assert_eq!(reg.scope_count().await, 2);
    }

    #[tokio::test]
    async fn global_scope_shares_one_set() {
        let reg = IssuedRegistry::new(IssuedScope::Global);
        reg.handle("a").await.lock().await.insert(1);
        reg.handle("b").await.lock().await.insert(2);
        assert_eq!(reg.snapshot("anyone").await, vec![1, 2]);
        assert_eq!(reg.scope_count().await, 1);
    }

    #[tokio::test]
    async fn same_key_returns_same_lock() {
        let reg = IssuedRegistry::new(IssuedScope::Attempt);
        let a = reg.handle("x").await;
        let b = reg.handle("x").await;
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[tokio::test]
    async fn reset_clears_history() {
        let reg = IssuedRegistry::new(IssuedScope::Attempt);
        reg.handle("a").await.lock().await.insert(5);
        assert!(reg.reset("a").await);
        assert!(!reg.reset("a").await);
        assert!(reg.snapshot("a").await.is_empty());
    }

    #[tokio::test]
    async fn global_reset_is_refused() {
        let reg = IssuedRegistry::new(IssuedScope::Global);
        reg.handle("a").await.lock().await.insert(5);
        assert!(!reg.reset("b").await);
        assert_eq!(reg.snapshot("a").await, vec![5]);
    }

    #[tokio::test]
    async fn empty_scope_is_discarded() {
        let reg = IssuedRegistry::new(IssuedScope::Attempt);
        let h = reg.handle("a").await;
        assert!(reg.discard_if_empty("a", h).await);
        assert_eq!(reg.scope_count().await, 0);

        let h = reg.handle("b").await;
        h.lock().await.insert(1);
        assert!(!reg.discard_if_empty("b", h).await);
        assert_eq!(reg.snapshot("b").await, vec![1]);
    }

    #[tokio::test]
    async fn scope_held_elsewhere_is_not_discarded() {
        let reg = IssuedRegistry::new(IssuedScope::Attempt);
        let h = reg.handle("a").await;
        let other = reg.handle("a").await;
        assert!(!reg.discard_if_empty("a", h).await);
        assert_eq!(reg.scope_count().await, 1);
        drop(other);
    }

    #[tokio::test]
    async fn full_registry_evicts_least_recently_used() {
        let limits = RegistryLimits { max_scopes: Some(2), idle_ttl: None };
        let reg = IssuedRegistry::with_limits(IssuedScope::Attempt, limits);
        reg.handle("a").await.lock().await.insert(1);
        std::thread::sleep(Duration::from_millis(2));
        reg.handle("b").await.lock().await.insert(2);
        std::thread::sleep(Duration::from_millis(2));
        // touching "a" makes "b" the oldest
        reg.handle("a").await.lock().await.insert(3);
        reg.handle("c").await.lock().await.insert(4);

        assert_eq!(reg.scope_count().await, 2);
        assert_eq!(reg.snapshot("a").await, vec![1, 3]);
        assert!(reg.snapshot("b").await.is_empty());
        assert_eq!(reg.snapshot("c").await, vec![4]);
    }

    #[tokio::test]
    async fn held_scopes_survive_a_full_registry() {
        let limits = RegistryLimits { max_scopes: Some(1), idle_ttl: None };
        let reg = IssuedRegistry::with_limits(IssuedScope::Attempt, limits);
        let a = reg.handle("a").await;
        let _b = reg.handle("b").await;
        assert_eq!(reg.scope_count().await, 2);
        drop(a);
        reg.handle("c").await;
        assert_eq!(reg.scope_count().await, 2);
        assert!(reg.sets.read().await.contains_key("b"));
    }

    #[tokio::test]
    async fn idle_scopes_expire() {
        let limits = RegistryLimits { max_scopes: None, idle_ttl: Some(Duration::ZERO) };
        let reg = IssuedRegistry::with_limits(IssuedScope::Attempt, limits);
        for id in ["a", "b", "c"] {
            reg.handle(id).await.lock().await.insert(1);
        }
        // each new scope sweeps out the ones before it
        assert_eq!(reg.scope_count().await, 1);
        assert_eq!(reg.snapshot("c").await, vec![1]);
    }

    #[tokio::test]
    async fn global_scope_is_never_evicted() {
        let limits = RegistryLimits { max_scopes: Some(1), idle_ttl: Some(Duration::ZERO) };
        let reg = IssuedRegistry::with_limits(IssuedScope::Global, limits);
        reg.handle("a").await.lock().await.insert(1);
        reg.handle("b").await.lock().await.insert(2);
        assert_eq!(reg.snapshot("c").await, vec![1, 2]);
    }
}
