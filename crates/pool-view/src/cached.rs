// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The read-through cache behind every pool view.
//!
//! A [`CachedView`] wraps a [`ViewSource`] (the expensive, fallible query)
//! and serves its last successful result until the TTL runs out. Staleness
//! is checked lazily on access; there is no background refresh.
//!
//! # Failure Policy
//! When a refresh fails the error is logged and the previous data keeps
//! being served. Callers of the read interface never see query errors. The
//! next access after expiry simply tries again.
//!
//! # Consistency
//! Data and expiry live behind one `RwLock` and are replaced together, so a
//! reader sees either the complete old state or the complete new state.
//! Refreshes are serialised by a separate gate; a caller that waited on the
//! gate re-checks staleness first instead of querying a second time.
//!
//! Every [`CachedView::invalidate`] bumps a generation counter. A refresh
//! whose query was already running when the generation changed installs
//! its data but leaves the view stale, so a write that lands mid-query is
//! never masked by pre-write data.
//!
//! ```text
//! get(key)
//!   │
//!   ├─ fresh? ──────────────────────────────┐
//!   │                                       │
//!   └─ stale → gate → fetch() ─ Ok  → swap  │
//!                            └─ Err → log   │
//!                                           ▼
//!                                    lookup in data
//! ```

use crate::log::{MONITOR_TARGET, RUNTIME_TARGET};
use crate::{RefreshStats, ViewError, ViewLog};
use condor_query::{QueryError, ResourceMap};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The query a [`CachedView`] refreshes from.
pub trait ViewSource: Send + Sync {
    /// Channel name used for this source's log handle.
    fn channel(&self) -> &'static str;

    /// Queries `pool` (or the default pool for `None`) and returns the
    /// complete new data set.
    fn fetch(&self, pool: Option<&str>) -> Result<ResourceMap, QueryError>;
}

/// When the cached data stops being fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expiry {
    /// Never refreshed, or invalidated.
    Stale,
    Until(Instant),
    /// `now + ttl` overflowed `Instant`.
    Never,
}

impl Expiry {
    fn after(ttl: Duration) -> Self {
        Instant::now()
            .checked_add(ttl)
            .map_or(Self::Never, Self::Until)
    }

    fn is_stale(self) -> bool {
        match self {
            Self::Stale => true,
            Self::Until(deadline) => Instant::now() >= deadline,
            Self::Never => false,
        }
    }
}

struct CacheState {
    data: Arc<ResourceMap>,
    expiry: Expiry,
    /// Bumped by every invalidation.
    generation: u64,
}

/// A lazily refreshed, TTL-bound mapping from resource name to value.
///
/// The data starts empty and stale, so the first access always queries.
/// Before the first successful query an empty view is indistinguishable
/// from a pool that has no entries at all.
pub struct CachedView<S> {
    source: S,
    pool: Option<String>,
    ttl: Duration,
    state: RwLock<CacheState>,
    refresh_gate: Mutex<()>,
    stats: Mutex<RefreshStats>,
    log: ViewLog,
}

impl<S: ViewSource> CachedView<S> {
    /// Creates a view over `source` for `pool`, refreshing at most every `ttl`.
    pub fn new(source: S, pool: Option<String>, ttl: Duration) -> Self {
        let log = ViewLog::new(source.channel(), pool.as_deref());
        Self {
            source,
            pool,
            ttl,
            state: RwLock::new(CacheState {
                data: Arc::new(ResourceMap::new()),
                expiry: Expiry::Stale,
                generation: 0,
            }),
            refresh_gate: Mutex::new(()),
            stats: Mutex::new(RefreshStats::default()),
            log,
        }
    }

    /// The underlying query.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// The pool selector, `None` for the locally configured pool.
    pub fn pool(&self) -> Option<&str> {
        self.pool.as_deref()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// This view's logging handle.
    pub fn log(&self) -> &ViewLog {
        &self.log
    }

    /// Returns `true` if the next access will query the pool.
    pub fn is_stale(&self) -> bool {
        self.state.read().expiry.is_stale()
    }

    /// Queries the pool if the cached data has expired.
    ///
    /// Never fails: a failed query is logged and the old data is kept.
    pub fn refresh_if_stale(&self) {
        if !self.is_stale() {
            return;
        }
        let _gate = self.refresh_gate.lock();
        if !self.is_stale() {
            return;
        }
        self.refresh();
    }

    /// Forces the next access to query the pool.
    pub fn invalidate(&self) {
        {
            let mut state = self.state.write();
            state.expiry = Expiry::Stale;
            state.generation = state.generation.wrapping_add(1);
        }
        self.stats.lock().record_invalidation();
    }

    /// Returns the current data after a freshness check.
    ///
    /// The returned map is a consistent snapshot; later refreshes replace
    /// the view's data without touching it.
    pub fn snapshot(&self) -> Arc<ResourceMap> {
        self.refresh_if_stale();
        Arc::clone(&self.state.read().data)
    }

    /// Looks up `key` exactly, after a freshness check.
    pub fn get(&self, key: &str) -> Result<f64, ViewError> {
        self.snapshot()
            .get(key)
            .copied()
            .ok_or_else(|| ViewError::not_found(key))
    }

    /// Number of entries, after a freshness check.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Refresh statistics so far.
    pub fn stats(&self) -> RefreshStats {
        self.stats.lock().clone()
    }

    fn refresh(&self) {
        let _entered = self.log.span().enter();
        tracing::debug!(target: RUNTIME_TARGET, "querying pool {} ...", self.log.pool());

        let generation = self.state.read().generation;
        let started = Instant::now();
        match self.source.fetch(self.pool()) {
            Ok(data) => {
                let elapsed = started.elapsed();
                tracing::debug!(
                    target: MONITOR_TARGET,
                    "querying pool {} result: {data:?}",
                    self.log.pool(),
                );
                {
                    let mut state = self.state.write();
                    state.data = Arc::new(data);
                    if state.generation == generation {
                        state.expiry = Expiry::after(self.ttl);
                    } else {
                        tracing::debug!(
                            target: RUNTIME_TARGET,
                            "pool {} was invalidated during the query, keeping it stale",
                            self.log.pool(),
                        );
                    }
                }
                self.stats.lock().record_success(elapsed);
            }
            Err(err) => {
                tracing::error!(
                    target: RUNTIME_TARGET,
                    "querying pool {} failed: {err}",
                    self.log.pool(),
                );
                self.stats.lock().record_failure();
            }
        }
    }
}

impl<S> fmt::Debug for CachedView<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("CachedView")
            .field("channel", &self.log.channel())
            .field("pool", &self.pool)
            .field("ttl", &self.ttl)
            .field("expiry", &state.expiry)
            .field("entries", &state.data.len())
            .finish()
    }
}
