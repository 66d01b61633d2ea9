// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Concurrency limits as configured on the negotiator.
//!
//! Reads come from `condor_config_val -negotiator -dump LIMIT`; every
//! `<NAME>_LIMIT` knob becomes the resource `<name>`. Writes go through
//! `condor_config_val -rset` followed by `condor_reconfig`, so the
//! negotiator picks up the new value on its next cycle.
//!
//! # Write Semantics
//! Writes are best effort. A failed write is logged, not returned, and the
//! cache is invalidated either way: the next read reports what the
//! negotiator actually has, not what we asked for.

use crate::cached::{CachedView, ViewSource};
use crate::log::RUNTIME_TARGET;
use crate::view::{resolve_with_group, PoolView};
use crate::{RefreshStats, ViewError};
use condor_query::{
    limit_key, parse_key_values, CommandRunner, CondorCommand, QueryError, ResourceMap,
    SystemRunner, QUERY_TIMEOUT,
};
use std::sync::Arc;
use std::time::Duration;

/// Log channel of the limit view.
pub const LIMIT_CHANNEL: &str = "condor.concurrency_limit";

/// Queries the negotiator's `*_LIMIT` configuration.
#[derive(Debug, Clone)]
pub struct LimitQuery {
    runner: Arc<dyn CommandRunner>,
}

impl LimitQuery {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl ViewSource for LimitQuery {
    fn channel(&self) -> &'static str {
        LIMIT_CHANNEL
    }

    fn fetch(&self, pool: Option<&str>) -> Result<ResourceMap, QueryError> {
        let command = CondorCommand::pool_command(
            "condor_config_val",
            ["-negotiator", "-dump", "LIMIT"],
            pool,
        );
        let output = command.query(self.runner.as_ref(), QUERY_TIMEOUT)?;
        Ok(parse_key_values(output.lines(), limit_key))
    }
}

/// Read/write view on the configured concurrency limits of a pool.
///
/// Resource names are case-insensitive, like HTCondor limit names. A dotted
/// resource (`gpu.typeA`) without its own limit resolves to its group
/// (`gpu`).
///
/// # Example
/// ```no_run
/// use pool_view::{LimitView, PoolView};
///
/// let limits = LimitView::new(None);
/// if let Ok(ceiling) = limits.get("gpu") {
///     limits.set("gpu", ceiling + 1.0);
/// }
/// ```
#[derive(Debug)]
pub struct LimitView {
    view: CachedView<LimitQuery>,
}

impl LimitView {
    /// Default time a limit dump is trusted.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(10);

    /// A view on `pool` that runs the real HTCondor tools.
    pub fn new(pool: Option<String>) -> Self {
        Self::with_runner(pool, Self::DEFAULT_TTL, Arc::new(SystemRunner))
    }

    /// A view on `pool` executing commands through `runner`.
    pub fn with_runner(pool: Option<String>, ttl: Duration, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            view: CachedView::new(LimitQuery::new(runner), pool, ttl),
        }
    }

    /// Sets the limit of `resource` to `value`, truncated to a whole number.
    ///
    /// Negative values are clamped to zero. A NaN or infinite value is
    /// logged and not written; the cache is invalidated all the same.
    pub fn set(&self, resource: &str, value: f64) {
        if !value.is_finite() {
            let _entered = self.view.log().span().enter();
            tracing::error!(
                target: RUNTIME_TARGET,
                "refusing to constrain {resource:?} to non-finite value {value}",
            );
            self.view.invalidate();
            return;
        }
        let limit = if value < 0.0 {
            let _entered = self.view.log().span().enter();
            tracing::warn!(
                target: RUNTIME_TARGET,
                "clamping negative limit {value} for {resource:?} to 0",
            );
            0
        } else {
            value as i64
        };
        self.set_constraint(resource, &limit.to_string());
    }

    /// Removes the limit of `resource` from the negotiator configuration.
    pub fn delete(&self, resource: &str) {
        self.set_constraint(resource, "");
    }

    /// Forces the next read to query the negotiator.
    pub fn invalidate(&self) {
        self.view.invalidate();
    }

    /// The pool selector.
    pub fn pool(&self) -> Option<&str> {
        self.view.pool()
    }

    /// Refresh statistics of the underlying cache.
    pub fn stats(&self) -> RefreshStats {
        self.view.stats()
    }

    fn set_constraint(&self, resource: &str, constraint: &str) {
        let pool = self.view.pool();
        let setting = format!("{resource}_LIMIT = {constraint}");
        let reconfig = CondorCommand::pool_command(
            "condor_config_val",
            ["-negotiator", "-rset", setting.as_str()],
            pool,
        );
        let flush = CondorCommand::pool_command("condor_reconfig", ["-negotiator"], pool);

        let runner = self.view.source().runner.as_ref();
        let result = reconfig
            .execute(runner, QUERY_TIMEOUT)
            .and_then(|()| flush.execute(runner, QUERY_TIMEOUT));

        let _entered = self.view.log().span().enter();
        match result {
            Ok(()) => tracing::info!(target: RUNTIME_TARGET, "constrained {resource:?} to {constraint:?}"),
            Err(err) => tracing::error!(
                target: RUNTIME_TARGET,
                "failed to constrain {resource:?} to {constraint:?}: {err}",
            ),
        }
        self.view.invalidate();
    }
}

impl PoolView for LimitView {
    fn get(&self, resource: &str) -> Result<f64, ViewError> {
        let key = resource.to_lowercase();
        let data = self.view.snapshot();
        resolve_with_group(&data, &key, &key).ok_or_else(|| ViewError::not_found(resource))
    }

    fn snapshot(&self) -> Arc<ResourceMap> {
        self.view.snapshot()
    }
}
