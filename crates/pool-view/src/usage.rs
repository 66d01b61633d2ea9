// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Concurrency limit usage as seen by the negotiator.
//!
//! `condor_userprio -negotiator -long` reports current consumption as
//! `ConcurrencyLimit_<NAME>` attributes. ClassAd attribute names cannot
//! contain dots, so a sub-resource `gpu.typeA` shows up as
//! `ConcurrencyLimit_gpu_typeA`; lookups translate accordingly.

use crate::cached::{CachedView, ViewSource};
use crate::view::{resolve_with_group, PoolView, GROUP_SEPARATOR};
use crate::{RefreshStats, ViewError};
use condor_query::{
    parse_key_values, usage_key, CommandRunner, CondorCommand, QueryError, ResourceMap,
    SystemRunner, QUERY_TIMEOUT,
};
use std::sync::Arc;
use std::time::Duration;

/// Log channel of the usage view.
pub const USAGE_CHANNEL: &str = "condor.concurrency_usage";

/// Queries per-limit usage from the negotiator's accounting ads.
#[derive(Debug, Clone)]
pub struct UsageQuery {
    runner: Arc<dyn CommandRunner>,
}

impl UsageQuery {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl ViewSource for UsageQuery {
    fn channel(&self) -> &'static str {
        USAGE_CHANNEL
    }

    fn fetch(&self, pool: Option<&str>) -> Result<ResourceMap, QueryError> {
        let command =
            CondorCommand::pool_command("condor_userprio", ["-negotiator", "-long"], pool);
        let output = command.query(self.runner.as_ref(), QUERY_TIMEOUT)?;
        Ok(parse_key_values(output.lines(), usage_key))
    }
}

/// Read-only view on current concurrency limit usage.
///
/// Resource names are case-sensitive. A limit nobody uses does not appear
/// at all, so a miss usually means "no usage" rather than "no such limit".
#[derive(Debug)]
pub struct UsageView {
    view: CachedView<UsageQuery>,
}

impl UsageView {
    /// Default time a usage dump is trusted.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(10);

    /// A view on `pool` that runs the real HTCondor tools.
    pub fn new(pool: Option<String>) -> Self {
        Self::with_runner(pool, Self::DEFAULT_TTL, Arc::new(SystemRunner))
    }

    /// A view on `pool` executing commands through `runner`.
    pub fn with_runner(pool: Option<String>, ttl: Duration, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            view: CachedView::new(UsageQuery::new(runner), pool, ttl),
        }
    }

    /// The pool selector.
    pub fn pool(&self) -> Option<&str> {
        self.view.pool()
    }

    /// Refresh statistics of the underlying cache.
    pub fn stats(&self) -> RefreshStats {
        self.view.stats()
    }
}

impl PoolView for UsageView {
    fn get(&self, resource: &str) -> Result<f64, ViewError> {
        let key = resource.replace(GROUP_SEPARATOR, "_");
        let data = self.view.snapshot();
        resolve_with_group(&data, &key, resource).ok_or_else(|| ViewError::not_found(resource))
    }

    fn snapshot(&self) -> Arc<ResourceMap> {
        self.view.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use condor_query::testing::ScriptedRunner;

    const USERPRIO: &str = "\
MyType = \"Accounting\"
ConcurrencyLimit_GPU_typeA = 3
ConcurrencyLimit_LICENSE = 12.0
ConcurrencyLimit_gpu = 4.0
Priority = 500.0
";

    fn view(runner: &Arc<ScriptedRunner>) -> UsageView {
        UsageView::with_runner(None, Duration::from_secs(3600), runner.clone())
    }

    #[test]
    fn test_query_command() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.push_ok(USERPRIO);
        let usage = view(&runner);
        assert_eq!(usage.get("LICENSE"), Ok(12.0));
        assert_eq!(
            runner.invocations()[0].argv(),
            ["condor_userprio", "-negotiator", "-long"]
        );
    }

    #[test]
    fn test_dotted_key_maps_to_underscore() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.push_ok(USERPRIO);
        let usage = view(&runner);
        assert_eq!(usage.get("GPU.typeA"), Ok(3.0));
        assert_eq!(usage.get("GPU_typeA"), Ok(3.0));
    }

    #[test]
    fn test_parent_group_fallback() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.push_ok(USERPRIO);
        let usage = view(&runner);
        assert_eq!(usage.get("gpu.typeZ"), Ok(4.0));
    }

    #[test]
    fn test_case_sensitive() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.push_ok(USERPRIO);
        let usage = view(&runner);
        assert!(!usage.contains("license"));
        assert!(matches!(usage.get("license"), Err(ViewError::NotFound { .. })));
    }

    #[test]
    fn test_entries() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.push_ok(USERPRIO);
        let usage = view(&runner);
        assert_eq!(usage.len(), 3);
        assert_eq!(usage.keys(), ["GPU_typeA", "LICENSE", "gpu"]);
        assert_eq!(runner.calls(), 1);
    }

    #[test]
    fn test_timeout_is_a_refresh_failure() {
        let runner = Arc::new(ScriptedRunner::new());
        runner.push_timeout();
        let usage = view(&runner);
        assert!(usage.is_empty());
        assert_eq!(usage.stats().failures, 1);
    }
}
