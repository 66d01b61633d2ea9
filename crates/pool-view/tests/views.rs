// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: views driven by scripted HTCondor output.
//!
//! These tests exercise the public API the way a control loop does:
//! repeated reads within and across TTL windows, writes followed by reads,
//! and collector outages in between.

use condor_query::testing::ScriptedRunner;
use pool_view::{
    CapacityResource, LimitView, PoolResourceView, PoolResources, PoolView, UsageView, ViewConfig,
    ViewError,
};
use std::sync::Arc;
use std::time::Duration;

// ── Helpers ────────────────────────────────────────────────────

const LIMIT_DUMP: &str = "\
# Configuration from negotiator on cm.example.org <10.0.0.1:9618>
GPU_LIMIT = 5
CLOUD_LIMIT = 200
";

const USERPRIO_LONG: &str = "\
Name = \"Accounting\"
ConcurrencyLimit_gpu_typeA = 2.000000
ConcurrencyLimit_CLOUD = 150.000000
";

const STATUS_AF: &str = "\
8 32000 480000000 wn001.example.org
8 32000 480000000 wn002.example.org
8 32000 undefined wn003.example.org
";

const HOUR: Duration = Duration::from_secs(3600);

fn runner() -> Arc<ScriptedRunner> {
    Arc::new(ScriptedRunner::new())
}

// ── Cache behaviour ────────────────────────────────────────────

#[test]
fn test_first_access_queries_once_per_view() {
    let runner = runner();
    runner.push_ok(LIMIT_DUMP);
    runner.push_ok(USERPRIO_LONG);

    let limits = LimitView::with_runner(None, HOUR, runner.clone());
    let usage = UsageView::with_runner(None, HOUR, runner.clone());
    assert_eq!(runner.calls(), 0, "views must not query on construction");

    for _ in 0..5 {
        assert_eq!(limits.get("gpu.typeA"), Ok(5.0));
        assert_eq!(usage.get("gpu.typeA"), Ok(2.0));
    }
    assert_eq!(runner.calls(), 2);
}

#[test]
fn test_expired_view_queries_again() {
    let runner = runner();
    runner.push_ok("GPU_LIMIT = 5\n");
    runner.push_ok("GPU_LIMIT = 6\n");
    let limits = LimitView::with_runner(None, Duration::from_millis(100), runner.clone());

    assert_eq!(limits.get("gpu"), Ok(5.0));
    std::thread::sleep(Duration::from_millis(200));
    assert_eq!(limits.get("gpu"), Ok(6.0));
    assert_eq!(runner.calls(), 2);
}

#[test]
fn test_outage_serves_stale_data() {
    let runner = runner();
    runner.push_ok(USERPRIO_LONG);
    runner.push_timeout();
    runner.push_spawn_error();
    runner.push_failure(1, "ERROR: Can't locate negotiator");
    let usage = UsageView::with_runner(None, Duration::ZERO, runner.clone());

    for _ in 0..4 {
        assert_eq!(usage.get("CLOUD"), Ok(150.0));
    }
    let stats = usage.stats();
    assert_eq!(stats.attempts, 4);
    assert_eq!(stats.successes, 1);
    assert_eq!(stats.failures, 3);
}

// ── Write path ─────────────────────────────────────────────────

#[test]
fn test_write_then_read_requeries_within_ttl() {
    let runner = runner();
    runner.push_ok(LIMIT_DUMP);
    runner.push_ok(""); // condor_config_val -rset
    runner.push_ok(""); // condor_reconfig
    runner.push_ok("GPU_LIMIT = 10\nCLOUD_LIMIT = 200\n");
    let limits = LimitView::with_runner(Some("cm.example.org".into()), HOUR, runner.clone());

    assert_eq!(limits.get("gpu"), Ok(5.0));
    limits.set("gpu", 10.0);
    assert_eq!(limits.get("gpu"), Ok(10.0));

    let programs: Vec<String> = runner
        .invocations()
        .into_iter()
        .map(|call| call.program)
        .collect();
    assert_eq!(
        programs,
        ["condor_config_val", "condor_config_val", "condor_reconfig", "condor_config_val"]
    );
}

#[test]
fn test_unconfirmed_write_is_not_assumed() {
    let runner = runner();
    runner.push_ok(LIMIT_DUMP);
    runner.push_ok("");
    runner.push_failure(1, "condor_reconfig: permission denied");
    runner.push_ok(LIMIT_DUMP);
    let limits = LimitView::with_runner(None, HOUR, runner.clone());

    assert_eq!(limits.get("gpu"), Ok(5.0));
    limits.set("gpu", 10.0);
    // The negotiator did not apply the write; the read reports reality.
    assert_eq!(limits.get("gpu"), Ok(5.0));
    assert_eq!(runner.pending(), 0);
}

#[test]
fn test_delete_then_missing() {
    let runner = runner();
    runner.push_ok(LIMIT_DUMP);
    runner.push_ok("");
    runner.push_ok("");
    runner.push_ok("CLOUD_LIMIT = 200\n");
    let limits = LimitView::with_runner(None, HOUR, runner.clone());

    assert!(limits.contains("gpu"));
    limits.delete("gpu");
    assert_eq!(
        limits.get("gpu"),
        Err(ViewError::NotFound { key: "gpu".into() })
    );
    assert_eq!(limits.keys(), ["cloud"]);
}

// ── Capacity ───────────────────────────────────────────────────

#[test]
fn test_capacity_headroom() {
    let runner = runner();
    runner.push_ok(STATUS_AF);
    runner.push_ok(LIMIT_DUMP);
    let resources = Arc::new(PoolResources::with_runner(None, HOUR, runner.clone()));
    let limits = LimitView::with_runner(None, HOUR, runner.clone());

    let cpus = PoolResourceView::new(CapacityResource::Cpus, Arc::clone(&resources));
    // wn003 reports an undefined disk and is skipped entirely.
    assert_eq!(cpus.as_int(), Ok(16));
    let headroom = cpus.difference_from(limits.get("gpu").unwrap()).unwrap();
    assert_eq!(headroom, 11.0);
    assert_eq!(resources.capacity().machines, 2);
}

#[test]
fn test_views_from_config() {
    let runner = runner();
    runner.push_ok(USERPRIO_LONG);
    let config = ViewConfig::from_toml("pool = \"cm\"\nusage_ttl_secs = 60\n").unwrap();
    let usage = config.usage_view(runner.clone());
    assert_eq!(usage.len(), 2);
    assert_eq!(
        runner.invocations()[0].argv(),
        ["condor_userprio", "-pool", "cm", "-negotiator", "-long"]
    );
}
