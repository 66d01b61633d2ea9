// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `condor-limits status` command: display limits, usage and capacity.
//!
//! Each view queries its tool once. A tool that cannot be reached leaves
//! its table empty; the command itself still succeeds.

use super::{pool_label, usage_bar};
use condor_query::{CapacitySnapshot, ResourceMap, SystemRunner};
use pool_view::{PoolView, RefreshStats, ViewConfig};
use std::sync::Arc;

#[derive(Debug, serde::Serialize)]
struct StatusReport<'a> {
    pool: &'a str,
    limits: &'a ResourceMap,
    usage: &'a ResourceMap,
    capacity: &'a CapacitySnapshot,
    refresh: RefreshReport,
}

#[derive(Debug, serde::Serialize)]
struct RefreshReport {
    limits: RefreshStats,
    usage: RefreshStats,
    capacity: RefreshStats,
}

pub fn execute(config: &ViewConfig, json: bool) -> anyhow::Result<()> {
    let runner = Arc::new(SystemRunner);
    let limits = config.limit_view(runner.clone());
    let usage = config.usage_view(runner.clone());
    let resources = config.pool_resources(runner);

    let limit_data = limits.snapshot();
    let usage_data = usage.snapshot();
    let capacity = resources.capacity();

    if json {
        let report = StatusReport {
            pool: pool_label(config),
            limits: &limit_data,
            usage: &usage_data,
            capacity: &capacity,
            refresh: RefreshReport {
                limits: limits.stats(),
                usage: usage.stats(),
                capacity: resources.stats(),
            },
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║          condor-limits · Pool Limit Status           ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  Pool: {}", pool_label(config));
    println!();

    // ── Concurrency Limits ─────────────────────────────────────
    println!("  Concurrency Limits");
    if limit_data.is_empty() {
        println!("   (none configured or negotiator unreachable)");
    } else {
        println!("   {:<24} {:>10} {:>10}  {}", "Resource", "Limit", "Used", "Utilisation");
        println!("   {}", "-".repeat(70));
        for (resource, limit) in limit_data.iter() {
            let used = usage.get(resource).unwrap_or(0.0);
            let bar = if *limit > 0.0 {
                format!("{} {:>5.1}%", usage_bar(used / limit), used / limit * 100.0)
            } else {
                "-".to_string()
            };
            println!("   {:<24} {:>10} {:>10}  {bar}", resource, limit, used);
        }
    }
    println!();

    // ── Usage ──────────────────────────────────────────────────
    println!("  Usage");
    if usage_data.is_empty() {
        println!("   (no usage reported)");
    }
    for (resource, used) in usage_data.iter() {
        println!("   {:<24} {:>10}", resource, used);
    }
    println!();

    // ── Capacity ───────────────────────────────────────────────
    println!("  Capacity");
    println!("   Machines:     {}", capacity.machines);
    println!("   CPUs:         {}", capacity.cpus);
    println!("   Memory:       {:.1} GiB", capacity.memory_mib / 1024.0);
    println!("   Disk:         {:.1} GiB", capacity.disk_kib / (1024.0 * 1024.0));
    println!();

    for (name, stats) in [
        ("limits", limits.stats()),
        ("usage", usage.stats()),
        ("capacity", resources.stats()),
    ] {
        if stats.failures > 0 {
            println!("  WARNING: {name} query failed ({})", stats.summary());
        }
    }
    println!("{}", capacity.summary());

    Ok(())
}
