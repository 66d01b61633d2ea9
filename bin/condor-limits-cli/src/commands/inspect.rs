// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `condor-limits inspect` command: read a resource through a pool adapter.
//!
//! With only a resource the limit is steered directly. With an opponent and
//! a total the resource gets whatever of the total the opponent leaves.

use super::{pool_label, usage_bar};
use condor_query::SystemRunner;
use limit_control::{ConcurrencyAntiLimit, ConcurrencyLimit, Pool, Total};
use pool_view::ViewConfig;
use std::sync::Arc;

pub fn execute(
    config: &ViewConfig,
    resource: String,
    opposition: Option<(String, String)>,
) -> anyhow::Result<()> {
    let runner = Arc::new(SystemRunner);
    let limits = Arc::new(config.limit_view(runner.clone()));
    let usage = Arc::new(config.usage_view(runner.clone()));

    let (adapter, mode): (Box<dyn Pool>, String) = match opposition {
        None => {
            let adapter = ConcurrencyLimit::with_views(resource, limits, usage);
            (Box::new(adapter) as Box<dyn Pool>, "direct limit".to_string())
        }
        Some((opponent, total)) => {
            let total = Total::parse(&total, || Arc::new(config.pool_resources(runner)))?;
            let mode = format!("total {total} minus limit '{opponent}'");
            let adapter = ConcurrencyAntiLimit::with_views(resource, opponent, total, limits, usage);
            (Box::new(adapter) as Box<dyn Pool>, mode)
        }
    };

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║          condor-limits · Pool Adapter View           ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();
    println!("  Pool:         {}", pool_label(config));
    println!("  Resource:     {}", adapter.resource());
    println!("  Supply:       {mode}");
    println!();

    let report = adapter.report()?;
    println!("   Supply:       {}", report.supply);
    println!("   Demand:       {}", report.demand);
    println!(
        "   Utilisation:  {:.1}%  {}",
        report.utilisation * 100.0,
        usage_bar(report.utilisation),
    );
    println!("   Allocation:   {:.1}%", report.allocation * 100.0);
    if report.supply < 0.0 {
        println!("   WARNING: opposing limit exceeds the total");
    }

    Ok(())
}
