// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `condor-limits set` / `unset` commands: write a limit, then read it back.
//!
//! Writes are fire-and-forget on the view, so the read-back is the only
//! confirmation that the negotiator accepted the change.

use super::pool_label;
use condor_query::SystemRunner;
use pool_view::{LimitView, PoolView, ViewConfig};
use std::sync::Arc;

/// Sets `resource` to `value`, or removes its limit when `value` is `None`.
pub fn execute(config: &ViewConfig, resource: &str, value: Option<f64>) -> anyhow::Result<()> {
    if let Some(value) = value {
        anyhow::ensure!(value.is_finite(), "limit for '{resource}' must be a finite number");
    }
    let limits = config.limit_view(Arc::new(SystemRunner));
    let before = configured(&limits, resource);

    match value {
        Some(value) => limits.set(resource, value),
        None => limits.delete(resource),
    }
    let after = configured(&limits, resource);

    println!("  Pool:     {}", pool_label(config));
    println!("  Resource: {resource}");
    println!("  Before:   {}", describe(before));
    println!("  After:    {}", describe(after));

    // Negative limits are written as zero.
    let expected = value.map(|v| v.max(0.0).trunc());
    if after != expected {
        anyhow::bail!(
            "negotiator reports {} for '{resource}', expected {}",
            describe(after),
            describe(expected),
        );
    }
    Ok(())
}

/// The limit stored for `resource` itself, ignoring its group.
fn configured(limits: &LimitView, resource: &str) -> Option<f64> {
    limits.snapshot().get(&resource.to_lowercase()).copied()
}

fn describe(limit: Option<f64>) -> String {
    limit.map_or_else(|| "unlimited".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe() {
        assert_eq!(describe(None), "unlimited");
        assert_eq!(describe(Some(16.0)), "16");
        assert_eq!(describe(Some(2.5)), "2.5");
    }

    #[test]
    fn test_non_finite_value_rejected_before_querying() {
        let config = ViewConfig::default();
        for value in [f64::NAN, f64::INFINITY] {
            let err = execute(&config, "gpu", Some(value)).unwrap_err();
            assert!(err.to_string().contains("finite"));
        }
    }
}
