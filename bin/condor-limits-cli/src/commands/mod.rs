// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared helpers.

pub mod inspect;
pub mod set;
pub mod status;

use pool_view::ViewConfig;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Installs the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise the verbosity count picks the level.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the view configuration; `pool` overrides the file's pool.
pub fn load_config(path: Option<&Path>, pool: Option<String>) -> anyhow::Result<ViewConfig> {
    let mut config = match path {
        Some(path) => ViewConfig::from_file(path)?,
        None => ViewConfig::default(),
    };
    if pool.is_some() {
        config.pool = pool;
    }
    tracing::debug!(?config, "loaded view configuration");
    Ok(config)
}

/// Label for the configured pool in headers.
pub fn pool_label(config: &ViewConfig) -> &str {
    config.pool.as_deref().unwrap_or(pool_view::DEFAULT_POOL_LABEL)
}

/// Creates a visual usage bar (0.0-1.0 scale).
pub fn usage_bar(ratio: f64) -> String {
    let filled = (ratio.clamp(0.0, 1.0) * 20.0).round() as usize;
    let empty = 20 - filled;
    let symbol = if ratio >= 0.9 {
        "#"
    } else if ratio >= 0.7 {
        "="
    } else {
        "-"
    };
    format!("[{}{}]", symbol.repeat(filled), ".".repeat(empty))
}
