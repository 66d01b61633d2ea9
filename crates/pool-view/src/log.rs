// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-view logging handle.
//!
//! Each view owns a [`ViewLog`]: a `tracing` span carrying the view's channel
//! name and pool. Events are split over two targets so subscribers can route
//! them separately:
//!
//! - [`RUNTIME_TARGET`]: refresh attempts, query and write failures.
//! - [`MONITOR_TARGET`]: the data returned by successful queries.
//!
//! ```bash
//! RUST_LOG=condor_limits::runtime=debug,condor_limits::monitor=off condor-limits status
//! ```

use tracing::Span;

/// Target for diagnostic events (refreshes, failures).
pub const RUNTIME_TARGET: &str = "condor_limits::runtime";

/// Target for query results.
pub const MONITOR_TARGET: &str = "condor_limits::monitor";

/// Label used in logs when no explicit pool is selected.
pub const DEFAULT_POOL_LABEL: &str = "<local>";

/// Logging handle owned by a single view instance.
#[derive(Debug, Clone)]
pub struct ViewLog {
    channel: &'static str,
    pool: String,
    span: Span,
}

impl ViewLog {
    /// Creates a handle for `channel` (e.g. `condor.concurrency_limit`).
    pub fn new(channel: &'static str, pool: Option<&str>) -> Self {
        let pool = pool.unwrap_or(DEFAULT_POOL_LABEL).to_string();
        let span = tracing::debug_span!("pool_view", channel, pool = %pool);
        Self {
            channel,
            pool,
            span,
        }
    }

    /// The channel name this view logs under.
    pub fn channel(&self) -> &'static str {
        self.channel
    }

    /// The pool label used in log messages.
    pub fn pool(&self) -> &str {
        &self.pool
    }

    /// The span wrapping every event emitted on behalf of this view.
    pub fn span(&self) -> &Span {
        &self.span
    }
}
