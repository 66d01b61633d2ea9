// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A concurrency limit steered through an opposing limit.
//!
//! Two workloads share a pool of `total` slots. Only the opponent carries a
//! concurrency limit; whatever it does not claim is left for `resource`:
//!
//! ```text
//! supply(resource) = total - limit(opponent)
//! ```

use crate::limit::used_or_zero;
use crate::pool::fraction;
use crate::{ControlError, Pool, Total};
use pool_view::{LimitView, PoolView, UsageView, RUNTIME_TARGET};
use std::sync::Arc;

/// Volume of a concurrency limit, managed by adjusting an opposing limit.
#[derive(Debug, Clone)]
pub struct ConcurrencyAntiLimit {
    resource: String,
    opponent: String,
    total: Total,
    constraints: Arc<LimitView>,
    usage: Arc<UsageView>,
}

impl ConcurrencyAntiLimit {
    /// Adapter for `resource` in `pool`, with views of its own.
    pub fn new(
        resource: impl Into<String>,
        opponent: impl Into<String>,
        total: Total,
        pool: Option<String>,
    ) -> Self {
        Self::with_views(
            resource,
            opponent,
            total,
            Arc::new(LimitView::new(pool.clone())),
            Arc::new(UsageView::new(pool)),
        )
    }

    /// Adapter for `resource` reading through shared views.
    pub fn with_views(
        resource: impl Into<String>,
        opponent: impl Into<String>,
        total: Total,
        constraints: Arc<LimitView>,
        usage: Arc<UsageView>,
    ) -> Self {
        Self {
            resource: resource.into(),
            opponent: opponent.into(),
            total,
            constraints,
            usage,
        }
    }

    /// The limit that is actually written.
    pub fn opponent(&self) -> &str {
        &self.opponent
    }

    pub fn total(&self) -> &Total {
        &self.total
    }

    /// The pool selector.
    pub fn pool(&self) -> Option<&str> {
        self.constraints.pool()
    }
}

impl Pool for ConcurrencyAntiLimit {
    fn resource(&self) -> &str {
        &self.resource
    }

    fn supply(&self) -> Result<f64, ControlError> {
        let total = self.total.value()?;
        Ok(total - self.constraints.get(&self.opponent)?)
    }

    fn demand(&self) -> Result<f64, ControlError> {
        self.supply()
    }

    fn set_demand(&self, value: f64) -> Result<(), ControlError> {
        let opposing = self.total.value()? - value;
        tracing::debug!(
            target: RUNTIME_TARGET,
            resource = %self.resource,
            opponent = %self.opponent,
            value,
            opposing,
            "setting demand"
        );
        self.constraints.set(&self.opponent, opposing);
        Ok(())
    }

    fn utilisation(&self) -> Result<f64, ControlError> {
        let supply = self.supply()?;
        let used = used_or_zero(&self.usage, &self.resource)?;
        fraction(&self.resource, used, supply)
    }
}
