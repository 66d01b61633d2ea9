// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A concurrency limit steered directly.

use crate::pool::fraction;
use crate::{ControlError, Pool};
use pool_view::{LimitView, PoolView, UsageView, ViewError, RUNTIME_TARGET};
use std::sync::Arc;

/// Volume of a concurrency limit in a pool.
///
/// Supply and demand are both the configured limit; setting the demand
/// rewrites the limit on the negotiator.
#[derive(Debug, Clone)]
pub struct ConcurrencyLimit {
    resource: String,
    constraints: Arc<LimitView>,
    usage: Arc<UsageView>,
}

impl ConcurrencyLimit {
    /// Adapter for `resource` in `pool`, with views of its own.
    pub fn new(resource: impl Into<String>, pool: Option<String>) -> Self {
        Self::with_views(
            resource,
            Arc::new(LimitView::new(pool.clone())),
            Arc::new(UsageView::new(pool)),
        )
    }

    /// Adapter for `resource` reading through shared views.
    pub fn with_views(
        resource: impl Into<String>,
        constraints: Arc<LimitView>,
        usage: Arc<UsageView>,
    ) -> Self {
        Self {
            resource: resource.into(),
            constraints,
            usage,
        }
    }

    /// The pool selector.
    pub fn pool(&self) -> Option<&str> {
        self.constraints.pool()
    }
}

impl Pool for ConcurrencyLimit {
    fn resource(&self) -> &str {
        &self.resource
    }

    fn supply(&self) -> Result<f64, ControlError> {
        Ok(self.constraints.get(&self.resource)?)
    }

    fn demand(&self) -> Result<f64, ControlError> {
        self.supply()
    }

    fn set_demand(&self, value: f64) -> Result<(), ControlError> {
        tracing::debug!(target: RUNTIME_TARGET, resource = %self.resource, value, "setting demand");
        self.constraints.set(&self.resource, value);
        Ok(())
    }

    fn utilisation(&self) -> Result<f64, ControlError> {
        let limit = self.supply()?;
        let used = used_or_zero(&self.usage, &self.resource)?;
        fraction(&self.resource, used, limit)
    }
}

/// Usage of `resource`; a limit nobody uses has no usage entry at all.
pub(crate) fn used_or_zero(usage: &UsageView, resource: &str) -> Result<f64, ControlError> {
    match usage.get(resource) {
        Ok(used) => Ok(used),
        Err(ViewError::NotFound { .. }) => Ok(0.0),
        Err(err) => Err(err.into()),
    }
}
