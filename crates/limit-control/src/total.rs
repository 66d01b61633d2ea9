// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The combined ceiling of a resource and its opposing limit.

use pool_view::{CapacityResource, PoolResourceView, PoolResources, ViewError};
use std::fmt;
use std::sync::Arc;

/// Maximum sum of a limit and its opponent.
///
/// Either a fixed number or an aggregate pool resource that is queried
/// (through its cache) every time the value is needed.
#[derive(Debug, Clone)]
pub enum Total {
    Fixed(f64),
    Queried(PoolResourceView),
}

impl Total {
    /// Parses a number or one of `cpus`, `memory`, `disk`, `machines`.
    ///
    /// `resources` is only called for a queried total.
    pub fn parse<F>(spec: &str, resources: F) -> Result<Self, ViewError>
    where
        F: FnOnce() -> Arc<PoolResources>,
    {
        let spec = spec.trim();
        match spec.parse::<f64>() {
            Ok(value) if value.is_finite() => return Ok(Self::Fixed(value)),
            _ => {}
        }
        let resource: CapacityResource = spec.parse()?;
        Ok(Self::Queried(PoolResourceView::new(resource, resources())))
    }

    /// The current value.
    pub fn value(&self) -> Result<f64, ViewError> {
        match self {
            Self::Fixed(value) => Ok(*value),
            Self::Queried(view) => view.as_float(),
        }
    }
}

impl From<f64> for Total {
    fn from(value: f64) -> Self {
        Self::Fixed(value)
    }
}

impl From<PoolResourceView> for Total {
    fn from(view: PoolResourceView) -> Self {
        Self::Queried(view)
    }
}

impl fmt::Display for Total {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(value) => write!(f, "{value}"),
            Self::Queried(view) => write!(f, "pool {}", view.resource()),
        }
    }
}
