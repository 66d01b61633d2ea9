// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Aggregate hardware capacity of a pool.
//!
//! [`PoolResources`] exposes the following resources:
//!
//! | key        | meaning                           | ClassAd           |
//! |------------|-----------------------------------|-------------------|
//! | `cpus`     | CPU cores                         | `TotalSlotCpus`   |
//! | `memory`   | RAM in MiB                        | `TotalSlotMemory` |
//! | `disk`     | disk space in KiB                 | `TotalSlotDisk`   |
//! | `machines` | distinct machines, by host name   | `Machine`         |
//!
//! [`PoolResourceView`] narrows this down to one number, e.g. the total
//! core count an opposing limit is subtracted from.

use crate::cached::{CachedView, ViewSource};
use crate::view::PoolView;
use crate::{RefreshStats, ViewError};
use condor_query::{
    parse_host_records, CapacitySnapshot, CommandRunner, CondorCommand, QueryError, ResourceMap,
    SystemRunner, CAPACITY_ATTRIBUTES, CAPACITY_CONSTRAINT, CAPACITY_TIMEOUT,
};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Log channel of the capacity view.
pub const CAPACITY_CHANNEL: &str = "condor.pool_resources";

/// Queries per-host capacity from the collector and aggregates it.
#[derive(Debug, Clone)]
pub struct CapacityQuery {
    runner: Arc<dyn CommandRunner>,
}

impl CapacityQuery {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl ViewSource for CapacityQuery {
    fn channel(&self) -> &'static str {
        CAPACITY_CHANNEL
    }

    fn fetch(&self, pool: Option<&str>) -> Result<ResourceMap, QueryError> {
        let mut args = vec!["-startd", "-constraint", CAPACITY_CONSTRAINT, "-af"];
        args.extend(CAPACITY_ATTRIBUTES);
        let command = CondorCommand::pool_command("condor_status", args, pool);
        let output = command.query(self.runner.as_ref(), CAPACITY_TIMEOUT)?;
        let records = parse_host_records(&output);
        Ok(CapacitySnapshot::aggregate(&records).to_resource_map())
    }
}

/// Read-only view on the aggregate capacity of a pool.
///
/// Keys are looked up exactly. Before the first successful query the view
/// is empty and every lookup is a miss.
#[derive(Debug)]
pub struct PoolResources {
    view: CachedView<CapacityQuery>,
}

impl PoolResources {
    /// Default time a capacity aggregate is trusted.
    pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

    /// A view on `pool` that runs the real HTCondor tools.
    pub fn new(pool: Option<String>) -> Self {
        Self::with_runner(pool, Self::DEFAULT_TTL, Arc::new(SystemRunner))
    }

    /// A view on `pool` executing commands through `runner`.
    pub fn with_runner(pool: Option<String>, ttl: Duration, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            view: CachedView::new(CapacityQuery::new(runner), pool, ttl),
        }
    }

    /// Typed form of the current aggregate, after a freshness check.
    pub fn capacity(&self) -> CapacitySnapshot {
        CapacitySnapshot::from_resource_map(&self.view.snapshot())
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

impl PoolView for PoolResources {
    fn get(&self, resource: &str) -> Result<f64, ViewError> {
        self.view.get(resource)
    }

    fn snapshot(&self) -> Arc<ResourceMap> {
        self.view.snapshot()
    }
}

/// One of the aggregate quantities offered by [`PoolResources`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapacityResource {
    Cpus,
    Memory,
    Disk,
    Machines,
}

impl CapacityResource {
    /// The key of this resource in [`PoolResources`].
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cpus => "cpus",
            Self::Memory => "memory",
            Self::Disk => "disk",
            Self::Machines => "machines",
        }
    }
}

impl FromStr for CapacityResource {
    type Err = ViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpus" => Ok(Self::Cpus),
            "memory" => Ok(Self::Memory),
            "disk" => Ok(Self::Disk),
            "machines" => Ok(Self::Machines),
            other => Err(ViewError::UnknownResource {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for CapacityResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single aggregate pool resource, read through a shared [`PoolResources`].
///
/// ```no_run
/// use pool_view::{CapacityResource, PoolResourceView, PoolResources};
/// use std::sync::Arc;
///
/// let resources = Arc::new(PoolResources::new(None));
/// let cpus = PoolResourceView::new(CapacityResource::Cpus, resources);
/// let headroom = cpus.difference_from(64.0).unwrap_or(0.0);
/// println!("{headroom} cores not reserved for the opposing limit");
/// ```
#[derive(Debug, Clone)]
pub struct PoolResourceView {
    resource: CapacityResource,
    resources: Arc<PoolResources>,
}

impl PoolResourceView {
    pub fn new(resource: CapacityResource, resources: Arc<PoolResources>) -> Self {
        Self {
            resource,
            resources,
        }
    }

    /// The resource this view reads.
    pub fn resource(&self) -> CapacityResource {
        self.resource
    }

    /// The current value.
    pub fn as_float(&self) -> Result<f64, ViewError> {
        self.resources.get(self.resource.as_str())
    }

    /// The current value, truncated towards zero.
    pub fn as_int(&self) -> Result<i64, ViewError> {
        self.as_float().map(|value| value as i64)
    }

    /// `self - other`: how much of the resource remains once `other` is taken.
    pub fn difference_from(&self, other: f64) -> Result<f64, ViewError> {
        Ok(self.as_float()? - other)
    }
}
