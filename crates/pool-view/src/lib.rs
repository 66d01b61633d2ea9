// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # pool-view
//!
//! Cached key-value views on the live state of an HTCondor pool, meant to
//! be polled by a resource-management control loop.
//!
//! # Views
//! - [`LimitView`]: configured concurrency limits (read/write).
//! - [`UsageView`]: current concurrency limit usage (read-only).
//! - [`PoolResources`]: aggregate cores, memory, disk and machine count
//!   (read-only), with [`PoolResourceView`] to pick out a single number.
//!
//! All of them implement [`PoolView`] on top of a [`CachedView`], which
//! runs the external query at most once per TTL and keeps serving the last
//! good data when a query fails.
//!
//! # Hierarchical Resources
//! Dotted resource names denote sub-resources of a group. When
//! `gpu.typeA` has no entry of its own, the limit and usage views resolve
//! it to `gpu`.
//!
//! # Example
//! ```no_run
//! use pool_view::{LimitView, PoolView, UsageView};
//!
//! let limits = LimitView::new(None);
//! let usage = UsageView::new(None);
//! let used = usage.get("gpu.typeA").unwrap_or(0.0);
//! match limits.get("gpu.typeA") {
//!     Ok(limit) if limit > 0.0 => println!("utilisation: {:.0}%", used / limit * 100.0),
//!     Ok(_) => println!("limit is zero"),
//!     Err(e) => println!("{e}"),
//! }
//! ```

mod cached;
mod capacity;
mod config;
mod error;
mod limits;
mod log;
mod stats;
mod usage;
mod view;

pub use cached::{CachedView, ViewSource};
pub use capacity::{CapacityQuery, CapacityResource, PoolResourceView, PoolResources, CAPACITY_CHANNEL};
pub use config::ViewConfig;
pub use error::ViewError;
pub use limits::{LimitQuery, LimitView, LIMIT_CHANNEL};
pub use log::{ViewLog, DEFAULT_POOL_LABEL, MONITOR_TARGET, RUNTIME_TARGET};
pub use stats::RefreshStats;
pub use usage::{UsageQuery, UsageView, USAGE_CHANNEL};
pub use view::{parent_group, PoolView, GROUP_SEPARATOR};
