// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # limit-control
//!
//! Adapters that present HTCondor concurrency limits as controllable
//! [`Pool`]s for a resource-management control loop.
//!
//! - [`ConcurrencyLimit`] steers a limit directly.
//! - [`ConcurrencyAntiLimit`] steers a resource by adjusting an opposing
//!   limit within a fixed or queried [`Total`].
//!
//! Adapters read through the cached views of `pool-view` and may share them:
//!
//! ```no_run
//! use limit_control::{ConcurrencyLimit, Pool};
//! use pool_view::{LimitView, UsageView};
//! use std::sync::Arc;
//!
//! let limits = Arc::new(LimitView::new(None));
//! let usage = Arc::new(UsageView::new(None));
//! let gpu = ConcurrencyLimit::with_views("gpu", limits.clone(), usage.clone());
//! let cloud = ConcurrencyLimit::with_views("cloud", limits, usage);
//!
//! for pool in [&gpu, &cloud] {
//!     if let Ok(utilisation) = pool.utilisation() {
//!         if utilisation > 0.9 {
//!             let demand = pool.demand().unwrap_or(0.0);
//!             let _ = pool.set_demand(demand + 1.0);
//!         }
//!     }
//! }
//! ```

mod anti_limit;
mod error;
mod limit;
mod pool;
mod total;

pub use anti_limit::ConcurrencyAntiLimit;
pub use error::ControlError;
pub use limit::ConcurrencyLimit;
pub use pool::{Pool, PoolReport};
pub use total::Total;
