// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the pool adapters.

use pool_view::ViewError;

/// Errors reported by a [`Pool`](crate::Pool) adapter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ControlError {
    /// A view lookup failed, e.g. the limit is not configured at all.
    #[error("view error: {0}")]
    View(#[from] ViewError),

    /// Utilisation was requested for a resource with no supply.
    #[error("resource '{resource}' has zero supply")]
    ZeroSupply { resource: String },
}
