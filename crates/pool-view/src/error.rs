// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for pool views.
//!
//! Query failures never show up here: they are logged and absorbed at the
//! refresh boundary. What remains is what a caller can act on.

/// Errors surfaced by the view read interface and configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ViewError {
    /// Neither the key nor its parent group is present in the view.
    #[error("no entry for resource '{key}'")]
    NotFound { key: String },

    /// The name is not one of the aggregate pool resources.
    #[error("unknown pool resource '{name}'; expected 'cpus', 'memory', 'disk' or 'machines'")]
    UnknownResource { name: String },

    /// Configuration error.
    #[error("configuration error: {0}")]
    ConfigError(String),
}

impl ViewError {
    pub(crate) fn not_found(key: &str) -> Self {
        Self::NotFound {
            key: key.to_string(),
        }
    }
}
