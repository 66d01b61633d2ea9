// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! View configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! pool = "cm.example.org:9618"
//! limit_ttl_secs = 10
//! usage_ttl_secs = 10
//! capacity_ttl_secs = 30
//! ```
//!
//! Every field is optional; missing fields take the defaults shown above
//! (and the locally configured pool when `pool` is absent).

use crate::{LimitView, PoolResources, UsageView, ViewError};
use condor_query::CommandRunner;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Settings shared by the views of one pool.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    /// Collector to query (`-pool`); `None` uses the local configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<String>,
    /// How long a limit dump is trusted.
    pub limit_ttl_secs: u64,
    /// How long a usage dump is trusted.
    pub usage_ttl_secs: u64,
    /// How long a capacity aggregate is trusted.
    pub capacity_ttl_secs: u64,
}

impl ViewConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ViewError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ViewError::ConfigError(format!("cannot read config '{}': {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ViewError> {
        toml::from_str(toml_str).map_err(|e| ViewError::ConfigError(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, ViewError> {
        toml::to_string_pretty(self)
            .map_err(|e| ViewError::ConfigError(format!("TOML serialise error: {e}")))
    }

    pub fn limit_ttl(&self) -> Duration {
        Duration::from_secs(self.limit_ttl_secs)
    }

    pub fn usage_ttl(&self) -> Duration {
        Duration::from_secs(self.usage_ttl_secs)
    }

    pub fn capacity_ttl(&self) -> Duration {
        Duration::from_secs(self.capacity_ttl_secs)
    }

    /// Builds the limit view for the configured pool.
    pub fn limit_view(&self, runner: Arc<dyn CommandRunner>) -> LimitView {
        LimitView::with_runner(self.pool.clone(), self.limit_ttl(), runner)
    }

    /// Builds the usage view for the configured pool.
    pub fn usage_view(&self, runner: Arc<dyn CommandRunner>) -> UsageView {
        UsageView::with_runner(self.pool.clone(), self.usage_ttl(), runner)
    }

    /// Builds the capacity view for the configured pool.
    pub fn pool_resources(&self, runner: Arc<dyn CommandRunner>) -> PoolResources {
        PoolResources::with_runner(self.pool.clone(), self.capacity_ttl(), runner)
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            pool: None,
            limit_ttl_secs: LimitView::DEFAULT_TTL.as_secs(),
            usage_ttl_secs: UsageView::DEFAULT_TTL.as_secs(),
            capacity_ttl_secs: PoolResources::DEFAULT_TTL.as_secs(),
        }
    }
}
