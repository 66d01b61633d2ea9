// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for pool queries.

use std::time::Duration;

/// Errors that can occur when invoking an HTCondor command.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The command could not be started (missing binary, permissions, ...).
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// The command did not finish within its timeout and was killed.
    #[error("`{command}` timed out after {timeout:?}")]
    TimedOut { command: String, timeout: Duration },

    /// The command ran but exited unsuccessfully.
    #[error("`{command}` failed with exit code {code:?}: {stderr}")]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

impl QueryError {
    /// Returns the rendered command line that caused this error.
    pub fn command(&self) -> &str {
        match self {
            Self::Spawn { command, .. }
            | Self::TimedOut { command, .. }
            | Self::Failed { command, .. } => command,
        }
    }
}
