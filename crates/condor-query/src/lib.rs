// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # condor-query
//!
//! The boundary between the pool views and the HTCondor command-line tools.
//!
//! # Components
//! - [`CondorCommand`]: a program + argument list, with the optional
//!   `-pool <name>` selector injected right after the program name.
//! - [`CommandRunner`]: the seam that actually executes a command with a
//!   hard timeout. [`SystemRunner`] spawns real processes; tests swap in
//!   `testing::ScriptedRunner` (behind the `testing` feature).
//! - [`parse_key_values`]: turns `KEY = VALUE` dumps (`condor_config_val
//!   -dump`, `condor_userprio -long`) into a [`ResourceMap`], filtering keys
//!   through a transform such as [`limit_key`] or [`usage_key`].
//! - [`HostRecord`] / [`CapacitySnapshot`]: per-host `condor_status -af`
//!   records and their pool-wide aggregate.
//!
//! # Failure Model
//! A command that cannot be spawned, exits non-zero, or runs past its
//! timeout yields a [`QueryError`]. Malformed *lines* never do: the parsers
//! skip them and keep going.
//!
//! # Example
//! ```
//! use condor_query::{limit_key, parse_key_values};
//!
//! let dump = "# Configuration from negotiator\nGPU_LIMIT = 7\nOTHER_ATTR = x\n";
//! let limits = parse_key_values(dump.lines(), limit_key);
//! assert_eq!(limits.get("gpu"), Some(&7.0));
//! assert_eq!(limits.len(), 1);
//! ```

mod command;
mod error;
mod kv;
mod machines;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use command::{
    CommandOutput, CommandRunner, CondorCommand, SystemRunner, CAPACITY_TIMEOUT, QUERY_TIMEOUT,
};
pub use error::QueryError;
pub use kv::{limit_key, parse_key_values, usage_key, ResourceMap};
pub use machines::{
    parse_host_records, CapacitySnapshot, HostRecord, CAPACITY_ATTRIBUTES, CAPACITY_CONSTRAINT,
};
