// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-host capacity records and their pool-wide aggregate.
//!
//! The capacity query prints one line per eligible startd slot:
//!
//! ```text
//! condor_status -startd -constraint '<CAPACITY_CONSTRAINT>' \
//!     -af TotalSlotCpus TotalSlotMemory TotalSlotDisk Machine
//! 8 32000 480000000 wn001.example.org
//! 8 32000 480000000 wn002.example.org
//! ```
//!
//! Columns are cores, memory in MiB, disk in KiB and the host name.

use crate::ResourceMap;
use std::collections::BTreeSet;

/// ClassAd constraint selecting slots that represent whole, usable machines.
///
/// - Dynamic slots are carved out of a partitionable slot that is already
///   counted with its machine totals.
/// - Slots in the `Owner` state are unavailable to the pool.
pub const CAPACITY_CONSTRAINT: &str = r#"SlotType!="Dynamic" && State=!="Owner""#;

/// ClassAd attributes printed by the capacity query, in column order.
pub const CAPACITY_ATTRIBUTES: [&str; 4] =
    ["TotalSlotCpus", "TotalSlotMemory", "TotalSlotDisk", "Machine"];

/// One line of capacity output.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct HostRecord {
    pub cpus: f64,
    pub memory_mib: f64,
    pub disk_kib: f64,
    /// Host identifier (the `Machine` ClassAd).
    pub machine: String,
}

impl HostRecord {
    /// Parses a whitespace-separated `cpus memory disk machine` line.
    ///
    /// Returns `None` for lines with the wrong number of columns or with a
    /// non-numeric quantity (e.g. `undefined` for a missing attribute).
    pub fn parse(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        let [cpus, memory, disk, machine] = fields.as_slice() else {
            return None;
        };
        Some(Self {
            cpus: cpus.parse().ok()?,
            memory_mib: memory.parse().ok()?,
            disk_kib: disk.parse().ok()?,
            machine: (*machine).to_string(),
        })
    }
}

/// Parses every well-formed record in `output`, skipping the rest.
pub fn parse_host_records(output: &str) -> Vec<HostRecord> {
    output
        .lines()
        .filter_map(|line| {
            let record = HostRecord::parse(line);
            if record.is_none() && !line.trim().is_empty() {
                tracing::trace!("skipping malformed host record: '{line}'");
            }
            record
        })
        .collect()
}

/// Aggregate hardware capacity of a pool.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct CapacitySnapshot {
    /// Total processor cores.
    pub cpus: f64,
    /// Total memory in MiB.
    pub memory_mib: f64,
    /// Total disk in KiB.
    pub disk_kib: f64,
    /// Number of distinct hosts.
    pub machines: usize,
}

impl CapacitySnapshot {
    /// Resource names under which [`Self::to_resource_map`] stores values.
    pub const RESOURCES: [&'static str; 4] = ["cpus", "memory", "disk", "machines"];

    /// Sums quantities over all records and counts distinct machines.
    ///
    /// Quantities are summed per record, so two slots reporting the same
    /// host both contribute cores, while the host counts once.
    pub fn aggregate<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a HostRecord>,
    {
        let mut snapshot = Self::default();
        let mut machines = BTreeSet::new();
        for record in records {
            snapshot.cpus += record.cpus;
            snapshot.memory_mib += record.memory_mib;
            snapshot.disk_kib += record.disk_kib;
            machines.insert(record.machine.as_str());
        }
        snapshot.machines = machines.len();
        snapshot
    }

    /// Rebuilds a snapshot from a map produced by [`Self::to_resource_map`].
    ///
    /// Missing entries read as zero.
    pub fn from_resource_map(map: &ResourceMap) -> Self {
        let get = |key: &str| map.get(key).copied().unwrap_or(0.0);
        Self {
            cpus: get("cpus"),
            memory_mib: get("memory"),
            disk_kib: get("disk"),
            machines: get("machines") as usize,
        }
    }

    /// Flattens the snapshot into `cpus`, `memory`, `disk`, `machines`.
    pub fn to_resource_map(&self) -> ResourceMap {
        ResourceMap::from([
            ("cpus".to_string(), self.cpus),
            ("memory".to_string(), self.memory_mib),
            ("disk".to_string(), self.disk_kib),
            ("machines".to_string(), self.machines as f64),
        ])
    }

    /// Returns a summary string suitable for logging or CLI display.
    ///
    /// # Example output
    /// ```text
    /// Pool: 512 cores, 2000.0 GiB memory, 28.6 TiB disk on 64 machines
    /// ```
    pub fn summary(&self) -> String {
        let memory_gib = self.memory_mib / 1024.0;
        let disk_tib = self.disk_kib / (1024.0 * 1024.0 * 1024.0);
        format!(
            "Pool: {} cores, {memory_gib:.1} GiB memory, {disk_tib:.1} TiB disk on {} machines",
            self.cpus, self.machines,
        )
    }
}
