// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The read interface shared by all pool views.

use crate::ViewError;
use condor_query::ResourceMap;
use std::sync::Arc;

/// Separator between a resource group and its sub-resource (`gpu.typeA`).
pub const GROUP_SEPARATOR: char = '.';

/// Read-only mapping from resource name to value.
///
/// Every method performs a freshness check on the underlying cache first.
pub trait PoolView {
    /// Resolves `resource`, including any parent-group fallback the view
    /// implements.
    fn get(&self, resource: &str) -> Result<f64, ViewError>;

    /// A consistent snapshot of all entries, for iteration.
    fn snapshot(&self) -> Arc<ResourceMap>;

    /// Returns `true` if [`PoolView::get`] would succeed.
    fn contains(&self, resource: &str) -> bool {
        self.get(resource).is_ok()
    }

    /// Number of stored entries (fallback aliases are not counted).
    fn len(&self) -> usize {
        self.snapshot().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stored resource names in sorted order.
    fn keys(&self) -> Vec<String> {
        self.snapshot().keys().cloned().collect()
    }
}

/// Returns the top-level group of a dotted resource key.
///
/// ```
/// use pool_view::parent_group;
///
/// assert_eq!(parent_group("gpu.typeA"), Some("gpu"));
/// assert_eq!(parent_group("gpu.typeA.large"), Some("gpu"));
/// assert_eq!(parent_group("gpu"), None);
/// ```
pub fn parent_group(key: &str) -> Option<&str> {
    key.split_once(GROUP_SEPARATOR).map(|(group, _)| group)
}

/// Looks up `key`, then its parent group, in `data`.
pub(crate) fn resolve_with_group(data: &ResourceMap, key: &str, group_of: &str) -> Option<f64> {
    data.get(key)
        .or_else(|| parent_group(group_of).and_then(|group| data.get(group)))
        .copied()
}
