// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `KEY = VALUE` dump parsing.
//!
//! Both `condor_config_val -dump` and `condor_userprio -long` print one
//! attribute per line. Only a small subset of those attributes is relevant,
//! so parsing is driven by a key transform: it maps an external attribute
//! name to a resource name, or returns `None` for attributes to ignore.
//!
//! ```text
//! # Configuration from negotiator on cm.example.org
//! GPU_LIMIT = 7                      → "gpu"        = 7.0
//! ConcurrencyLimit_GPU_typeA = 3.0   → "GPU_typeA"  = 3.0
//! NEGOTIATOR_INTERVAL = 60           → skipped (transform returns None)
//! ```

use std::collections::BTreeMap;

/// Resource name → numeric value.
pub type ResourceMap = BTreeMap<String, f64>;

/// Suffix of negotiator configuration knobs that define a concurrency limit.
const LIMIT_SUFFIX: &str = "_limit";

/// Prefix of per-limit usage attributes in the negotiator ClassAd.
const USAGE_PREFIX: &str = "ConcurrencyLimit_";

/// Parses `KEY = VALUE` lines into a [`ResourceMap`].
///
/// - Lines without `=` are skipped.
/// - The key (trimmed, up to the first `=`) goes through `transform`;
///   `None` skips the line.
/// - The value (trimmed) must parse as `f64`, otherwise the line is skipped.
/// - Later duplicates overwrite earlier ones.
pub fn parse_key_values<'a, I, F>(lines: I, transform: F) -> ResourceMap
where
    I: IntoIterator<Item = &'a str>,
    F: Fn(&str) -> Option<String>,
{
    let mut resources = ResourceMap::new();
    for line in lines {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let Some(resource) = transform(key.trim()) else {
            continue;
        };
        match value.trim().parse::<f64>() {
            Ok(value) => {
                resources.insert(resource, value);
            }
            Err(_) => {
                tracing::trace!("skipping non-numeric value for '{resource}': '{}'", value.trim());
            }
        }
    }
    resources
}

/// Maps a `<NAME>_LIMIT` configuration knob to the resource `<name>`.
///
/// The suffix match is case-insensitive. HTCondor treats limit names
/// case-insensitively, so the resource name is normalised to lowercase.
///
/// ```
/// use condor_query::limit_key;
///
/// assert_eq!(limit_key("GPU_LIMIT").as_deref(), Some("gpu"));
/// assert_eq!(limit_key("gpu.typeA_limit").as_deref(), Some("gpu.typea"));
/// assert_eq!(limit_key("NEGOTIATOR_INTERVAL"), None);
/// ```
pub fn limit_key(key: &str) -> Option<String> {
    let split = key.len().checked_sub(LIMIT_SUFFIX.len())?;
    let (name, suffix) = (key.get(..split)?, key.get(split..)?);
    if suffix.eq_ignore_ascii_case(LIMIT_SUFFIX) {
        Some(name.to_lowercase())
    } else {
        None
    }
}

/// Maps a `ConcurrencyLimit_<NAME>` usage attribute to the resource `<NAME>`.
///
/// The prefix match is case-sensitive and the remainder is kept verbatim.
///
/// ```
/// use condor_query::usage_key;
///
/// assert_eq!(usage_key("ConcurrencyLimit_GPU_typeA").as_deref(), Some("GPU_typeA"));
/// assert_eq!(usage_key("concurrencylimit_GPU"), None);
/// ```
pub fn usage_key(key: &str) -> Option<String> {
    key.strip_prefix(USAGE_PREFIX).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG_DUMP: &str = "\
# Configuration from negotiator on cm.example.org <10.0.0.1:9618>

# Parameters with names that match LIMIT:
CONCURRENCY_LIMIT_DEFAULT = 2000
GPU_LIMIT = 7
gpu.typeA_LIMIT = 3
LICENSE_LIMIT = unlimited
NEGOTIATOR_INTERVAL = 60
";

    const USERPRIO_LONG: &str = "\
MyType = \"Accounting\"
Name = \"Accounting\"
ConcurrencyLimit_GPU_typeA = 3.000000
ConcurrencyLimit_LICENSE = 12.0
ConcurrencyLimit_ = 1
LastNegotiationCycleTime0 = 1700000000
";

    #[test]
    fn test_limit_parse_single_line() {
        let limits = parse_key_values(["GPU_LIMIT = 7"], limit_key);
        assert_eq!(limits.len(), 1);
        assert_eq!(limits["gpu"], 7.0);
    }

    #[test]
    fn test_limit_unrelated_attribute_skipped() {
        let limits = parse_key_values(["OTHER_ATTR = x"], limit_key);
        assert!(limits.is_empty());
    }

    #[test]
    fn test_limit_parse_dump() {
        let limits = parse_key_values(CONFIG_DUMP.lines(), limit_key);
        assert_eq!(limits["gpu"], 7.0);
        assert_eq!(limits["gpu.typea"], 3.0);
        // CONCURRENCY_LIMIT_DEFAULT does not end in _LIMIT.
        assert!(!limits.contains_key("concurrency_limit_default"));
        // Non-numeric value is skipped without aborting the parse.
        assert!(!limits.contains_key("license"));
        assert_eq!(limits.len(), 2);
    }

    #[test]
    fn test_usage_parse() {
        let usage = parse_key_values(["ConcurrencyLimit_GPU_typeA = 3"], usage_key);
        assert_eq!(usage["GPU_typeA"], 3.0);
    }

    #[test]
    fn test_usage_parse_dump() {
        let usage = parse_key_values(USERPRIO_LONG.lines(), usage_key);
        assert_eq!(usage["GPU_typeA"], 3.0);
        assert_eq!(usage["LICENSE"], 12.0);
        assert_eq!(usage[""], 1.0);
        assert_eq!(usage.len(), 3);
    }

    #[test]
    fn test_lines_without_separator_skipped() {
        let parsed = parse_key_values(["GPU_LIMIT 7", "", "   "], limit_key);
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_value_split_on_first_separator() {
        let parsed = parse_key_values(["GPU_LIMIT = 7 = 8"], limit_key);
        assert!(parsed.is_empty());
        let parsed = parse_key_values(["GPU_LIMIT=4"], limit_key);
        assert_eq!(parsed["gpu"], 4.0);
    }

    #[test]
    fn test_duplicate_last_wins() {
        let parsed = parse_key_values(["GPU_LIMIT = 1", "gpu_limit = 2"], limit_key);
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed["gpu"], 2.0);
    }

    #[test]
    fn test_limit_key_edge_cases() {
        assert_eq!(limit_key("_LIMIT").as_deref(), Some(""));
        assert_eq!(limit_key("LIMIT"), None);
        assert_eq!(limit_key(""), None);
        assert_eq!(limit_key("Disk_Limit").as_deref(), Some("disk"));
    }

    #[test]
    fn test_limit_key_multibyte_boundary() {
        // Must not panic when the suffix offset falls inside a character.
        assert_eq!(limit_key("üabcde"), None);
    }

    #[test]
    fn test_usage_key_is_case_sensitive() {
        assert_eq!(usage_key("CONCURRENCYLIMIT_GPU"), None);
        assert_eq!(usage_key("ConcurrencyLimit_gpu").as_deref(), Some("gpu"));
    }
}
