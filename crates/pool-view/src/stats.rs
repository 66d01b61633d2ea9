// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Refresh statistics for diagnostics.
//!
//! [`RefreshStats`] counts how often a view actually went out to the pool,
//! how often that failed, and how often a write invalidated the cache. A
//! high failure ratio means the control loop is running on stale data.

use std::time::Duration;

/// Cumulative statistics about a view's refresh activity.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct RefreshStats {
    /// Number of refresh attempts (successful or not).
    pub attempts: u64,
    /// Number of refreshes that replaced the cached data.
    pub successes: u64,
    /// Number of refreshes whose query failed.
    pub failures: u64,
    /// Number of times the cache was invalidated by a write.
    pub invalidations: u64,
    /// Wall-clock duration of the most recent successful query.
    pub last_query_duration: Option<Duration>,
}

impl RefreshStats {
    /// Returns the failure ratio as a fraction in `[0.0, 1.0]`.
    ///
    /// Returns `0.0` if no refresh has been attempted.
    pub fn failure_ratio(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.failures as f64 / self.attempts as f64
    }

    pub(crate) fn record_success(&mut self, duration: Duration) {
        self.attempts += 1;
        self.successes += 1;
        self.last_query_duration = Some(duration);
    }

    pub(crate) fn record_failure(&mut self) {
        self.attempts += 1;
        self.failures += 1;
    }

    pub(crate) fn record_invalidation(&mut self) {
        self.invalidations += 1;
    }

    /// Returns a human-readable summary.
    pub fn summary(&self) -> String {
        let last = self
            .last_query_duration
            .map(|d| format!("{:.1}ms", d.as_secs_f64() * 1000.0))
            .unwrap_or_else(|| "n/a".to_string());
        format!(
            "Refreshes: {} attempts ({} ok, {} failed, {:.0}% failure rate), \
             {} invalidations, last query {last}",
            self.attempts,
            self.successes,
            self.failures,
            self.failure_ratio() * 100.0,
            self.invalidations,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let s = RefreshStats::default();
        assert_eq!(s.attempts, 0);
        assert_eq!(s.failure_ratio(), 0.0);
        assert!(s.summary().contains("last query n/a"));
    }

    #[test]
    fn test_failure_ratio() {
        let mut s = RefreshStats::default();
        s.record_success(Duration::from_millis(5));
        s.record_failure();
        s.record_failure();
        s.record_success(Duration::from_millis(7));
        assert_eq!(s.attempts, 4);
        assert!((s.failure_ratio() - 0.5).abs() < 1e-9);
        assert_eq!(s.last_query_duration, Some(Duration::from_millis(7)));
    }

    #[test]
    fn test_failure_keeps_last_duration() {
        let mut s = RefreshStats::default();
        s.record_success(Duration::from_millis(3));
        s.record_failure();
        assert_eq!(s.last_query_duration, Some(Duration::from_millis(3)));
    }

    #[test]
    fn test_summary() {
        let mut s = RefreshStats::default();
        s.record_success(Duration::from_millis(12));
        s.record_failure();
        s.record_invalidation();
        let summary = s.summary();
        assert!(summary.contains("2 attempts"));
        assert!(summary.contains("1 ok"));
        assert!(summary.contains("1 failed"));
        assert!(summary.contains("1 invalidations"));
        assert!(summary.contains("12.0ms"));
    }
}
