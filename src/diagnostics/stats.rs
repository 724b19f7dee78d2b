use serde::Serialize;
use std::time::{Duration, Instant};

/// Collects statistics over the lifetime of a capture pipeline.
pub struct CaptureStats {
    attempts: u64,
    successes: u64,
    failures: u64,
    ignored: u64,
    total_bytes: u64,
    start_time: Instant,
    last_duration: Option<Duration>,
    last_error: Option<String>,
}

/// Snapshot of capture stats for the host UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureSnapshot {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub ignored: u64,
    pub failure_rate: f64,
    pub average_bytes: u64,
    pub last_duration_ms: Option<f64>,
    pub last_error: Option<String>,
    pub uptime_secs: f64,
}

impl CaptureStats {
    /// Create new stats with zeroed counters.
    pub fn new() -> Self {
        Self {
            attempts: 0,
            successes: 0,
            failures: 0,
            ignored: 0,
            total_bytes: 0,
            start_time: Instant::now(),
            last_duration: None,
            last_error: None,
        }
    }

    /// A trigger dropped by the busy or detection guard.
    pub fn record_ignored(&mut self) {
        self.ignored += 1;
    }

    pub fn record_success(&mut self, bytes: usize, duration: Duration) {
        self.attempts += 1;
        self.successes += 1;
        self.total_bytes += bytes as u64;
        self.last_duration = Some(duration);
    }

    pub fn record_failure(&mut self, error: &str, duration: Duration) {
        self.attempts += 1;
        self.failures += 1;
        self.last_duration = Some(duration);
        self.last_error = Some(error.to_string());
    }

    /// Failure rate as a percentage (0.0 - 100.0).
    pub fn failure_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        (self.failures as f64 / self.attempts as f64) * 100.0
    }

    /// Mean size of successfully encoded images.
    pub fn average_bytes(&self) -> u64 {
        if self.successes == 0 {
            return 0;
        }
        self.total_bytes / self.successes
    }

    /// Reset all counters.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Take a serialisable snapshot.
    pub fn snapshot(&self) -> CaptureSnapshot {
        CaptureSnapshot {
            attempts: self.attempts,
            successes: self.successes,
            failures: self.failures,
            ignored: self.ignored,
            failure_rate: self.failure_rate(),
            average_bytes: self.average_bytes(),
            last_duration_ms: self.last_duration.map(|d| d.as_secs_f64() * 1000.0),
            last_error: self.last_error.clone(),
            uptime_secs: self.start_time.elapsed().as_secs_f64(),
        }
    }
}

impl Default for CaptureStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialises_with_zero_values() {
        let snap = CaptureStats::new().snapshot();
        assert_eq!(snap.attempts, 0);
        assert_eq!(snap.successes, 0);
        assert_eq!(snap.failures, 0);
        assert_eq!(snap.ignored, 0);
        assert!(snap.last_duration_ms.is_none());
    }

    #[test]
    fn ignored_triggers_are_not_attempts() {
        let mut stats = CaptureStats::new();
        stats.record_ignored();
        stats.record_ignored();
        let snap = stats.snapshot();
        assert_eq!(snap.ignored, 2);
        assert_eq!(snap.attempts, 0);
    }

    #[test]
    fn failure_rate_returns_percentage() {
        let mut stats = CaptureStats::new();
        stats.record_success(1000, Duration::from_millis(80));
        stats.record_success(1000, Duration::from_millis(80));
        stats.record_failure("encode", Duration::from_millis(60));
        let rate = stats.failure_rate();
        assert!((rate - 33.333).abs() < 1.0, "failure rate ~33%, got {rate}");
    }

    #[test]
    fn average_bytes_ignores_failures() {
        let mut stats = CaptureStats::new();
        stats.record_success(1000, Duration::ZERO);
        stats.record_success(3000, Duration::ZERO);
        stats.record_failure("boom", Duration::ZERO);
        assert_eq!(stats.average_bytes(), 2000);
    }

    #[test]
    fn reset_clears_all_counters() {
        let mut stats = CaptureStats::new();
        stats.record_success(1000, Duration::from_millis(5));
        stats.record_failure("x", Duration::from_millis(5));
        stats.reset();
        let snap = stats.snapshot();
        assert_eq!(snap.attempts, 0);
        assert!(snap.last_error.is_none());
    }

    #[test]
    fn snapshot_serialises_to_camel_case() {
        let mut stats = CaptureStats::new();
        stats.record_failure("renderer surface missing", Duration::from_millis(12));
        let json = serde_json::to_value(stats.snapshot()).unwrap();
        assert_eq!(json["lastError"], "renderer surface missing");
        assert_eq!(json["lastDurationMs"], 12.0);
        assert!(json["failureRate"].is_number());
    }
}
