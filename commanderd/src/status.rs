//! Process-wide execution counters and uptime.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use chrono::{DateTime, SecondsFormat, Utc};

/// Shared by every request task; the counters are the only frequently
/// mutated state in the daemon.
pub struct StatusTracker {
    started: Instant,
    started_at: DateTime<Utc>,
    successes: AtomicU64,
    failures: AtomicU64,
}

#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    pub uptime: Duration,
    pub started_at: String,
    pub successes: u64,
    pub failures: u64,
    pub total: u64,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            started_at: Utc::now(),
            successes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    pub fn record_success(&self) {
        self.successes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Uptime is recomputed on every read, never cached.
    pub fn snapshot(&self) -> StatusSnapshot {
        let successes = self.successes.load(Ordering::Relaxed);
        let failures = self.failures.load(Ordering::Relaxed);
        StatusSnapshot {
            uptime: self.started.elapsed(),
            started_at: self.started_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            successes,
            failures,
            total: successes + failures,
        }
    }
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders a duration the way the status endpoint reports uptime,
/// e.g. `45.012s`, `3m20s`, `2h5m1s`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}.{:03}s", duration.subsec_millis())
    }
}
