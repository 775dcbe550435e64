//! Wall-clock helpers.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Milliseconds between the Unix epoch and now.
pub fn now_millis() -> u64 {
    since_epoch().as_millis() as u64
}

// A clock set before 1970 reads as the epoch itself.
fn since_epoch() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

/// Estimated wall clock with nanosecond granularity.
///
/// The wall clock is sampled once at construction and a monotonic timer
/// supplies the offset from that point. Readings never go backwards, but they
/// do not follow NTP adjustments and drift from the real wall clock while the
/// process is suspended. Not a replacement for [`now_millis`].
///
/// Stored as u64 nanoseconds, which lasts until the year 2554.
#[derive(Debug, Clone, Copy)]
pub struct NanoClock {
    wall_start_nanos: u64,
    mono_start: Instant,
}

impl NanoClock {
    pub fn new() -> Self {
        let wall_start_nanos = since_epoch().as_nanos() as u64;
        Self {
            wall_start_nanos,
            mono_start: Instant::now(),
        }
    }

    pub fn current_time_nanos(&self) -> u64 {
        let elapsed = self.mono_start.elapsed().as_nanos() as u64;
        self.wall_start_nanos.saturating_add(elapsed)
    }

    pub fn current_time_micros(&self) -> u64 {
        self.current_time_nanos() / 1_000
    }
}

impl Default for NanoClock {
    fn default() -> Self {
        Self::new()
    }
}
