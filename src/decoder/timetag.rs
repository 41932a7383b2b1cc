//! Trigger time-tag rollover correction
//!
//! The hardware time tag is a 32-bit counter of 8 ns ticks whose top bit is
//! reserved, so it wraps every 2^31 ticks (about 17 seconds). Reconstruction
//! counts the wraps seen so far and extends each raw tag to a monotonic
//! 64-bit tick count.

/// Tick count at which the hardware counter wraps
pub const ROLLOVER_PERIOD: u64 = 1 << 31;

/// Tracks rollovers of the hardware time-tag counter across events
#[derive(Debug, Clone, Default)]
pub struct TimeTagTracker {
    last_raw: u32,
    rollovers: u64,
}

impl TimeTagTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extend a raw tag to a monotonic 64-bit tick count. A raw tag smaller
    /// than its predecessor means the counter wrapped exactly once; tags must
    /// therefore arrive in acquisition order.
    pub fn correct(&mut self, raw: u32) -> u64 {
        if raw < self.last_raw {
            self.rollovers += 1;
        }
        self.last_raw = raw;
        u64::from(raw) + self.rollovers * ROLLOVER_PERIOD
    }

    /// Number of wraps observed so far
    pub fn rollover_count(&self) -> u64 {
        self.rollovers
    }

    /// Last raw tag fed to the tracker
    pub fn last_raw(&self) -> u32 {
        self.last_raw
    }
}

/// Absolute trigger time in seconds since the Unix epoch
#[inline]
pub fn absolute_time(start_epoch: f64, ticks: u64, tick_seconds: f64) -> f64 {
    start_epoch + ticks as f64 * tick_seconds
}
