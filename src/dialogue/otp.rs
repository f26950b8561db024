//! OTP lifecycle: validity window of an issued one-time code.
//!
//! No timer runs. Expiry and the remaining time are recomputed from the
//! issue timestamp every time the user answers.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeDelta, Utc};

/// Default validity window of an issued code.
pub const DEFAULT_OTP_TTL_SECS: i64 = 600;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = now;
        }
    }

    pub fn advance(&self, by: TimeDelta) {
        if let Ok(mut guard) = self.now.lock() {
            *guard = *guard + by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Computes issue time, remaining validity and expiry of OTPs.
#[derive(Clone)]
pub struct OtpLifecycle {
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl OtpLifecycle {
    pub fn new(ttl: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        Self { ttl, clock }
    }

    pub fn ttl(&self) -> TimeDelta {
        self.ttl
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Timestamp to record when a code has just been issued.
    pub fn issue(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Time left before expiry, never negative.
    pub fn remaining(&self, now: DateTime<Utc>, issued_at: DateTime<Utc>) -> TimeDelta {
        let left = self.ttl - (now - issued_at);
        left.max(TimeDelta::zero())
    }

    pub fn is_expired(&self, now: DateTime<Utc>, issued_at: DateTime<Utc>) -> bool {
        now - issued_at >= self.ttl
    }
}

impl std::fmt::Debug for OtpLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OtpLifecycle")
            .field("ttl_secs", &self.ttl.num_seconds())
            .finish()
    }
}

/// Render a duration as `mm:ss`.
pub fn format_countdown(remaining: TimeDelta) -> String {
    let secs = remaining.num_seconds().max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
