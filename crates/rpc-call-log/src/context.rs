//! Per-call context and clocks

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::logging::CallInfo;
use crate::shape::CallShape;

/// Source of monotonic time for call timing.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// [`Clock`] backed by [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// [`Clock`] that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    offset: Arc<Mutex<Duration>>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Immutable state of one call, shared by every hook bound for it.
#[derive(Debug, Clone)]
pub struct CallContext {
    path: String,
    shape: CallShape,
    correlation_id: Option<String>,
    started_at: Instant,
}

impl CallContext {
    pub fn new(
        path: impl Into<String>,
        shape: CallShape,
        correlation_id: Option<String>,
        started_at: Instant,
    ) -> Self {
        Self {
            path: path.into(),
            shape,
            correlation_id,
            started_at,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn shape(&self) -> CallShape {
        self.shape
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Shared record fields for this call.
    pub fn info(&self) -> CallInfo {
        CallInfo {
            correlation_id: self.correlation_id.clone(),
            path: self.path.clone(),
            call_type: self.shape,
        }
    }

    /// Whole milliseconds from call start to `now`, zero if `now` is earlier.
    pub fn elapsed_ms(&self, now: Instant) -> u64 {
        u64::try_from(now.saturating_duration_since(self.started_at).as_millis())
            .unwrap_or(u64::MAX)
    }
}
