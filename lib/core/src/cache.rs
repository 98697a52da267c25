//! Time-boxed memoization for derived dataset statistics.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Injectable time source so cache expiry is testable without sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A single-slot cache: the memoized value is served while younger than
/// the freshness window, recomputed otherwise. `clear` forces the next
/// call to recompute regardless of age.
pub struct TimedCache<T> {
    freshness: Duration,
    clock: Arc<dyn Clock>,
    slot: Mutex<Option<(T, Instant)>>,
}

impl<T: Clone> TimedCache<T> {
    pub fn new(freshness: Duration) -> Self {
        Self::with_clock(freshness, Arc::new(SystemClock))
    }

    pub fn with_clock(freshness: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            freshness,
            clock,
            slot: Mutex::new(None),
        }
    }

    /// Return the cached value if fresh, otherwise run `compute`, cache
    /// its result, and return it. A failed computation leaves the slot
    /// untouched.
    pub fn get_or_compute<E>(
        &self,
        compute: impl FnOnce() -> std::result::Result<T, E>,
    ) -> std::result::Result<T, E> {
        let now = self.clock.now();
        let mut slot = self.slot.lock();
        if let Some((value, computed_at)) = slot.as_ref() {
            if now.duration_since(*computed_at) < self.freshness {
                return Ok(value.clone());
            }
        }
        let value = compute()?;
        *slot = Some((value.clone(), now));
        Ok(value)
    }

    pub fn clear(&self) {
        *self.slot.lock() = None;
    }
}
