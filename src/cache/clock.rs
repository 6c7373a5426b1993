//! Logical clock ordering cache entries by recency.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// A process-wide tick counter. Strictly increasing; never wall-clock time.
#[derive(Debug, Default)]
pub struct LogicalClock {
    next: Mutex<u64>,
}

impl LogicalClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the next tick and store it into `cell` inside the same short
    /// critical section, so a recency cell never goes backwards relative to
    /// the clock.
    pub fn stamp(&self, cell: &AtomicU64) -> u64 {
        let mut next = self.next.lock().unwrap_or_else(PoisonError::into_inner);
        let tick = *next;
        *next += 1;
        cell.store(tick, Ordering::Relaxed);
        tick
    }

    /// The value the next stamp will receive.
    pub fn peek(&self) -> u64 {
        *self.next.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn ticks_strictly_increase() {
        let clock = LogicalClock::new();
        let cell = AtomicU64::new(u64::MAX);
        assert_eq!(clock.stamp(&cell), 0);
        assert_eq!(cell.load(Ordering::Relaxed), 0);
        assert_eq!(clock.stamp(&cell), 1);
        assert_eq!(clock.peek(), 2);
    }

    #[test]
    fn concurrent_stamps_are_unique() {
        let clock = Arc::new(LogicalClock::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let clock = clock.clone();
                std::thread::spawn(move || {
                    let cell = AtomicU64::new(0);
                    (0..250).map(|_| clock.stamp(&cell)).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all: Vec<u64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 1000);
        assert_eq!(clock.peek(), 1000);
    }
}
