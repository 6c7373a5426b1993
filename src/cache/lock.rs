//! Reader-preferring readers-writers lock.
//!
//! # Protocol
//! ```text
//! acquire_read:  wait while a writer is active, then readers += 1
//! release_read:  readers -= 1; the last reader out wakes waiters
//! acquire_write: wait until no writer is active and readers == 0
//! release_write: clear the writer flag and wake waiters
//! ```
//!
//! A waiting writer does not hold back newly arriving readers. Under a
//! sustained stream of overlapping lookups a writer can starve; the cache
//! accepts that in exchange for never delaying a lookup behind a pending store.
//!
//! The bookkeeping lives behind a short `std::sync::Mutex` that is never held
//! across an await point. `Notify` takes the place of a condition variable: a
//! waiter registers interest *before* inspecting the state, so a release that
//! happens between the check and the await is not lost.
//!
//! The value itself sits in a `std::sync::RwLock` whose guard is taken only
//! after admission, so it is never contended. Guards must not be held across
//! an await point.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tokio::sync::Notify;

#[derive(Debug, Default)]
struct LockState {
    readers: usize,
    writer: bool,
}

/// An async readers-writers lock that admits readers whenever no writer is
/// active.
pub struct ReaderPreferringLock<T> {
    state: Mutex<LockState>,
    released: Notify,
    data: RwLock<T>,
}

impl<T> ReaderPreferringLock<T> {
    pub fn new(value: T) -> Self {
        Self {
            state: Mutex::new(LockState::default()),
            released: Notify::new(),
            data: RwLock::new(value),
        }
    }

    fn state(&self) -> MutexGuard<'_, LockState> {
        // The state is two plain counters; a panic elsewhere cannot leave it torn.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register as a reader. Blocks only while a writer holds the lock.
    pub async fn acquire_read(&self) -> ReadGuard<'_, T> {
        loop {
            let notified = self.released.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state();
                if !state.writer {
                    state.readers += 1;
                    break;
                }
            }

            notified.await;
        }

        let admission = ReadAdmission { lock: self };
        ReadGuard {
            data: self.data.read().unwrap_or_else(PoisonError::into_inner),
            _admission: admission,
        }
    }

    /// Take the lock exclusively, excluding readers and other writers.
    pub async fn acquire_write(&self) -> WriteGuard<'_, T> {
        loop {
            let notified = self.released.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.state();
                if !state.writer && state.readers == 0 {
                    state.writer = true;
                    break;
                }
            }

            notified.await;
        }

        let admission = WriteAdmission { lock: self };
        WriteGuard {
            data: self.data.write().unwrap_or_else(PoisonError::into_inner),
            _admission: admission,
        }
    }

    /// Number of registered readers at this instant.
    pub fn readers(&self) -> usize {
        self.state().readers
    }

    /// Whether a writer currently holds the lock.
    pub fn is_write_locked(&self) -> bool {
        self.state().writer
    }

    fn release_read(&self) {
        let mut state = self.state();
        state.readers -= 1;
        if state.readers == 0 {
            self.released.notify_waiters();
        }
    }

    fn release_write(&self) {
        let mut state = self.state();
        state.writer = false;
        self.released.notify_waiters();
    }
}

impl<T> std::fmt::Debug for ReaderPreferringLock<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("ReaderPreferringLock")
            .field("readers", &state.readers)
            .field("writer", &state.writer)
            .finish_non_exhaustive()
    }
}

struct ReadAdmission<'a, T> {
    lock: &'a ReaderPreferringLock<T>,
}

impl<T> Drop for ReadAdmission<'_, T> {
    fn drop(&mut self) {
        self.lock.release_read();
    }
}

struct WriteAdmission<'a, T> {
    lock: &'a ReaderPreferringLock<T>,
}

impl<T> Drop for WriteAdmission<'_, T> {
    fn drop(&mut self) {
        self.lock.release_write();
    }
}

/// Shared access. Dropping the guard deregisters the reader.
// Fields drop in declaration order: the data guard goes before admission is
// released, so the next writer never finds the inner lock held.
pub struct ReadGuard<'a, T> {
    data: RwLockReadGuard<'a, T>,
    _admission: ReadAdmission<'a, T>,
}

impl<T> ReadGuard<'_, T> {
    /// Deregister explicitly; same as dropping the guard.
    pub fn release(self) {}
}

impl<T> Deref for ReadGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

/// Exclusive access. Dropping the guard releases the writer lock.
pub struct WriteGuard<'a, T> {
    data: RwLockWriteGuard<'a, T>,
    _admission: WriteAdmission<'a, T>,
}

impl<T> WriteGuard<'_, T> {
    /// Release explicitly; same as dropping the guard.
    pub fn release(self) {}
}

impl<T> Deref for WriteGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

impl<T> DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.data
    }
}
