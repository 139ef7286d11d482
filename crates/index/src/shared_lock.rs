//! Reader/writer lock with writer preference.
//!
//! Any number of shared holders, or a single exclusive holder, never both.
//! Once an exclusive request is waiting, new shared requests queue behind it,
//! so a steady stream of readers cannot starve a writer. Access is always
//! scoped: the guard releases on drop, including during unwinding.

use std::cell::UnsafeCell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct LockState {
    readers: usize,
    writer: bool,
    waiting_writers: usize,
}

pub struct SharedLock<T> {
    state: Mutex<LockState>,
    readable: Condvar,
    writable: Condvar,
    data: UnsafeCell<T>,
}

// SAFETY: access to `data` is mediated by `state`; shared guards hand out `&T`
// only while no exclusive guard exists, and the exclusive guard is unique.
unsafe impl<T: Send> Send for SharedLock<T> {}
unsafe impl<T: Send + Sync> Sync for SharedLock<T> {}

impl<T> SharedLock<T> {
    pub fn new(value: T) -> Self {
        Self {
            state: Mutex::new(LockState::default()),
            readable: Condvar::new(),
            writable: Condvar::new(),
            data: UnsafeCell::new(value),
        }
    }

    /// Blocks while an exclusive holder is active or waiting.
    pub fn read(&self) -> SharedGuard<'_, T> {
        let mut state = self.state();
        while state.writer || state.waiting_writers > 0 {
            state = self
                .readable
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.readers += 1;
        SharedGuard { lock: self }
    }

    /// Blocks while any holder, shared or exclusive, is active.
    pub fn write(&self) -> ExclusiveGuard<'_, T> {
        let mut state = self.state();
        state.waiting_writers += 1;
        while state.writer || state.readers > 0 {
            state = self
                .writable
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.waiting_writers -= 1;
        state.writer = true;
        ExclusiveGuard { lock: self }
    }

    /// Number of active shared holders.
    pub fn readers(&self) -> usize {
        self.state().readers
    }

    /// Number of exclusive requests currently blocked.
    pub fn waiting_writers(&self) -> usize {
        self.state().waiting_writers
    }

    // The state mutex never runs caller code while held, so a poisoned
    // guard still protects consistent counters.
    fn state(&self) -> MutexGuard<'_, LockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release_shared(&self) {
        let mut state = self.state();
        state.readers -= 1;
        if state.readers == 0 && state.waiting_writers > 0 {
            self.writable.notify_one();
        }
    }

    fn release_exclusive(&self) {
        let mut state = self.state();
        state.writer = false;
        if state.waiting_writers > 0 {
            self.writable.notify_one();
        } else {
            self.readable.notify_all();
        }
    }
}

impl<T: Default> Default for SharedLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> fmt::Debug for SharedLock<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("SharedLock")
            .field("readers", &state.readers)
            .field("writer", &state.writer)
            .field("waiting_writers", &state.waiting_writers)
            .finish_non_exhaustive()
    }
}

/// Shared access; released on drop.
pub struct SharedGuard<'a, T> {
    lock: &'a SharedLock<T>,
}

impl<T> Deref for SharedGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: a live shared guard excludes every exclusive guard.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> Drop for SharedGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release_shared();
    }
}

/// Exclusive access; released on drop.
pub struct ExclusiveGuard<'a, T> {
    lock: &'a SharedLock<T>,
}

impl<T> Deref for ExclusiveGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the exclusive guard is the only live guard.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> DerefMut for ExclusiveGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the exclusive guard is the only live guard.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for ExclusiveGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release_exclusive();
    }
}
