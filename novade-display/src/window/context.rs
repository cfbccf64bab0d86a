//! Per-thread "current window" bookkeeping and thread affinity.
//!
//! A GPU context is current on at most one thread, and each thread has at
//! most one current context. The slot kept here mirrors what the backend
//! made current so callers can ask which window owns the thread.

use crate::error::DisplayError;
use std::cell::Cell;
use std::fmt;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, ThreadId};

static NEXT_WINDOW_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT: Cell<Option<WindowId>> = const { Cell::new(None) };
}

/// Process-unique window identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(NonZeroU64);

impl WindowId {
    pub fn next() -> Self {
        let raw = NEXT_WINDOW_ID.fetch_add(1, Ordering::Relaxed);
        // The counter starts at 1 and would need 2^64 windows to wrap.
        WindowId(NonZeroU64::new(raw).unwrap_or(NonZeroU64::MIN))
    }

    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// Records `id` as current on this thread and returns the window it replaced.
pub fn make_current(id: WindowId) -> Option<WindowId> {
    CURRENT.with(|slot| slot.replace(Some(id)))
}

/// Clears the slot, but only if it still names `id`.
pub fn release(id: WindowId) -> bool {
    CURRENT.with(|slot| {
        if slot.get() == Some(id) {
            slot.set(None);
            true
        } else {
            false
        }
    })
}

pub fn current() -> Option<WindowId> {
    CURRENT.with(Cell::get)
}

pub fn is_current(id: WindowId) -> bool {
    current() == Some(id)
}

/// Remembers the creating thread and rejects calls from any other.
#[derive(Debug, Clone, Copy)]
pub struct ThreadAffinity {
    owner: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadAffinity {
    pub fn new() -> Self {
        Self {
            owner: thread::current().id(),
        }
    }

    pub fn check(&self, operation: &'static str) -> Result<(), DisplayError> {
        if thread::current().id() == self.owner {
            Ok(())
        } else {
            tracing::error!(operation, owner = ?self.owner, "Window call from foreign thread");
            Err(DisplayError::WrongThread { operation })
        }
    }
}
