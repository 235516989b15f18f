//! Single-flight guard for sync cycles.

use std::sync::atomic::{AtomicU8, Ordering};

const IDLE: u8 = 0;
const RUNNING: u8 = 1;

/// Whether a sync cycle is currently executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Running,
}

/// Compare-and-swap gate that admits at most one cycle at a time.
///
/// `try_begin` hands out a [`SyncPermit`] only when the gate was idle; the
/// permit flips the gate back to idle when dropped, so every exit path out
/// of a cycle releases it, panics included.
#[derive(Debug, Default)]
pub struct SyncGate {
    state: AtomicU8,
}

impl SyncGate {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(IDLE),
        }
    }

    #[must_use]
    pub fn state(&self) -> SyncState {
        if self.state.load(Ordering::Acquire) == RUNNING {
            SyncState::Running
        } else {
            SyncState::Idle
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.state() == SyncState::Running
    }

    /// Attempt to move Idle -> Running. `None` means a cycle already holds
    /// the gate and the caller should treat the request as a no-op.
    #[must_use]
    pub fn try_begin(&self) -> Option<SyncPermit<'_>> {
        self.state
            .compare_exchange(IDLE, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SyncPermit { gate: self })
    }
}

/// Held for the duration of one cycle; releases the gate on drop.
#[derive(Debug)]
pub struct SyncPermit<'a> {
    gate: &'a SyncGate,
}

impl Drop for SyncPermit<'_> {
    fn drop(&mut self) {
        self.gate.state.store(IDLE, Ordering::Release);
    }
}
