// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Process wide state shared between the active handler, its capture thread, and the
//! `SIGINT` hook.
//!
//! The saved terminal mode is stored as a type erased restore action behind an
//! [`AtomicPtr`], so the signal handler can reach it with nothing but atomic loads. The
//! slot is written only outside signal context: once when a handler activates, and once
//! when its [`SavedModeGuard`] drops.

use std::{ptr,
          sync::atomic::{AtomicBool, AtomicPtr, AtomicUsize, Ordering},
          thread};

/// Puts the terminal back the way it was when the handler activated. Returns whether that
/// worked.
pub(crate) type RestoreAction = Box<dyn Fn() -> bool + Send + Sync>;

static SAVED_MODE_RESTORE: AtomicPtr<RestoreAction> = AtomicPtr::new(ptr::null_mut());

/// Number of restore calls currently running, so [`SavedModeGuard`] doesn't free the
/// action under a signal handler that is still using it.
static RESTORES_IN_FLIGHT: AtomicUsize = AtomicUsize::new(0);

/// Set by the `SIGINT` hook when it hands the signal on to a previous handler. The
/// capture loop stops when it sees this.
static INTERRUPT_EXIT_REQUESTED: AtomicBool = AtomicBool::new(false);

/// Restores the terminal mode saved by the active keyboard handler.
///
/// Call this from your own termination path if you constructed the handler with
/// `install_signal_handler: false`. It only uses atomics and the terminal's `set_mode`,
/// so it is safe to call from a signal handler when the handler reads real stdin.
///
/// Returns `true` when the mode was restored or there was nothing to restore.
pub fn restore_buffer_mode_for_stdin() -> bool {
    RESTORES_IN_FLIGHT.fetch_add(1, Ordering::SeqCst);
    let action = SAVED_MODE_RESTORE.load(Ordering::SeqCst);
    // SAFETY: a non null pointer came from `Box::into_raw` in `publish_restore_action`,
    // and its guard waits for `RESTORES_IN_FLIGHT` to drain before freeing it.
    let restored = unsafe { action.as_ref() }.is_none_or(|restore| restore());
    RESTORES_IN_FLIGHT.fetch_sub(1, Ordering::SeqCst);
    restored
}

pub(crate) fn request_interrupt_exit() {
    INTERRUPT_EXIT_REQUESTED.store(true, Ordering::SeqCst);
}

pub(crate) fn is_interrupt_exit_requested() -> bool {
    INTERRUPT_EXIT_REQUESTED.load(Ordering::SeqCst)
}

pub(crate) fn clear_interrupt_exit_request() {
    INTERRUPT_EXIT_REQUESTED.store(false, Ordering::SeqCst);
}

/// Makes `restore` the process wide restore action until the returned guard drops.
pub(crate) fn publish_restore_action(restore: RestoreAction) -> SavedModeGuard {
    let action = Box::into_raw(Box::new(restore));
    let previous = SAVED_MODE_RESTORE.swap(action, Ordering::SeqCst);
    if !previous.is_null() {
        // The earlier guard still owns (and will free) its action.
        tracing::warn!(
            message = "another keyboard handler is already active on this terminal, \
                       the most recent one now owns the saved terminal mode"
        );
    }
    SavedModeGuard { action }
}

/// Owns the published restore action. Dropping it clears the slot (if this action is
/// still the published one) and frees the action.
#[derive(Debug)]
pub(crate) struct SavedModeGuard {
    action: *mut RestoreAction,
}

// SAFETY: the pointee is `Send + Sync` and is only freed by this guard.
unsafe impl Send for SavedModeGuard {}
// SAFETY: the guard exposes no access to the pointee through `&self`.
unsafe impl Sync for SavedModeGuard {}

impl Drop for SavedModeGuard {
    fn drop(&mut self) {
        // A newer guard may have replaced this action already, that's fine.
        let _unused = SAVED_MODE_RESTORE.compare_exchange(
            self.action,
            ptr::null_mut(),
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
        while RESTORES_IN_FLIGHT.load(Ordering::SeqCst) != 0 {
            thread::yield_now();
        }
        // SAFETY: created by `Box::into_raw` in `publish_restore_action`, no longer
        // reachable from the slot, and no restore call is using it.
        drop(unsafe { Box::from_raw(self.action) });
    }
}
