// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Pieces shared by the Unix and Windows capture loops.

use std::{panic::{AssertUnwindSafe, catch_unwind},
          sync::{Arc,
                 atomic::{AtomicBool, Ordering}},
          thread::{self, JoinHandle}};

use miette::Diagnostic;

use super::handler_error::{error_chain, panic_message};
use crate::{CallbackRegistry, CaptureFault, KeyAndModifiers};

/// Flip to `true` to trace every decoded key press.
pub(crate) const DEBUG_KEYBOARD_HANDLER: bool = false;

pub(crate) const CAPTURE_THREAD_NAME: &str = "keyboard-handler-capture";

/// What the capture loop does after one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Continuation {
    Continue,
    Stop,
}

/// Runs the callbacks for `key`. A panic in any of them stops the capture loop instead of
/// unwinding through it.
pub(crate) fn dispatch_key_press(
    registry: &CallbackRegistry,
    key: KeyAndModifiers,
) -> Result<(), CaptureFault> {
    let result = catch_unwind(AssertUnwindSafe(|| {
        registry.dispatch(key.key_code, key.modifiers)
    }));

    match result {
        Ok(invoked) => {
            DEBUG_KEYBOARD_HANDLER.then(|| {
                tracing::debug!(message = "dispatched key press", key = %key, invoked);
            });
            Ok(())
        }
        Err(payload) => Err(CaptureFault::CallbackPanicked {
            message: panic_message(payload.as_ref()),
        }),
    }
}

/// The join handle of a running capture thread, plus the flag that asks it to stop.
#[derive(Debug)]
pub(crate) struct CaptureThread {
    exit_requested: Arc<AtomicBool>,
    join_handle: JoinHandle<Option<CaptureFault>>,
}

impl CaptureThread {
    /// Spawns `run`, which receives the exit flag and returns the fault (if any) that
    /// ended it.
    pub(crate) fn spawn(
        run: impl FnOnce(Arc<AtomicBool>) -> Option<CaptureFault> + Send + 'static,
    ) -> std::io::Result<Self> {
        let exit_requested = Arc::new(AtomicBool::new(false));
        let exit_requested_clone = Arc::clone(&exit_requested);
        let join_handle = thread::Builder::new()
            .name(CAPTURE_THREAD_NAME.into())
            .spawn(move || run(exit_requested_clone))?;
        Ok(Self {
            exit_requested,
            join_handle,
        })
    }

    /// Asks the thread to stop, waits for it, and logs the fault it reports.
    pub(crate) fn stop_and_join(self) {
        self.exit_requested.store(true, Ordering::SeqCst);
        match self.join_handle.join() {
            Ok(None) => {
                DEBUG_KEYBOARD_HANDLER.then(|| {
                    tracing::debug!(message = "capture thread stopped cleanly");
                });
            }
            Ok(Some(fault)) => {
                tracing::error!(
                    message = "keyboard handler capture thread stopped with a fault",
                    error = %error_chain(&fault),
                    code = %fault.code().map(|it| it.to_string()).unwrap_or_default()
                );
            }
            Err(payload) => {
                tracing::error!(
                    message = "keyboard handler capture thread panicked",
                    panic = %panic_message(payload.as_ref())
                );
            }
        }
    }
}
