// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use miette::Diagnostic;
use std::{any::Any, error::Error, io};

/// Why a keyboard handler could not be constructed.
///
/// Stdin not being a terminal is not one of these. That case yields a handler in
/// [`HandlerState::Disabled`](crate::HandlerState::Disabled).
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum KeyboardHandlerError {
    /// A device built from closures is missing one of them. This is a programming error.
    #[error("No `{primitive}` primitive was provided for the input device")]
    #[diagnostic(
        code(keyboard_handler::config::missing_primitive),
        help("Set every required primitive on the builder before calling `build()`")
    )]
    MissingPrimitive { primitive: &'static str },

    #[error("Failed to read the terminal mode of stdin")]
    #[diagnostic(code(keyboard_handler::device::get_mode))]
    GetMode(#[source] io::Error),

    #[error("Failed to switch stdin to non-canonical, no-echo mode")]
    #[diagnostic(code(keyboard_handler::device::set_mode))]
    SetMode(#[source] io::Error),

    #[error("Failed to install the SIGINT handler")]
    #[diagnostic(
        code(keyboard_handler::device::interrupt_hook),
        help("Pass `install_signal_handler: false` and call `restore_buffer_mode_for_stdin()` from your own handler")
    )]
    InstallInterruptHook(#[source] io::Error),

    #[error("Failed to spawn the key press capture thread")]
    #[diagnostic(code(keyboard_handler::thread::spawn))]
    SpawnThread(#[source] io::Error),
}

impl KeyboardHandlerError {
    /// `true` for mistakes in how the handler was put together, `false` for failures
    /// reported by the OS.
    #[must_use]
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::MissingPrimitive { .. })
    }
}

/// Why the capture thread stopped before it was asked to. Never returned to callers;
/// the handler logs it when it is dropped.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum CaptureFault {
    #[error("Failed to read key presses from the input device")]
    #[diagnostic(code(keyboard_handler::capture::read))]
    Read(#[source] io::Error),

    #[error("Failed to restore the terminal mode after capture stopped")]
    #[diagnostic(code(keyboard_handler::capture::restore))]
    Restore(#[source] io::Error),

    #[error("A key press callback panicked: {message}")]
    #[diagnostic(
        code(keyboard_handler::capture::callback_panicked),
        help("Callbacks run on the capture thread; a panic there stops all key handling")
    )]
    CallbackPanicked { message: String },
}

/// `error` followed by each of its sources, joined with `": "`.
pub(crate) fn error_chain(error: &dyn Error) -> String {
    let mut acc = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        acc.push_str(": ");
        acc.push_str(&cause.to_string());
        source = cause.source();
    }
    acc
}

/// Text of a panic payload, for the two payload types `panic!` produces.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::panic::catch_unwind;

    #[test]
    fn test_panic_message_from_str_and_string() {
        let payload = catch_unwind(|| -> i32 { panic!("static text") }).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "static text");

        let value = 42;
        let payload = catch_unwind(|| -> i32 { panic!("formatted {value}") }).unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "formatted 42");
    }

    #[test]
    fn test_configuration_errors_are_told_apart() {
        assert!(
            KeyboardHandlerError::MissingPrimitive { primitive: "read" }
                .is_configuration_error()
        );
        assert!(
            !KeyboardHandlerError::GetMode(io::Error::other("nope")).is_configuration_error()
        );
    }

    #[test]
    fn test_error_chain_includes_io_source() {
        let fault = CaptureFault::Read(io::Error::from(io::ErrorKind::BrokenPipe));
        assert_eq!(
            error_chain(&fault),
            "Failed to read key presses from the input device: broken pipe"
        );
    }

    #[test]
    fn test_error_display() {
        let error = KeyboardHandlerError::MissingPrimitive { primitive: "get_mode" };
        assert_eq!(
            error.to_string(),
            "No `get_mode` primitive was provided for the input device"
        );
    }
}
