// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words termios kbhit getch

//! Platform controllers that own the input device while they are alive.
//!
//! # Lifecycle
//!
//! ```text
//!            ┌─ stdin is not a terminal ─► Disabled (no thread, add() refused)
//! construct ─┤
//!            └─ save mode ─► [SIGINT hook] ─► raw mode ─► spawn capture thread ─► Active
//!
//! drop ─► [restore SIGINT] ─► set exit flag ─► join ─► log fault ─► forget saved mode
//! ```
//!
//! Failures on the `Active` path (reading or writing the mode, installing the hook,
//! spawning the thread) abort construction with a [`KeyboardHandlerError`]. Failures
//! inside the capture thread are kept as a [`CaptureFault`] and only logged on drop.
//!
//! | Platform | Controller                  | Device seam           |
//! |----------|-----------------------------|-----------------------|
//! | Unix     | [`UnixKeyboardHandler`]     | [`UnixTerminalIo`]    |
//! | Windows  | [`WindowsKeyboardHandler`]  | [`WindowsConsoleIo`]  |
//!
//! [`KeyboardHandler`] names the controller for the current platform, bound to the real
//! stdin or console.

// Private modules (hide internal structure).
mod capture_support;
mod handler_api;
mod handler_error;
mod handler_options;
mod windows;

#[cfg(unix)]
mod unix;

// Re-export.
pub use handler_api::*;
pub use handler_error::*;
pub use handler_options::*;
pub use windows::*;

#[cfg(unix)]
pub use unix::*;

/// The keyboard handler for this platform, reading from the process's stdin.
#[cfg(unix)]
pub type KeyboardHandler = UnixKeyboardHandler<StdinTerminal>;

/// The keyboard handler for this platform, reading from the process's console.
#[cfg(windows)]
pub type KeyboardHandler = WindowsKeyboardHandler<StdConsole>;
