// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Test doubles for the device seams, plus helpers shared by unit and integration tests.

// Private modules (hide internal structure).
mod fake_console;
mod key_press_recorder;
mod wait_until;

#[cfg(unix)]
mod fake_terminal;

// Re-export.
pub use fake_console::*;
pub use key_press_recorder::*;
pub use wait_until::*;

#[cfg(unix)]
pub use fake_terminal::*;
