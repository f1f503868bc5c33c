// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words termios kbhit getch

//! # keyboard_handler
//!
//! Capture raw key presses from a POSIX terminal or a Windows console, decode them into
//! a [`KeyCode`] plus [`KeyModifiers`], and dispatch them to callbacks registered for
//! that exact pair.
//!
//! ```no_run
//! use keyboard_handler::{KeyCode, KeyModifiers, KeyboardHandler, KeyboardHandlerApi};
//!
//! # fn main() -> miette::Result<()> {
//! let handler = KeyboardHandler::new()?;
//! let handle = handler.add_key_press_callback(
//!     |key_code, modifiers| println!("{modifiers} + {key_code}"),
//!     KeyCode::A,
//!     KeyModifiers::CTRL,
//! );
//! // ...
//! handler.delete_key_press_callback(handle);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! ```text
//! capture thread ──► read raw unit ──► decoder ──► (KeyCode, KeyModifiers)
//!                                                     │
//!                         callback registry (locked) ◄┘ ──► callbacks
//! ```
//!
//! - [`key_identity`] holds the pure value types.
//! - [`callback_registry`] maps `(KeyCode, KeyModifiers)` to callbacks behind
//!   [`CallbackHandle`]s.
//! - [`decoder`] turns terminal byte sequences ([`UnixKeyDecoder`]) and console code pairs
//!   ([`WindowsKeyDecoder`]) into key presses.
//! - [`handler`] owns device mode switching, the capture thread, and teardown. On Unix it
//!   also installs a `SIGINT` hook that puts the terminal back the way it found it.
//! - [`log`] sets up `tracing` output for binaries that embed the handler.
//!
//! When stdin is not a terminal (piped input, CI harnesses) the handler comes up
//! [`HandlerState::Disabled`]: construction succeeds but no callbacks can be registered.

// Enforce strict error handling in production library code only. Tests are allowed to
// use .unwrap() (workspace `Cargo.toml` config allows it).
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach modules.
pub mod callback_registry;
pub mod decoder;
pub mod handler;
pub mod key_identity;
pub mod log;
pub mod test_fixtures;

// Re-export the public API (flat, ergonomic surface).
pub use callback_registry::*;
pub use decoder::*;
pub use handler::*;
pub use key_identity::*;
pub use log::*;
