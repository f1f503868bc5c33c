// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words termios ICANON VMIN VTIME sigaction

//! Unix controller: puts stdin in non-canonical, no-echo mode with a 100 ms read timeout
//! and reads key presses on a background thread.
//!
//! The terminal mode and the `SIGINT` disposition are process wide, so the saved values
//! live in [`process_global`] statics rather than in the handler. Only one handler should
//! be active per terminal at a time.

// Private modules (hide internal structure).
mod interrupt_hook;
mod process_global;
mod terminal_io;
mod unix_keyboard_handler;

// Re-export.
pub use process_global::restore_buffer_mode_for_stdin;
pub use terminal_io::*;
pub use unix_keyboard_handler::*;
