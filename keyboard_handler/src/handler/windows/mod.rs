// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words kbhit getch

//! Windows controller: polls the console with `_kbhit`, reads codes with `_getch`, and
//! samples the ALT key separately. The console mode is never changed, so there is
//! nothing to restore.
//!
//! Only [`StdConsole`] is Windows specific. The controller itself is generic over
//! [`WindowsConsoleIo`] and builds everywhere.

// Private modules (hide internal structure).
mod console_io;
mod windows_keyboard_handler;

// Re-export.
pub use console_io::*;
pub use windows_keyboard_handler::*;
