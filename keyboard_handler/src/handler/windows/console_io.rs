// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words kbhit getch

use std::{fmt::{Debug, Formatter, Result as FmtResult},
          io};

use crate::KeyboardHandlerError;

/// The console primitives [`WindowsKeyboardHandler`](crate::WindowsKeyboardHandler)
/// needs.
pub trait WindowsConsoleIo: Send + Sync + 'static {
    fn is_terminal(&self) -> bool;

    /// Whether a key press is waiting. Must not block.
    fn key_hit(&self) -> bool;

    /// Next code of the waiting key press.
    ///
    /// # Errors
    ///
    /// Any error stops capture.
    fn read_char(&self) -> io::Result<i32>;

    /// Whether ALT is held right now.
    fn is_alt_pressed(&self) -> bool;
}

/// The process's console, through the C runtime and `GetAsyncKeyState`.
#[cfg(windows)]
#[derive(Debug, Clone, Copy, Default)]
pub struct StdConsole;

#[cfg(windows)]
unsafe extern "C" {
    fn _kbhit() -> std::ffi::c_int;
    fn _getch() -> std::ffi::c_int;
}

#[cfg(windows)]
impl WindowsConsoleIo for StdConsole {
    fn is_terminal(&self) -> bool { std::io::IsTerminal::is_terminal(&io::stdin()) }

    fn key_hit(&self) -> bool {
        // SAFETY: CRT console query with no arguments.
        unsafe { _kbhit() != 0 }
    }

    fn read_char(&self) -> io::Result<i32> {
        // SAFETY: CRT console read with no arguments, only called after `_kbhit`.
        Ok(unsafe { _getch() })
    }

    fn is_alt_pressed(&self) -> bool {
        use ::windows::Win32::UI::Input::KeyboardAndMouse::{GetAsyncKeyState, VK_MENU};
        // SAFETY: reads global key state, no pointers involved.
        let state = unsafe { GetAsyncKeyState(i32::from(VK_MENU.0)) };
        // Most significant bit set means the key is down.
        state < 0
    }
}

type IsTerminalFn = Box<dyn Fn() -> bool + Send + Sync>;
type KeyHitFn = Box<dyn Fn() -> bool + Send + Sync>;
type ReadCharFn = Box<dyn Fn() -> io::Result<i32> + Send + Sync>;
type IsAltPressedFn = Box<dyn Fn() -> bool + Send + Sync>;

/// A [`WindowsConsoleIo`] assembled from closures. Build one with
/// [`ConsoleIoFns::builder`].
pub struct ConsoleIoFns {
    is_terminal: IsTerminalFn,
    key_hit: KeyHitFn,
    read_char: ReadCharFn,
    is_alt_pressed: Option<IsAltPressedFn>,
}

impl Debug for ConsoleIoFns {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ConsoleIoFns")
            .field("has_is_alt_pressed", &self.is_alt_pressed.is_some())
            .finish_non_exhaustive()
    }
}

impl ConsoleIoFns {
    #[must_use]
    pub fn builder() -> ConsoleIoFnsBuilder { ConsoleIoFnsBuilder::default() }
}

impl WindowsConsoleIo for ConsoleIoFns {
    fn is_terminal(&self) -> bool { (self.is_terminal)() }

    fn key_hit(&self) -> bool { (self.key_hit)() }

    fn read_char(&self) -> io::Result<i32> { (self.read_char)() }

    /// Without an `is_alt_pressed` closure ALT is never reported.
    fn is_alt_pressed(&self) -> bool { self.is_alt_pressed.as_ref().is_some_and(|f| f()) }
}

/// Collects the closures for a [`ConsoleIoFns`]. `is_terminal`, `key_hit` and
/// `read_char` are required.
#[derive(Default)]
pub struct ConsoleIoFnsBuilder {
    is_terminal: Option<IsTerminalFn>,
    key_hit: Option<KeyHitFn>,
    read_char: Option<ReadCharFn>,
    is_alt_pressed: Option<IsAltPressedFn>,
}

impl Debug for ConsoleIoFnsBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ConsoleIoFnsBuilder")
            .field("is_terminal", &self.is_terminal.is_some())
            .field("key_hit", &self.key_hit.is_some())
            .field("read_char", &self.read_char.is_some())
            .field("is_alt_pressed", &self.is_alt_pressed.is_some())
            .finish()
    }
}

impl ConsoleIoFnsBuilder {
    #[must_use]
    pub fn is_terminal(mut self, f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.is_terminal = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn key_hit(mut self, f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.key_hit = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn read_char(mut self, f: impl Fn() -> io::Result<i32> + Send + Sync + 'static) -> Self {
        self.read_char = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn is_alt_pressed(mut self, f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.is_alt_pressed = Some(Box::new(f));
        self
    }

    /// # Errors
    ///
    /// [`KeyboardHandlerError::MissingPrimitive`] naming the first required closure that
    /// was not set.
    pub fn build(self) -> Result<ConsoleIoFns, KeyboardHandlerError> {
        Ok(ConsoleIoFns {
            is_terminal: self
                .is_terminal
                .ok_or(KeyboardHandlerError::MissingPrimitive { primitive: "is_terminal" })?,
            key_hit: self
                .key_hit
                .ok_or(KeyboardHandlerError::MissingPrimitive { primitive: "key_hit" })?,
            read_char: self
                .read_char
                .ok_or(KeyboardHandlerError::MissingPrimitive { primitive: "read_char" })?,
            is_alt_pressed: self.is_alt_pressed,
        })
    }
}
