// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use rustix::{fd::BorrowedFd,
             termios::{self, LocalModes, OptionalActions, SpecialCodeIndex, Termios}};
use std::{fmt::{Debug, Formatter, Result as FmtResult},
          io};

use crate::KeyboardHandlerError;

/// The terminal primitives [`UnixKeyboardHandler`](crate::UnixKeyboardHandler) needs.
///
/// [`StdinTerminal`] is the real one. Tests substitute
/// [`FakeTerminal`](crate::test_fixtures::FakeTerminal) or a [`TerminalIoFns`] built
/// from closures.
///
/// [`set_mode`](Self::set_mode) may be called from a signal handler (through the saved
/// restore action), so implementations used with the `SIGINT` hook must not lock or
/// allocate there.
pub trait UnixTerminalIo: Send + Sync + 'static {
    /// Snapshot of the terminal settings.
    type Mode: Clone + Debug + Send + Sync + 'static;

    fn is_terminal(&self) -> bool;

    /// Reads whatever one key press produced. `Ok(0)` means the read timed out.
    ///
    /// # Errors
    ///
    /// Any I/O error. [`io::ErrorKind::Interrupted`] and [`io::ErrorKind::WouldBlock`]
    /// are retried by the caller; anything else stops capture.
    fn read(&self, buffer: &mut [u8]) -> io::Result<usize>;

    /// # Errors
    ///
    /// When the terminal attributes can't be read.
    fn get_mode(&self) -> io::Result<Self::Mode>;

    /// # Errors
    ///
    /// When the terminal attributes can't be applied.
    fn set_mode(&self, mode: &Self::Mode) -> io::Result<()>;

    /// `original` with canonical mode and echo turned off, and reads that return after
    /// at most 100 ms even when no byte arrived.
    fn raw_mode_from(&self, original: &Self::Mode) -> Self::Mode;
}

/// The process's stdin, driven through [`rustix::termios`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinTerminal;

impl StdinTerminal {
    fn fd() -> BorrowedFd<'static> {
        // SAFETY: fd 0 is never closed by this crate, and borrowing it doesn't allocate,
        // which keeps `set_mode` usable from the SIGINT handler.
        unsafe { BorrowedFd::borrow_raw(0) }
    }
}

impl UnixTerminalIo for StdinTerminal {
    type Mode = Termios;

    fn is_terminal(&self) -> bool { termios::isatty(Self::fd()) }

    fn read(&self, buffer: &mut [u8]) -> io::Result<usize> {
        Ok(rustix::io::read(Self::fd(), buffer)?)
    }

    fn get_mode(&self) -> io::Result<Termios> { Ok(termios::tcgetattr(Self::fd())?) }

    fn set_mode(&self, mode: &Termios) -> io::Result<()> {
        Ok(termios::tcsetattr(Self::fd(), OptionalActions::Now, mode)?)
    }

    fn raw_mode_from(&self, original: &Termios) -> Termios {
        // rustix's Termios doesn't implement Copy.
        let mut raw = original.clone();
        raw.local_modes.remove(LocalModes::ICANON | LocalModes::ECHO);
        // Return as soon as one byte is there, or after 1 decisecond without one.
        raw.special_codes[SpecialCodeIndex::VMIN] = 0;
        raw.special_codes[SpecialCodeIndex::VTIME] = 1;
        raw
    }
}

type IsTerminalFn = Box<dyn Fn() -> bool + Send + Sync>;
type ReadFn = Box<dyn Fn(&mut [u8]) -> io::Result<usize> + Send + Sync>;
type GetModeFn<M> = Box<dyn Fn() -> io::Result<M> + Send + Sync>;
type SetModeFn<M> = Box<dyn Fn(&M) -> io::Result<()> + Send + Sync>;
type RawModeFn<M> = Box<dyn Fn(&M) -> M + Send + Sync>;

/// A [`UnixTerminalIo`] assembled from closures, for callers that want to drive the
/// handler from something other than stdin. Build one with [`TerminalIoFns::builder`].
pub struct TerminalIoFns<M> {
    is_terminal: IsTerminalFn,
    read: ReadFn,
    get_mode: GetModeFn<M>,
    set_mode: SetModeFn<M>,
    raw_mode_from: Option<RawModeFn<M>>,
}

impl<M> Debug for TerminalIoFns<M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TerminalIoFns")
            .field("has_raw_mode_from", &self.raw_mode_from.is_some())
            .finish_non_exhaustive()
    }
}

impl<M> TerminalIoFns<M> {
    #[must_use]
    pub fn builder() -> TerminalIoFnsBuilder<M> { TerminalIoFnsBuilder::default() }
}

impl<M: Clone + Debug + Send + Sync + 'static> UnixTerminalIo for TerminalIoFns<M> {
    type Mode = M;

    fn is_terminal(&self) -> bool { (self.is_terminal)() }

    fn read(&self, buffer: &mut [u8]) -> io::Result<usize> { (self.read)(buffer) }

    fn get_mode(&self) -> io::Result<M> { (self.get_mode)() }

    fn set_mode(&self, mode: &M) -> io::Result<()> { (self.set_mode)(mode) }

    /// Without a `raw_mode_from` closure the mode is passed through unchanged.
    fn raw_mode_from(&self, original: &M) -> M {
        match &self.raw_mode_from {
            Some(raw_mode_from) => raw_mode_from(original),
            None => original.clone(),
        }
    }
}

/// Collects the closures for a [`TerminalIoFns`]. `is_terminal`, `read`, `get_mode` and
/// `set_mode` are required.
pub struct TerminalIoFnsBuilder<M> {
    is_terminal: Option<IsTerminalFn>,
    read: Option<ReadFn>,
    get_mode: Option<GetModeFn<M>>,
    set_mode: Option<SetModeFn<M>>,
    raw_mode_from: Option<RawModeFn<M>>,
}

impl<M> Default for TerminalIoFnsBuilder<M> {
    fn default() -> Self {
        Self {
            is_terminal: None,
            read: None,
            get_mode: None,
            set_mode: None,
            raw_mode_from: None,
        }
    }
}

impl<M> Debug for TerminalIoFnsBuilder<M> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("TerminalIoFnsBuilder")
            .field("is_terminal", &self.is_terminal.is_some())
            .field("read", &self.read.is_some())
            .field("get_mode", &self.get_mode.is_some())
            .field("set_mode", &self.set_mode.is_some())
            .field("raw_mode_from", &self.raw_mode_from.is_some())
            .finish()
    }
}

impl<M> TerminalIoFnsBuilder<M> {
    #[must_use]
    pub fn is_terminal(mut self, f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.is_terminal = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn read(
        mut self,
        f: impl Fn(&mut [u8]) -> io::Result<usize> + Send + Sync + 'static,
    ) -> Self {
        self.read = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn get_mode(mut self, f: impl Fn() -> io::Result<M> + Send + Sync + 'static) -> Self {
        self.get_mode = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn set_mode(
        mut self,
        f: impl Fn(&M) -> io::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.set_mode = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn raw_mode_from(mut self, f: impl Fn(&M) -> M + Send + Sync + 'static) -> Self {
        self.raw_mode_from = Some(Box::new(f));
        self
    }

    /// # Errors
    ///
    /// [`KeyboardHandlerError::MissingPrimitive`] naming the first required closure that
    /// was not set.
    pub fn build(self) -> Result<TerminalIoFns<M>, KeyboardHandlerError> {
        fn require<T>(it: Option<T>, primitive: &'static str) -> Result<T, KeyboardHandlerError> {
            it.ok_or(KeyboardHandlerError::MissingPrimitive { primitive })
        }

        Ok(TerminalIoFns {
            is_terminal: require(self.is_terminal, "is_terminal")?,
            read: require(self.read, "read")?,
            get_mode: require(self.get_mode, "get_mode")?,
            set_mode: require(self.set_mode, "set_mode")?,
            raw_mode_from: self.raw_mode_from,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn complete_builder() -> TerminalIoFnsBuilder<u8> {
        TerminalIoFns::builder()
            .is_terminal(|| true)
            .read(|_| Ok(0))
            .get_mode(|| Ok(7))
            .set_mode(|_| Ok(()))
    }

    #[test_case("is_terminal")]
    #[test_case("read")]
    #[test_case("get_mode")]
    #[test_case("set_mode")]
    fn test_missing_primitive_is_reported_by_name(missing: &str) {
        let mut builder = complete_builder();
        match missing {
            "is_terminal" => builder.is_terminal = None,
            "read" => builder.read = None,
            "get_mode" => builder.get_mode = None,
            _ => builder.set_mode = None,
        }

        let error = builder.build().unwrap_err();
        assert!(error.is_configuration_error());
        assert!(matches!(
            error,
            KeyboardHandlerError::MissingPrimitive { primitive } if primitive == missing
        ));
    }

    #[test]
    fn test_raw_mode_defaults_to_identity() {
        let device = complete_builder().build().unwrap();
        assert_eq!(device.raw_mode_from(&7), 7);

        let device = complete_builder().raw_mode_from(|m| m + 1).build().unwrap();
        assert_eq!(device.raw_mode_from(&7), 8);
        assert_eq!(device.get_mode().unwrap(), 7);
    }

    /// Only meaningful when the test runner's stdin is a terminal.
    #[test]
    fn test_stdin_raw_mode_clears_canonical_and_echo() {
        let stdin = StdinTerminal;
        if !stdin.is_terminal() {
            return;
        }
        let original = stdin.get_mode().unwrap();
        let raw = stdin.raw_mode_from(&original);
        assert!(!raw.local_modes.contains(LocalModes::ICANON));
        assert!(!raw.local_modes.contains(LocalModes::ECHO));
        assert_eq!(raw.special_codes[SpecialCodeIndex::VMIN], 0);
        assert_eq!(raw.special_codes[SpecialCodeIndex::VTIME], 1);
    }
}
