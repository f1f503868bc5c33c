// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{collections::VecDeque,
          io,
          sync::{Arc, Mutex, MutexGuard, PoisonError,
                 atomic::{AtomicUsize, Ordering}},
          thread,
          time::Duration};

use crate::UnixTerminalIo;

/// How long an empty script makes [`FakeTerminal::read`] wait before timing out.
pub const FAKE_READ_TIMEOUT: Duration = Duration::from_millis(10);

/// Terminal settings a [`FakeTerminal`] keeps track of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FakeTerminalMode {
    pub canonical: bool,
    pub echo: bool,
    pub min_bytes: u8,
    pub timeout_deciseconds: u8,
}

impl FakeTerminalMode {
    /// A terminal as a shell leaves it.
    #[must_use]
    pub fn cooked() -> Self {
        Self {
            canonical: true,
            echo: true,
            min_bytes: 1,
            timeout_deciseconds: 0,
        }
    }

    /// What the handler asks for.
    #[must_use]
    pub fn raw(&self) -> Self {
        let mut raw = *self;
        raw.canonical = false;
        raw.echo = false;
        raw.min_bytes = 0;
        raw.timeout_deciseconds = 1;
        raw
    }
}

/// One scripted result of [`FakeTerminal::read`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeRead {
    Bytes(Vec<u8>),
    Error(io::ErrorKind),
}

#[derive(Debug)]
struct FakeTerminalState {
    is_terminal: bool,
    fail_get_mode: bool,
    fail_set_mode: bool,
    current_mode: Mutex<FakeTerminalMode>,
    set_mode_calls: Mutex<Vec<FakeTerminalMode>>,
    scripted_reads: Mutex<VecDeque<FakeRead>>,
    read_count: AtomicUsize,
}

/// Scriptable [`UnixTerminalIo`]. Clones share state, so a test can keep one clone to
/// feed reads and inspect recorded mode changes while the handler owns another.
///
/// Reads pop the script. With an empty script a read sleeps [`FAKE_READ_TIMEOUT`] and
/// returns `Ok(0)`, like a terminal with `VTIME` set.
#[derive(Debug, Clone)]
pub struct FakeTerminal {
    state: Arc<FakeTerminalState>,
}

impl Default for FakeTerminal {
    fn default() -> Self { Self::new() }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl FakeTerminal {
    #[must_use]
    pub fn new() -> Self { Self::with_flags(true, false, false) }

    #[must_use]
    pub fn not_a_terminal() -> Self { Self::with_flags(false, false, false) }

    #[must_use]
    pub fn failing_get_mode(self) -> Self {
        Self::with_flags(self.state.is_terminal, true, self.state.fail_set_mode)
    }

    #[must_use]
    pub fn failing_set_mode(self) -> Self {
        Self::with_flags(self.state.is_terminal, self.state.fail_get_mode, true)
    }

    fn with_flags(is_terminal: bool, fail_get_mode: bool, fail_set_mode: bool) -> Self {
        Self {
            state: Arc::new(FakeTerminalState {
                is_terminal,
                fail_get_mode,
                fail_set_mode,
                current_mode: Mutex::new(FakeTerminalMode::cooked()),
                set_mode_calls: Mutex::new(vec![]),
                scripted_reads: Mutex::new(VecDeque::new()),
                read_count: AtomicUsize::new(0),
            }),
        }
    }

    pub fn push_read(&self, read: FakeRead) { lock(&self.state.scripted_reads).push_back(read); }

    #[must_use]
    pub fn pending_reads(&self) -> usize { lock(&self.state.scripted_reads).len() }

    /// Every mode passed to `set_mode`, failed attempts included, oldest first.
    #[must_use]
    pub fn set_mode_calls(&self) -> Vec<FakeTerminalMode> {
        lock(&self.state.set_mode_calls).clone()
    }

    #[must_use]
    pub fn current_mode(&self) -> FakeTerminalMode { *lock(&self.state.current_mode) }

    #[must_use]
    pub fn read_count(&self) -> usize { self.state.read_count.load(Ordering::SeqCst) }
}

impl UnixTerminalIo for FakeTerminal {
    type Mode = FakeTerminalMode;

    fn is_terminal(&self) -> bool { self.state.is_terminal }

    fn read(&self, buffer: &mut [u8]) -> io::Result<usize> {
        self.state.read_count.fetch_add(1, Ordering::SeqCst);
        let next = lock(&self.state.scripted_reads).pop_front();
        match next {
            Some(FakeRead::Bytes(bytes)) => {
                let count = bytes.len().min(buffer.len());
                buffer[..count].copy_from_slice(&bytes[..count]);
                Ok(count)
            }
            Some(FakeRead::Error(kind)) => Err(io::Error::from(kind)),
            None => {
                thread::sleep(FAKE_READ_TIMEOUT);
                Ok(0)
            }
        }
    }

    fn get_mode(&self) -> io::Result<FakeTerminalMode> {
        if self.state.fail_get_mode {
            return Err(io::Error::other("tcgetattr failed"));
        }
        Ok(self.current_mode())
    }

    fn set_mode(&self, mode: &FakeTerminalMode) -> io::Result<()> {
        lock(&self.state.set_mode_calls).push(*mode);
        if self.state.fail_set_mode {
            return Err(io::Error::other("tcsetattr failed"));
        }
        *lock(&self.state.current_mode) = *mode;
        Ok(())
    }

    fn raw_mode_from(&self, original: &FakeTerminalMode) -> FakeTerminalMode { original.raw() }
}
