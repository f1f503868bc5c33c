// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{collections::VecDeque,
          io,
          sync::{Arc, Mutex, MutexGuard, PoisonError,
                 atomic::{AtomicBool, AtomicUsize, Ordering}}};

use crate::{WinKeyCode, WindowsConsoleIo};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptedCode {
    Code { code: i32, alt_pressed: bool },
    Error(io::ErrorKind),
}

#[derive(Debug)]
struct FakeConsoleState {
    is_terminal: bool,
    scripted_codes: Mutex<VecDeque<ScriptedCode>>,
    alt_pressed: AtomicBool,
    key_hit_count: AtomicUsize,
}

/// Scriptable [`WindowsConsoleIo`]. Clones share state.
///
/// [`FakeConsole::push_key`] queues the one or two codes of a key press; ALT reads as
/// held while the codes of a key pushed with `alt_pressed` are being consumed.
#[derive(Debug, Clone)]
pub struct FakeConsole {
    state: Arc<FakeConsoleState>,
}

impl Default for FakeConsole {
    fn default() -> Self { Self::new() }
}

impl FakeConsole {
    #[must_use]
    pub fn new() -> Self { Self::with_terminal(true) }

    #[must_use]
    pub fn not_a_terminal() -> Self { Self::with_terminal(false) }

    fn with_terminal(is_terminal: bool) -> Self {
        Self {
            state: Arc::new(FakeConsoleState {
                is_terminal,
                scripted_codes: Mutex::new(VecDeque::new()),
                alt_pressed: AtomicBool::new(false),
                key_hit_count: AtomicUsize::new(0),
            }),
        }
    }

    fn codes(&self) -> MutexGuard<'_, VecDeque<ScriptedCode>> {
        self.state
            .scripted_codes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push_key(&self, code: WinKeyCode, alt_pressed: bool) {
        let mut codes = self.codes();
        codes.push_back(ScriptedCode::Code {
            code: code.first,
            alt_pressed,
        });
        if code.second != WinKeyCode::NOT_A_KEY {
            codes.push_back(ScriptedCode::Code {
                code: code.second,
                alt_pressed,
            });
        }
    }

    pub fn push_error(&self, kind: io::ErrorKind) {
        self.codes().push_back(ScriptedCode::Error(kind));
    }

    #[must_use]
    pub fn pending_codes(&self) -> usize { self.codes().len() }

    #[must_use]
    pub fn key_hit_count(&self) -> usize { self.state.key_hit_count.load(Ordering::SeqCst) }
}

impl WindowsConsoleIo for FakeConsole {
    fn is_terminal(&self) -> bool { self.state.is_terminal }

    fn key_hit(&self) -> bool {
        self.state.key_hit_count.fetch_add(1, Ordering::SeqCst);
        !self.codes().is_empty()
    }

    fn read_char(&self) -> io::Result<i32> {
        let next = self.codes().pop_front();
        match next {
            Some(ScriptedCode::Code { code, alt_pressed }) => {
                self.state.alt_pressed.store(alt_pressed, Ordering::SeqCst);
                Ok(code)
            }
            Some(ScriptedCode::Error(kind)) => Err(io::Error::from(kind)),
            None => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "read_char called with no key waiting",
            )),
        }
    }

    fn is_alt_pressed(&self) -> bool { self.state.alt_pressed.load(Ordering::SeqCst) }
}
