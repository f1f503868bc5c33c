// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt::{Debug, Formatter, Result as FmtResult},
          marker::PhantomData,
          sync::{Arc,
                 atomic::{AtomicBool, Ordering}},
          thread,
          time::Duration};

use super::console_io::WindowsConsoleIo;
use crate::{CallbackHandle, CallbackRegistry, CaptureFault, HandlerState, KeyCode,
            KeyDecoder, KeyModifiers, KeyPressCallback, KeyboardHandlerApi,
            KeyboardHandlerError, KeyboardHandlerOptions, WinKeyCode, WindowsKeyDecoder,
            WindowsRawInput,
            handler::{capture_support::{CaptureThread, DEBUG_KEYBOARD_HANDLER,
                                        dispatch_key_press},
                      handler_api::add_if_active}};

/// Keyboard handler for a Windows console.
///
/// While [`HandlerState::Active`], a thread named `keyboard-handler-capture` polls the
/// console, sleeping [`KeyboardHandlerOptions::console_poll_interval`] whenever no key is
/// waiting. Each key press is decoded with [`WindowsKeyDecoder`] and handed to the
/// callbacks registered for the result.
pub struct WindowsKeyboardHandler<D: WindowsConsoleIo> {
    registry: Arc<CallbackRegistry>,
    decoder: Arc<WindowsKeyDecoder>,
    state: HandlerState,
    capture_thread: Option<CaptureThread>,
    _device: PhantomData<fn() -> D>,
}

impl<D: WindowsConsoleIo> Debug for WindowsKeyboardHandler<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("WindowsKeyboardHandler")
            .field("state", &self.state)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

#[cfg(windows)]
impl WindowsKeyboardHandler<super::StdConsole> {
    /// Binds to the process's console.
    ///
    /// # Errors
    ///
    /// See [`WindowsKeyboardHandler::with_console_io`].
    pub fn new() -> Result<Self, KeyboardHandlerError> {
        Self::with_options(KeyboardHandlerOptions::default())
    }

    /// # Errors
    ///
    /// See [`WindowsKeyboardHandler::with_console_io`].
    pub fn with_options(
        options: impl Into<KeyboardHandlerOptions>,
    ) -> Result<Self, KeyboardHandlerError> {
        Self::with_console_io(super::StdConsole, options)
    }
}

impl<D: WindowsConsoleIo> WindowsKeyboardHandler<D> {
    /// Starts polling `device`, or returns the handler [`HandlerState::Disabled`] when
    /// `device` is not an interactive console.
    ///
    /// # Errors
    ///
    /// [`KeyboardHandlerError::SpawnThread`] when the capture thread can't start.
    pub fn with_console_io(
        device: D,
        options: impl Into<KeyboardHandlerOptions>,
    ) -> Result<Self, KeyboardHandlerError> {
        let options = options.into();

        let mut handler = Self {
            registry: Arc::new(CallbackRegistry::new()),
            decoder: Arc::new(WindowsKeyDecoder::new()),
            state: HandlerState::Disabled,
            capture_thread: None,
            _device: PhantomData,
        };

        if !device.is_terminal() {
            tracing::warn!(
                message = "stdin is not a console, keyboard handler is disabled"
            );
            return Ok(handler);
        }

        let capture_loop = CaptureLoop {
            device,
            decoder: Arc::clone(&handler.decoder),
            registry: Arc::clone(&handler.registry),
            poll_interval: options.console_poll_interval,
        };
        handler.capture_thread = Some(
            CaptureThread::spawn(move |exit_requested| capture_loop.run(&exit_requested))
                .map_err(KeyboardHandlerError::SpawnThread)?,
        );

        handler.state = HandlerState::Active;
        Ok(handler)
    }

    /// The codes the console produces for `key_code` with no modifiers held.
    #[must_use]
    pub fn win_key_code(&self, key_code: KeyCode) -> Option<WinKeyCode> {
        self.decoder.win_key_code(key_code)
    }

    /// Table lookup of `code`, without modifier inference.
    #[must_use]
    pub fn key_code_for_win_code(&self, code: WinKeyCode) -> KeyCode {
        self.decoder.lookup(&code.into())
    }
}

impl<D: WindowsConsoleIo> KeyboardHandlerApi for WindowsKeyboardHandler<D> {
    fn state(&self) -> HandlerState { self.state }

    fn add_boxed_key_press_callback(
        &self,
        callback: Option<KeyPressCallback>,
        key_code: KeyCode,
        modifiers: KeyModifiers,
    ) -> CallbackHandle {
        add_if_active(&self.registry, self.state, callback, key_code, modifiers)
    }

    fn delete_key_press_callback(&self, handle: CallbackHandle) { self.registry.delete(handle); }

    fn callback_count(&self) -> usize { self.registry.len() }
}

impl<D: WindowsConsoleIo> Drop for WindowsKeyboardHandler<D> {
    fn drop(&mut self) {
        if let Some(capture_thread) = self.capture_thread.take() {
            capture_thread.stop_and_join();
        }
    }
}

struct CaptureLoop<D: WindowsConsoleIo> {
    device: D,
    decoder: Arc<WindowsKeyDecoder>,
    registry: Arc<CallbackRegistry>,
    poll_interval: Duration,
}

impl<D: WindowsConsoleIo> CaptureLoop<D> {
    fn run(self, exit_requested: &AtomicBool) -> Option<CaptureFault> {
        while !exit_requested.load(Ordering::SeqCst) {
            if let Err(fault) = self.capture_once() {
                return Some(fault);
            }
        }
        None
    }

    fn capture_once(&self) -> Result<(), CaptureFault> {
        if !self.device.key_hit() {
            thread::sleep(self.poll_interval);
            return Ok(());
        }

        let first = self.device.read_char().map_err(CaptureFault::Read)?;
        let second = if WinKeyCode::is_prefix(first) {
            self.device.read_char().map_err(CaptureFault::Read)?
        } else {
            WinKeyCode::NOT_A_KEY
        };

        let raw = WindowsRawInput {
            code: WinKeyCode::pair(first, second),
            alt_pressed: self.device.is_alt_pressed(),
        };
        let key = self.decoder.decode(&raw);

        DEBUG_KEYBOARD_HANDLER.then(|| {
            tracing::debug!(message = "decoded key press", codes = %raw.code, key = %key);
        });

        dispatch_key_press(&self.registry, key)
    }
}
