// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt::{Debug, Formatter, Result as FmtResult},
          io::ErrorKind,
          marker::PhantomData,
          sync::{Arc,
                 atomic::{AtomicBool, Ordering}}};

use super::{interrupt_hook::InterruptHook,
            process_global::{self, SavedModeGuard},
            terminal_io::{StdinTerminal, UnixTerminalIo}};
use crate::{CallbackHandle, CallbackRegistry, CaptureFault, HandlerState, KeyCode,
            KeyDecoder, KeyModifiers, KeyPressCallback, KeyboardHandlerApi,
            KeyboardHandlerError, KeyboardHandlerOptions, UnixKeyDecoder,
            handler::{capture_support::{CaptureThread, Continuation,
                                        DEBUG_KEYBOARD_HANDLER, dispatch_key_press},
                      handler_api::add_if_active}};

/// Bytes read per attempt. The longest known sequence is 5 bytes.
pub const READ_BUFFER_SIZE: usize = 10;

/// Keyboard handler for a POSIX terminal.
///
/// While [`HandlerState::Active`], stdin is in non-canonical, no-echo mode and a thread
/// named `keyboard-handler-capture` reads key presses, decodes them with
/// [`UnixKeyDecoder`], and runs the callbacks registered for the result.
///
/// Dropping the handler stops the thread (within one 100 ms read timeout), puts the
/// terminal mode back, and restores the previous `SIGINT` disposition.
///
/// Use [`KeyboardHandler`](crate::KeyboardHandler) for the handler bound to real stdin,
/// or [`UnixKeyboardHandler::with_terminal_io`] to drive it from another
/// [`UnixTerminalIo`].
pub struct UnixKeyboardHandler<D: UnixTerminalIo = StdinTerminal> {
    registry: Arc<CallbackRegistry>,
    decoder: Arc<UnixKeyDecoder>,
    state: HandlerState,
    /// Field order is teardown order: hook, thread, saved mode. See the `Drop` impl.
    interrupt_hook: Option<InterruptHook>,
    capture_thread: Option<CaptureThread>,
    saved_mode: Option<SavedModeGuard>,
    _device: PhantomData<fn() -> D>,
}

impl<D: UnixTerminalIo> Debug for UnixKeyboardHandler<D> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("UnixKeyboardHandler")
            .field("state", &self.state)
            .field("registry", &self.registry)
            .field("interrupt_hook_installed", &self.interrupt_hook.is_some())
            .finish_non_exhaustive()
    }
}

impl UnixKeyboardHandler<StdinTerminal> {
    /// Binds to stdin with the `SIGINT` hook installed.
    ///
    /// # Errors
    ///
    /// See [`UnixKeyboardHandler::with_terminal_io`].
    pub fn new() -> Result<Self, KeyboardHandlerError> {
        Self::with_options(KeyboardHandlerOptions::default())
    }

    /// # Errors
    ///
    /// See [`UnixKeyboardHandler::with_terminal_io`].
    pub fn with_options(
        options: impl Into<KeyboardHandlerOptions>,
    ) -> Result<Self, KeyboardHandlerError> {
        Self::with_terminal_io(StdinTerminal, options)
    }
}

impl<D: UnixTerminalIo> UnixKeyboardHandler<D> {
    /// Activates the handler on `device`, or returns it [`HandlerState::Disabled`] when
    /// `device` is not a terminal.
    ///
    /// # Errors
    ///
    /// - [`KeyboardHandlerError::GetMode`] or [`KeyboardHandlerError::SetMode`] when the
    ///   terminal attributes can't be read or changed.
    /// - [`KeyboardHandlerError::InstallInterruptHook`] when `SIGINT` can't be hooked.
    /// - [`KeyboardHandlerError::SpawnThread`] when the capture thread can't start.
    ///
    /// Anything set up before the failure is undone before returning.
    pub fn with_terminal_io(
        device: D,
        options: impl Into<KeyboardHandlerOptions>,
    ) -> Result<Self, KeyboardHandlerError> {
        let options = options.into();
        let device = Arc::new(device);

        let mut handler = Self {
            registry: Arc::new(CallbackRegistry::new()),
            decoder: Arc::new(UnixKeyDecoder::new()),
            state: HandlerState::Disabled,
            interrupt_hook: None,
            capture_thread: None,
            saved_mode: None,
            _device: PhantomData,
        };

        if !device.is_terminal() {
            tracing::warn!(
                message = "stdin is not a terminal, keyboard handler is disabled"
            );
            return Ok(handler);
        }

        let original_mode = device.get_mode().map_err(KeyboardHandlerError::GetMode)?;

        handler.saved_mode = Some(process_global::publish_restore_action({
            let device = Arc::clone(&device);
            let original_mode = original_mode.clone();
            Box::new(move || device.set_mode(&original_mode).is_ok())
        }));

        if options.install_signal_handler {
            handler.interrupt_hook = Some(
                InterruptHook::install()
                    .map_err(KeyboardHandlerError::InstallInterruptHook)?,
            );
        }

        device
            .set_mode(&device.raw_mode_from(&original_mode))
            .map_err(KeyboardHandlerError::SetMode)?;

        process_global::clear_interrupt_exit_request();

        let capture_loop = CaptureLoop {
            device: Arc::clone(&device),
            decoder: Arc::clone(&handler.decoder),
            registry: Arc::clone(&handler.registry),
            original_mode: original_mode.clone(),
        };
        match CaptureThread::spawn(move |exit_requested| capture_loop.run(&exit_requested)) {
            Ok(capture_thread) => handler.capture_thread = Some(capture_thread),
            Err(error) => {
                drop(device.set_mode(&original_mode));
                return Err(KeyboardHandlerError::SpawnThread(error));
            }
        }

        handler.state = HandlerState::Active;
        Ok(handler)
    }

    /// The bytes a terminal sends for `key_code` with no modifiers held.
    #[must_use]
    pub fn terminal_sequence(&self, key_code: KeyCode) -> Option<&[u8]> {
        self.decoder.terminal_sequence(key_code)
    }

    /// Table lookup of `sequence`, without modifier inference.
    #[must_use]
    pub fn key_code_for_sequence(&self, sequence: &[u8]) -> KeyCode {
        self.decoder.lookup(sequence)
    }
}

impl<D: UnixTerminalIo> KeyboardHandlerApi for UnixKeyboardHandler<D> {
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

impl<D: UnixTerminalIo> Drop for UnixKeyboardHandler<D> {
    fn drop(&mut self) {
        drop(self.interrupt_hook.take());
        if let Some(capture_thread) = self.capture_thread.take() {
            capture_thread.stop_and_join();
        }
        drop(self.saved_mode.take());
    }
}

/// Everything the capture thread owns.
struct CaptureLoop<D: UnixTerminalIo> {
    device: Arc<D>,
    decoder: Arc<UnixKeyDecoder>,
    registry: Arc<CallbackRegistry>,
    original_mode: D::Mode,
}

impl<D: UnixTerminalIo> CaptureLoop<D> {
    fn run(self, exit_requested: &AtomicBool) -> Option<CaptureFault> {
        let mut buffer = [0_u8; READ_BUFFER_SIZE];

        let fault = loop {
            if exit_requested.load(Ordering::SeqCst) {
                break None;
            }
            match self.capture_once(&mut buffer) {
                Ok(Continuation::Continue) => {}
                Ok(Continuation::Stop) => break None,
                Err(fault) => break Some(fault),
            }
        };

        // Best effort. A fault that stopped the loop is worth more than this one.
        match (fault, self.device.set_mode(&self.original_mode)) {
            (Some(fault), _) => Some(fault),
            (None, Err(error)) => Some(CaptureFault::Restore(error)),
            (None, Ok(())) => None,
        }
    }

    fn capture_once(
        &self,
        buffer: &mut [u8; READ_BUFFER_SIZE],
    ) -> Result<Continuation, CaptureFault> {
        // Set by the SIGINT hook, which already restored the mode.
        if process_global::is_interrupt_exit_requested() {
            return Ok(Continuation::Stop);
        }

        let read_count = match self.device.read(buffer) {
            // Read timed out.
            Ok(0) => return Ok(Continuation::Continue),
            Ok(read_count) => read_count.min(buffer.len()),
            Err(ref error)
                if matches!(error.kind(), ErrorKind::Interrupted | ErrorKind::WouldBlock) =>
            {
                return Ok(Continuation::Continue);
            }
            Err(error) => return Err(CaptureFault::Read(error)),
        };

        let unit = significant_bytes(&buffer[..read_count]);
        let key = self.decoder.decode(unit);

        DEBUG_KEYBOARD_HANDLER.then(|| {
            tracing::debug!(message = "decoded key press", bytes = ?unit, key = %key);
        });

        dispatch_key_press(&self.registry, key)?;
        Ok(Continuation::Continue)
    }
}

/// Bytes up to the first NUL, keeping at least one byte so that a lone NUL (CTRL+SPACE)
/// still decodes.
fn significant_bytes(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .position(|byte| *byte == 0)
        .unwrap_or(bytes.len())
        .max(1)
        .min(bytes.len());
    &bytes[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{TerminalIoFns, TracingConfig, restore_buffer_mode_for_stdin,
                test_fixtures::{FakeRead, FakeTerminal, FakeTerminalMode, wait_until},
                try_initialize_logging_thread_local};
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::{io,
              sync::mpsc,
              time::Duration};
    use test_case::test_case;
    use tracing_core::LevelFilter;

    const WAIT: Duration = Duration::from_secs(5);

    fn activate(terminal: &FakeTerminal) -> UnixKeyboardHandler<FakeTerminal> {
        UnixKeyboardHandler::with_terminal_io(terminal.clone(), false).unwrap()
    }

    #[test_case(&[b'a', 0, 0], &[b'a'])]
    #[test_case(&[0, 0], &[0])]
    #[test_case(&[27, b'[', b'A'], &[27, b'[', b'A'])]
    fn test_significant_bytes(input: &[u8], expected: &[u8]) {
        assert_eq!(significant_bytes(input), expected);
    }

    #[test]
    #[serial]
    fn test_not_a_terminal_is_disabled_and_refuses_callbacks() {
        let terminal = FakeTerminal::not_a_terminal();
        let handler = activate(&terminal);

        assert_eq!(handler.state(), HandlerState::Disabled);
        assert_eq!(
            handler.add_key_press_callback(|_, _| {}, KeyCode::A, KeyModifiers::NONE),
            CallbackHandle::INVALID
        );
        assert_eq!(handler.callback_count(), 0);

        drop(handler);
        assert!(terminal.set_mode_calls().is_empty());
        assert_eq!(terminal.read_count(), 0);
    }

    #[test]
    #[serial]
    fn test_active_handler_switches_mode_and_issues_handles() {
        let terminal = FakeTerminal::new();
        let handler = activate(&terminal);
        assert_eq!(handler.state(), HandlerState::Active);

        assert_eq!(
            terminal.set_mode_calls(),
            vec![FakeTerminalMode::cooked().raw()]
        );

        let first = handler.add_key_press_callback(|_, _| {}, KeyCode::A, KeyModifiers::NONE);
        let second = handler.add_key_press_callback(|_, _| {}, KeyCode::A, KeyModifiers::NONE);
        assert!(first.is_valid() && second.is_valid());
        assert_ne!(first, second);
        assert_eq!(
            handler.add_boxed_key_press_callback(None, KeyCode::A, KeyModifiers::NONE),
            CallbackHandle::INVALID
        );
        assert_eq!(handler.callback_count(), 2);

        handler.delete_key_press_callback(first);
        handler.delete_key_press_callback(first);
        assert_eq!(handler.callback_count(), 1);
    }

    #[test]
    #[serial]
    fn test_key_presses_reach_matching_callbacks_only() {
        let terminal = FakeTerminal::new();
        let handler = activate(&terminal);
        let (tx, rx) = mpsc::channel();

        for tag in ["first", "second"] {
            let tx = tx.clone();
            handler.add_key_press_callback(
                move |key_code, modifiers| drop(tx.send((tag, key_code, modifiers))),
                KeyCode::A,
                KeyModifiers::ALT,
            );
        }
        let tx_other = tx.clone();
        handler.add_key_press_callback(
            move |key_code, modifiers| drop(tx_other.send(("other", key_code, modifiers))),
            KeyCode::A,
            KeyModifiers::NONE,
        );

        terminal.push_read(FakeRead::Bytes(vec![27, b'a']));
        terminal.push_read(FakeRead::Bytes(vec![b'z']));

        let mut received = vec![
            rx.recv_timeout(WAIT).unwrap(),
            rx.recv_timeout(WAIT).unwrap(),
        ];
        received.sort_by_key(|(tag, _, _)| *tag);
        assert_eq!(
            received,
            vec![
                ("first", KeyCode::A, KeyModifiers::ALT),
                ("second", KeyCode::A, KeyModifiers::ALT),
            ]
        );

        assert!(wait_until(WAIT, || terminal.pending_reads() == 0));
        drop(handler);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    #[serial]
    fn test_interrupted_reads_are_retried() {
        let terminal = FakeTerminal::new();
        let handler = activate(&terminal);
        let (tx, rx) = mpsc::channel();
        handler.add_key_press_callback(
            move |key_code, modifiers| drop(tx.send((key_code, modifiers))),
            KeyCode::X,
            KeyModifiers::SHIFT,
        );

        terminal.push_read(FakeRead::Error(io::ErrorKind::Interrupted));
        terminal.push_read(FakeRead::Error(io::ErrorKind::WouldBlock));
        terminal.push_read(FakeRead::Bytes(vec![b'X', 0, 0, 0]));

        assert_eq!(
            rx.recv_timeout(WAIT).unwrap(),
            (KeyCode::X, KeyModifiers::SHIFT)
        );
    }

    #[test]
    #[serial]
    fn test_drop_during_timed_read_restores_original_mode() {
        let terminal = FakeTerminal::new();
        let handler = activate(&terminal);
        assert!(wait_until(WAIT, || terminal.read_count() > 2));

        drop(handler);

        let calls = terminal.set_mode_calls();
        assert_eq!(calls.first(), Some(&FakeTerminalMode::cooked().raw()));
        assert_eq!(calls.last(), Some(&FakeTerminalMode::cooked()));
        assert_eq!(terminal.current_mode(), FakeTerminalMode::cooked());
    }

    #[test]
    #[serial]
    fn test_read_fault_stops_capture_and_restores_mode() {
        let terminal = FakeTerminal::new();
        let handler = activate(&terminal);

        terminal.push_read(FakeRead::Error(io::ErrorKind::BrokenPipe));

        assert!(wait_until(WAIT, || terminal.set_mode_calls().len() == 2));
        assert_eq!(terminal.current_mode(), FakeTerminalMode::cooked());
        let reads_after_fault = terminal.read_count();

        drop(handler);
        assert_eq!(terminal.read_count(), reads_after_fault);
    }

    #[test]
    #[serial]
    fn test_capture_fault_is_logged_only_at_teardown() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("capture_fault.log");
        let _log_guard = try_initialize_logging_thread_local(TracingConfig::new_file(
            log_path.to_str().unwrap(),
            LevelFilter::ERROR,
        ))
        .unwrap();

        let terminal = FakeTerminal::new();
        let handler = activate(&terminal);
        terminal.push_read(FakeRead::Error(io::ErrorKind::BrokenPipe));
        assert!(wait_until(WAIT, || terminal.set_mode_calls().len() == 2));

        let before_drop = std::fs::read_to_string(&log_path).unwrap();
        assert!(!before_drop.contains("stopped with a fault"));

        drop(handler);

        let after_drop = std::fs::read_to_string(&log_path).unwrap();
        assert!(after_drop.contains("stopped with a fault"));
        assert!(
            after_drop.contains("Failed to read key presses from the input device: broken pipe")
        );
        assert!(after_drop.contains("keyboard_handler::capture::read"));
    }

    #[test]
    #[serial]
    fn test_panicking_callback_stops_capture_and_restores_mode() {
        let terminal = FakeTerminal::new();
        let handler = activate(&terminal);
        handler.add_key_press_callback(
            |_, _| panic!("callback failed"),
            KeyCode::Q,
            KeyModifiers::NONE,
        );

        terminal.push_read(FakeRead::Bytes(vec![b'q']));

        assert!(wait_until(WAIT, || terminal.set_mode_calls().len() == 2));
        assert_eq!(terminal.current_mode(), FakeTerminalMode::cooked());
        drop(handler);
    }

    #[test]
    #[serial]
    fn test_get_mode_failure_aborts_construction() {
        let terminal = FakeTerminal::new().failing_get_mode();

        let result = UnixKeyboardHandler::with_terminal_io(terminal.clone(), false);

        assert!(matches!(result, Err(KeyboardHandlerError::GetMode(_))));
        assert!(terminal.set_mode_calls().is_empty());
    }

    #[test]
    #[serial]
    fn test_set_mode_failure_aborts_construction_and_forgets_saved_mode() {
        let terminal = FakeTerminal::new().failing_set_mode();

        let result = UnixKeyboardHandler::with_terminal_io(terminal.clone(), false);

        assert!(matches!(result, Err(KeyboardHandlerError::SetMode(_))));
        let attempts = terminal.set_mode_calls().len();
        assert!(restore_buffer_mode_for_stdin());
        assert_eq!(terminal.set_mode_calls().len(), attempts);
        assert_eq!(terminal.read_count(), 0);
    }

    #[test]
    #[serial]
    fn test_restore_entry_point_applies_original_mode() {
        let terminal = FakeTerminal::new();
        let handler = activate(&terminal);
        assert_eq!(terminal.current_mode(), FakeTerminalMode::cooked().raw());

        assert!(restore_buffer_mode_for_stdin());
        assert_eq!(terminal.current_mode(), FakeTerminalMode::cooked());

        drop(handler);
        let calls = terminal.set_mode_calls().len();
        assert!(restore_buffer_mode_for_stdin());
        assert_eq!(terminal.set_mode_calls().len(), calls);
    }

    #[test]
    #[serial]
    fn test_signal_handler_is_installed_and_removed() {
        fn current_sigint_handler() -> libc::sighandler_t {
            // SAFETY: query only.
            let mut current: libc::sigaction = unsafe { std::mem::zeroed() };
            // SAFETY: valid out pointer.
            unsafe { libc::sigaction(libc::SIGINT, std::ptr::null(), &raw mut current) };
            current.sa_sigaction
        }

        let before = current_sigint_handler();
        let terminal = FakeTerminal::new();
        let handler = UnixKeyboardHandler::with_terminal_io(terminal.clone(), true).unwrap();
        assert_ne!(current_sigint_handler(), before);

        drop(handler);
        assert_eq!(current_sigint_handler(), before);
    }

    #[test]
    #[serial]
    fn test_closure_device_drives_the_handler() {
        let terminal = FakeTerminal::new();
        let (t1, t2, t3, t4) = (
            terminal.clone(),
            terminal.clone(),
            terminal.clone(),
            terminal.clone(),
        );
        let device = TerminalIoFns::builder()
            .is_terminal(move || t1.is_terminal())
            .read(move |buffer| t2.read(buffer))
            .get_mode(move || t3.get_mode())
            .set_mode(move |mode| t4.set_mode(mode))
            .raw_mode_from(FakeTerminalMode::raw)
            .build()
            .unwrap();

        let handler = UnixKeyboardHandler::with_terminal_io(device, false).unwrap();
        let (tx, rx) = mpsc::channel();
        handler.add_key_press_callback(
            move |key_code, modifiers| drop(tx.send((key_code, modifiers))),
            KeyCode::C,
            KeyModifiers::CTRL,
        );
        terminal.push_read(FakeRead::Bytes(vec![3]));

        assert_eq!(rx.recv_timeout(WAIT).unwrap(), (KeyCode::C, KeyModifiers::CTRL));
        drop(handler);
        assert_eq!(terminal.current_mode(), FakeTerminalMode::cooked());
    }

    #[test]
    #[serial]
    fn test_reverse_lookups() {
        let handler = activate(&FakeTerminal::not_a_terminal());
        assert_eq!(
            handler.terminal_sequence(KeyCode::CursorUp),
            Some(&[27, b'[', b'A'][..])
        );
        assert_eq!(handler.key_code_for_sequence(&[27, b'O', b'P']), KeyCode::F1);
        assert_eq!(handler.key_code_for_sequence(b"A"), KeyCode::Unknown);
    }
}
