// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use strum_macros::Display;

use crate::{CallbackHandle, CallbackRegistry, KeyCode, KeyModifiers, KeyPressCallback};

/// Whether a handler is capturing key presses. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum HandlerState {
    /// Stdin (or the console) is not an interactive device. No thread runs and every
    /// registration is refused.
    Disabled,
    /// The device is in capture mode and the capture thread is running.
    Active,
}

/// Registration API shared by both platform controllers.
///
/// The registry behind it is never handed out, so every registration goes through
/// [`add_boxed_key_press_callback`](Self::add_boxed_key_press_callback) and its
/// [`HandlerState`] check, and callbacks only ever run on the capture thread:
///
/// ```compile_fail
/// use keyboard_handler::KeyboardHandlerApi;
/// fn reach_registry<H: KeyboardHandlerApi>(handler: &H) { handler.callback_registry(); }
/// ```
pub trait KeyboardHandlerApi {
    fn state(&self) -> HandlerState;

    /// Registers `callback` for exactly `(key_code, modifiers)`.
    ///
    /// Returns [`CallbackHandle::INVALID`] when `callback` is `None` or the handler is
    /// [`HandlerState::Disabled`]. The registry is left untouched in both cases.
    fn add_boxed_key_press_callback(
        &self,
        callback: Option<KeyPressCallback>,
        key_code: KeyCode,
        modifiers: KeyModifiers,
    ) -> CallbackHandle;

    /// Registers a closure for exactly `(key_code, modifiers)`. See
    /// [`add_boxed_key_press_callback`](Self::add_boxed_key_press_callback).
    ///
    /// The closure runs on the capture thread with the registry locked. It must not call
    /// back into this handler to add or delete callbacks.
    fn add_key_press_callback<F>(
        &self,
        callback: F,
        key_code: KeyCode,
        modifiers: KeyModifiers,
    ) -> CallbackHandle
    where
        F: Fn(KeyCode, KeyModifiers) + Send + 'static,
        Self: Sized,
    {
        self.add_boxed_key_press_callback(Some(Box::new(callback)), key_code, modifiers)
    }

    /// Unregisters the callback behind `handle`. Unknown and invalid handles are ignored.
    fn delete_key_press_callback(&self, handle: CallbackHandle);

    fn callback_count(&self) -> usize;
}

/// Registration rule shared by both controllers.
pub(crate) fn add_if_active(
    registry: &CallbackRegistry,
    state: HandlerState,
    callback: Option<KeyPressCallback>,
    key_code: KeyCode,
    modifiers: KeyModifiers,
) -> CallbackHandle {
    match (callback, state) {
        (Some(callback), HandlerState::Active) => registry.add(callback, key_code, modifiers),
        _ => CallbackHandle::INVALID,
    }
}
