// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::sync::{Arc, Mutex, PoisonError, Weak,
                atomic::{AtomicUsize, Ordering}};

use crate::{CallbackHandle, KeyAndModifiers, KeyboardHandlerApi};

/// A client object that outlives or predeceases the handler it registered with.
///
/// Its callbacks hold only a [`Weak`] reference, so registering doesn't keep it alive.
/// Once it is dropped, its callbacks still fire (they are never unregistered) but only
/// log and count the miss in [`orphaned_calls`](Self::orphaned_calls).
#[derive(Debug)]
pub struct KeyPressRecorder {
    name: String,
    recorded: Mutex<Vec<KeyAndModifiers>>,
    orphaned_calls: Arc<AtomicUsize>,
}

impl KeyPressRecorder {
    #[must_use]
    pub fn create(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            recorded: Mutex::new(vec![]),
            orphaned_calls: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Registers one callback per entry of `keys`.
    pub fn register_callbacks(
        self: &Arc<Self>,
        handler: &dyn KeyboardHandlerApi,
        keys: &[KeyAndModifiers],
    ) -> Vec<CallbackHandle> {
        keys.iter()
            .map(|key| {
                let weak_self: Weak<Self> = Arc::downgrade(self);
                let name = self.name.clone();
                let orphaned_calls = Arc::clone(&self.orphaned_calls);
                handler.add_boxed_key_press_callback(
                    Some(Box::new(move |key_code, modifiers| {
                        match weak_self.upgrade() {
                            Some(recorder) => {
                                recorder.record(KeyAndModifiers::new(key_code, modifiers));
                            }
                            None => {
                                orphaned_calls.fetch_add(1, Ordering::SeqCst);
                                tracing::warn!(
                                    message = "object for assigned callback was deleted",
                                    owner = %name
                                );
                            }
                        }
                    })),
                    key.key_code,
                    key.modifiers,
                )
            })
            .collect()
    }

    fn record(&self, key: KeyAndModifiers) {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(key);
    }

    #[must_use]
    pub fn recorded(&self) -> Vec<KeyAndModifiers> {
        self.recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Shared counter of callbacks that fired after this recorder was dropped. Grab it
    /// before dropping the recorder.
    #[must_use]
    pub fn orphaned_calls(&self) -> Arc<AtomicUsize> { Arc::clone(&self.orphaned_calls) }
}
