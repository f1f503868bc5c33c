// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use smallvec::SmallVec;
use std::{collections::HashMap,
          fmt::{Debug, Formatter, Result as FmtResult},
          sync::{Mutex, MutexGuard, PoisonError}};

use crate::{CallbackHandle, KeyAndModifiers, KeyCode, KeyModifiers};

/// A key press callback. It runs on the capture thread while the registry lock is held.
pub type KeyPressCallback = Box<dyn Fn(KeyCode, KeyModifiers) + Send + 'static>;

/// Most keys have one or two listeners.
type HandleList = SmallVec<[CallbackHandle; 4]>;

struct CallbackEntry {
    key: KeyAndModifiers,
    callback: KeyPressCallback,
}

#[derive(Default)]
struct RegistryState {
    last_issued: CallbackHandle,
    entries: HashMap<CallbackHandle, CallbackEntry>,
    handles_by_key: HashMap<KeyAndModifiers, HandleList>,
}

/// Owns every registered [`KeyPressCallback`], indexed both by [`CallbackHandle`] (for
/// O(1) removal) and by [`KeyAndModifiers`] (for dispatch). A single [`Mutex`] guards
/// all reads, writes, and dispatch.
///
/// # Reentrancy
///
/// The capture thread invokes callbacks with the lock held. A callback that calls
/// [`add`](CallbackRegistry::add) or [`delete`](CallbackRegistry::delete) on the
/// registry that is dispatching it will deadlock. Callbacks should also return quickly,
/// since no other key press is handled until they do.
#[derive(Default)]
pub struct CallbackRegistry {
    state: Mutex<RegistryState>,
}

impl Debug for CallbackRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let state = self.lock();
        f.debug_struct("CallbackRegistry")
            .field("last_issued", &state.last_issued)
            .field("entry_count", &state.entries.len())
            .field("key_count", &state.handles_by_key.len())
            .finish()
    }
}

impl CallbackRegistry {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// A callback that panicked poisons the mutex. The state itself is never left half
    /// updated by a panic (callbacks can't mutate it), so the poison is ignored.
    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `callback` for the exact `(key_code, modifiers)` pair and returns a fresh
    /// handle for it.
    pub fn add(
        &self,
        callback: KeyPressCallback,
        key_code: KeyCode,
        modifiers: KeyModifiers,
    ) -> CallbackHandle {
        let key = KeyAndModifiers::new(key_code, modifiers);
        let mut state = self.lock();

        let handle = state.last_issued.next();
        state.last_issued = handle;
        state.entries.insert(handle, CallbackEntry { key, callback });
        state.handles_by_key.entry(key).or_default().push(handle);

        handle
    }

    /// Removes the callback behind `handle`. Unknown handles, already deleted handles,
    /// and [`CallbackHandle::INVALID`] are ignored.
    pub fn delete(&self, handle: CallbackHandle) {
        let mut state = self.lock();

        let Some(entry) = state.entries.remove(&handle) else {
            return;
        };

        if let Some(handles) = state.handles_by_key.get_mut(&entry.key) {
            handles.retain(|it| *it != handle);
            if handles.is_empty() {
                state.handles_by_key.remove(&entry.key);
            }
        }
    }

    /// Runs every callback registered for exactly `(key_code, modifiers)`, once each, in
    /// no particular order. Returns how many ran.
    pub(crate) fn dispatch(&self, key_code: KeyCode, modifiers: KeyModifiers) -> usize {
        let state = self.lock();
        let key = KeyAndModifiers::new(key_code, modifiers);

        let Some(handles) = state.handles_by_key.get(&key) else {
            return 0;
        };

        let mut invoked = 0;
        for handle in handles {
            if let Some(entry) = state.entries.get(handle) {
                (entry.callback)(key_code, modifiers);
                invoked += 1;
            }
        }
        invoked
    }

    #[must_use]
    pub fn len(&self) -> usize { self.lock().entries.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.len() == 0 }

    #[must_use]
    pub fn contains(&self, handle: CallbackHandle) -> bool {
        self.lock().entries.contains_key(&handle)
    }
}
