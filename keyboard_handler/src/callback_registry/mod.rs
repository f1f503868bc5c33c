// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Thread safe mapping from [`KeyAndModifiers`](crate::KeyAndModifiers) to the callbacks
//! registered for it. Callers only ever hold a [`CallbackHandle`]; the closures are owned
//! by the [`CallbackRegistry`].

// Private modules (hide internal structure).
mod callback_handle;
mod registry;

// Re-export.
pub use callback_handle::*;
pub use registry::*;
