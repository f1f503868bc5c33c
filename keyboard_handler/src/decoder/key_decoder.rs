// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{KeyAndModifiers, KeyCode};

/// Translates one raw input unit into a key press.
pub trait KeyDecoder: Send + Sync {
    /// What one read from the device produces.
    type RawInput: ?Sized;

    /// Plain table lookup. No modifiers are inferred. Misses give [`KeyCode::Unknown`].
    fn lookup(&self, raw: &Self::RawInput) -> KeyCode;

    /// Table lookup plus the platform's modifier inference rules. Misses give
    /// [`KeyCode::Unknown`] with whatever modifiers were inferred before the miss.
    fn decode(&self, raw: &Self::RawInput) -> KeyAndModifiers;
}
