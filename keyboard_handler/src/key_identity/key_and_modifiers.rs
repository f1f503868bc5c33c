// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::{KeyCode, KeyModifiers};

/// A decoded key press, and the key that callbacks are registered against. Two values
/// are equal only when both fields are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyAndModifiers {
    pub key_code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyAndModifiers {
    #[must_use]
    pub fn new(key_code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { key_code, modifiers }
    }
}

impl From<KeyCode> for KeyAndModifiers {
    fn from(key_code: KeyCode) -> Self { Self::new(key_code, KeyModifiers::NONE) }
}

impl From<(KeyCode, KeyModifiers)> for KeyAndModifiers {
    fn from((key_code, modifiers): (KeyCode, KeyModifiers)) -> Self {
        Self::new(key_code, modifiers)
    }
}

/// `a`, `SHIFT + a`, `CTRL ALT + F1`.
impl Display for KeyAndModifiers {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key_code)
        } else {
            write!(f, "{} + {}", self.modifiers, self.key_code)
        }
    }
}
