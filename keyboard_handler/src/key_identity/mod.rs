// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Pure value types that name a key press: [`KeyCode`], [`KeyModifiers`], and the pair
//! of them, [`KeyAndModifiers`], which is what callbacks are registered against.

// Private modules (hide internal structure).
mod key_and_modifiers;
mod key_code;
mod key_modifiers;

// Re-export.
pub use key_and_modifiers::*;
pub use key_code::*;
pub use key_modifiers::*;
