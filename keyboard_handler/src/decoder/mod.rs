// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Pure translation from what a device produced to a
//! [`KeyAndModifiers`](crate::KeyAndModifiers).
//!
//! | Platform | Raw unit                                   | Decoder               |
//! |----------|--------------------------------------------|-----------------------|
//! | Unix     | 1 to 8 bytes from one `read(2)`            | [`UnixKeyDecoder`]    |
//! | Windows  | one or two `_getch` codes plus ALT state  | [`WindowsKeyDecoder`] |
//!
//! Both decoders are compiled on every platform so their tables can be tested anywhere.

// Private modules (hide internal structure).
mod key_decoder;
mod printable_keys;
mod unix_key_decoder;
mod windows_key_decoder;

// Re-export.
pub use key_decoder::*;
pub use unix_key_decoder::*;
pub use windows_key_decoder::*;
