// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Console key codes as returned by `_getch`. Keys outside the character range arrive as
//! two codes: a prefix (`0` for F1 to F10, `0xE0` for navigation keys, F11 and F12)
//! followed by a scan code.

use std::{collections::HashMap,
          fmt::{Display, Formatter, Result as FmtResult},
          ops::RangeInclusive};

use super::printable_keys::PRINTABLE_ASCII_KEYS;
use crate::{KeyAndModifiers, KeyCode, KeyDecoder, KeyModifiers};

/// One or two console codes for a single key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WinKeyCode {
    pub first: i32,
    /// [`WinKeyCode::NOT_A_KEY`] when the key produced a single code.
    pub second: i32,
}

impl WinKeyCode {
    pub const NOT_A_KEY: i32 = -1;
    pub const FUNCTION_PREFIX: i32 = 0;
    pub const EXTENDED_PREFIX: i32 = 0xE0;

    #[must_use]
    pub const fn single(first: i32) -> Self {
        Self {
            first,
            second: Self::NOT_A_KEY,
        }
    }

    #[must_use]
    pub const fn pair(first: i32, second: i32) -> Self { Self { first, second } }

    /// Whether `code` announces that a second code follows.
    #[must_use]
    pub const fn is_prefix(code: i32) -> bool {
        code == Self::FUNCTION_PREFIX || code == Self::EXTENDED_PREFIX
    }
}

impl Display for WinKeyCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.second == Self::NOT_A_KEY {
            write!(f, "({})", self.first)
        } else {
            write!(f, "({}, {})", self.first, self.second)
        }
    }
}

/// What the capture loop hands to [`WindowsKeyDecoder::decode`]: the codes plus the ALT
/// key state sampled right after reading them, since ALT is never part of the codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowsRawInput {
    pub code: WinKeyCode,
    pub alt_pressed: bool,
}

impl From<WinKeyCode> for WindowsRawInput {
    fn from(code: WinKeyCode) -> Self {
        Self {
            code,
            alt_pressed: false,
        }
    }
}

const CTRL_RANGE: RangeInclusive<i32> = 0..=26;
const CTRL_TO_LOWERCASE_OFFSET: i32 = 96;

/// Offset corrections that fold the CTRL and SHIFT variants of F-keys back onto the
/// unmodified codes in the table: `(prefix, second code range, offset, modifier)`.
const FUNCTION_KEY_CORRECTIONS: [(i32, RangeInclusive<i32>, i32, KeyModifiers); 4] = [
    (WinKeyCode::FUNCTION_PREFIX, 94..=103, 35, KeyModifiers::CTRL),
    (WinKeyCode::EXTENDED_PREFIX, 137..=138, 4, KeyModifiers::CTRL),
    (WinKeyCode::FUNCTION_PREFIX, 84..=93, 25, KeyModifiers::SHIFT),
    (WinKeyCode::EXTENDED_PREFIX, 135..=136, 2, KeyModifiers::SHIFT),
];

const NAMED_KEY_CODES: [(KeyCode, WinKeyCode); 25] = {
    const E: i32 = WinKeyCode::EXTENDED_PREFIX;
    const F: i32 = WinKeyCode::FUNCTION_PREFIX;
    [
        (KeyCode::Escape, WinKeyCode::single(27)),
        (KeyCode::Enter, WinKeyCode::single(13)),
        (KeyCode::BackSpace, WinKeyCode::single(8)),
        (KeyCode::CursorUp, WinKeyCode::pair(E, 72)),
        (KeyCode::CursorDown, WinKeyCode::pair(E, 80)),
        (KeyCode::CursorRight, WinKeyCode::pair(E, 77)),
        (KeyCode::CursorLeft, WinKeyCode::pair(E, 75)),
        (KeyCode::Home, WinKeyCode::pair(E, 71)),
        (KeyCode::End, WinKeyCode::pair(E, 79)),
        (KeyCode::Insert, WinKeyCode::pair(E, 82)),
        (KeyCode::DeleteKey, WinKeyCode::pair(E, 83)),
        (KeyCode::PgUp, WinKeyCode::pair(E, 73)),
        (KeyCode::PgDown, WinKeyCode::pair(E, 81)),
        (KeyCode::F1, WinKeyCode::pair(F, 59)),
        (KeyCode::F2, WinKeyCode::pair(F, 60)),
        (KeyCode::F3, WinKeyCode::pair(F, 61)),
        (KeyCode::F4, WinKeyCode::pair(F, 62)),
        (KeyCode::F5, WinKeyCode::pair(F, 63)),
        (KeyCode::F6, WinKeyCode::pair(F, 64)),
        (KeyCode::F7, WinKeyCode::pair(F, 65)),
        (KeyCode::F8, WinKeyCode::pair(F, 66)),
        (KeyCode::F9, WinKeyCode::pair(F, 67)),
        (KeyCode::F10, WinKeyCode::pair(F, 68)),
        (KeyCode::F11, WinKeyCode::pair(E, 133)),
        (KeyCode::F12, WinKeyCode::pair(E, 134)),
    ]
};

/// Decodes console key codes. The code-pair table is built once in
/// [`WindowsKeyDecoder::new`] and never changes.
#[derive(Debug, Clone)]
pub struct WindowsKeyDecoder {
    key_code_by_win_code: HashMap<WinKeyCode, KeyCode>,
    win_code_by_key_code: HashMap<KeyCode, WinKeyCode>,
}

impl Default for WindowsKeyDecoder {
    fn default() -> Self { Self::new() }
}

impl WindowsKeyDecoder {
    #[must_use]
    pub fn new() -> Self {
        let printable = PRINTABLE_ASCII_KEYS
            .iter()
            .map(|(byte, key_code)| (*key_code, WinKeyCode::single(i32::from(*byte))));

        let mut key_code_by_win_code = HashMap::new();
        let mut win_code_by_key_code = HashMap::new();
        for (key_code, win_code) in printable.chain(NAMED_KEY_CODES) {
            key_code_by_win_code.insert(win_code, key_code);
            win_code_by_key_code.insert(key_code, win_code);
        }

        Self {
            key_code_by_win_code,
            win_code_by_key_code,
        }
    }

    /// The codes the console produces for `key_code` with no modifiers held.
    #[must_use]
    pub fn win_key_code(&self, key_code: KeyCode) -> Option<WinKeyCode> {
        self.win_code_by_key_code.get(&key_code).copied()
    }

    /// Every `(codes, key_code)` pair in the table, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (WinKeyCode, KeyCode)> {
        self.key_code_by_win_code
            .iter()
            .map(|(win_code, key_code)| (*win_code, *key_code))
    }

    fn lookup_code(&self, code: WinKeyCode) -> KeyCode {
        self.key_code_by_win_code
            .get(&code)
            .copied()
            .unwrap_or(KeyCode::Unknown)
    }
}

impl KeyDecoder for WindowsKeyDecoder {
    type RawInput = WindowsRawInput;

    fn lookup(&self, raw: &WindowsRawInput) -> KeyCode { self.lookup_code(raw.code) }

    /// 1. CTRL and SHIFT variants of F1 to F12 are shifted back onto the plain codes.
    /// 2. ALT comes from [`WindowsRawInput::alt_pressed`].
    /// 3. An uppercase letter sets SHIFT and continues lowercase.
    /// 4. Table lookup.
    /// 5. On a miss, a single code in `0..=26` sets CTRL and is looked up again as
    ///    `code + 96`.
    ///
    /// CTRL+ALT combinations and ALT+F-keys come out wrong or unknown, the console does
    /// not distinguish them in the codes it returns.
    fn decode(&self, raw: &WindowsRawInput) -> KeyAndModifiers {
        let WinKeyCode { mut first, mut second } = raw.code;
        let mut modifiers = KeyModifiers::NONE;

        if let Some((_, _, offset, modifier)) = FUNCTION_KEY_CORRECTIONS
            .iter()
            .find(|(prefix, range, _, _)| first == *prefix && range.contains(&second))
        {
            second -= offset;
            modifiers |= *modifier;
        }

        if raw.alt_pressed {
            modifiers |= KeyModifiers::ALT;
        }

        match u8::try_from(first) {
            Ok(byte) if byte.is_ascii_uppercase() => {
                first = i32::from(byte.to_ascii_lowercase());
                modifiers |= KeyModifiers::SHIFT;
            }
            _ => {}
        }

        let key_code = self.lookup_code(WinKeyCode::pair(first, second));
        if key_code != KeyCode::Unknown {
            return KeyAndModifiers::new(key_code, modifiers);
        }

        if second == WinKeyCode::NOT_A_KEY && CTRL_RANGE.contains(&first) {
            modifiers |= KeyModifiers::CTRL;
            let key_code =
                self.lookup_code(WinKeyCode::single(first + CTRL_TO_LOWERCASE_OFFSET));
            return KeyAndModifiers::new(key_code, modifiers);
        }

        KeyAndModifiers::new(KeyCode::Unknown, modifiers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;
    use test_case::test_case;

    fn decode(first: i32, second: i32, alt_pressed: bool) -> KeyAndModifiers {
        WindowsKeyDecoder::new().decode(&WindowsRawInput {
            code: WinKeyCode::pair(first, second),
            alt_pressed,
        })
    }

    #[test_case(0, 94, KeyCode::F1, KeyModifiers::CTRL; "ctrl f1")]
    #[test_case(0, 103, KeyCode::F10, KeyModifiers::CTRL; "ctrl f10")]
    #[test_case(0xE0, 137, KeyCode::F11, KeyModifiers::CTRL; "ctrl f11")]
    #[test_case(0xE0, 138, KeyCode::F12, KeyModifiers::CTRL; "ctrl f12")]
    #[test_case(0, 84, KeyCode::F1, KeyModifiers::SHIFT; "shift f1")]
    #[test_case(0, 93, KeyCode::F10, KeyModifiers::SHIFT; "shift f10")]
    #[test_case(0xE0, 135, KeyCode::F11, KeyModifiers::SHIFT; "shift f11")]
    #[test_case(0xE0, 136, KeyCode::F12, KeyModifiers::SHIFT; "shift f12")]
    #[test_case(0, 59, KeyCode::F1, KeyModifiers::NONE; "f1")]
    #[test_case(0xE0, 72, KeyCode::CursorUp, KeyModifiers::NONE; "cursor up")]
    #[test_case(i32::from(b'A'), WinKeyCode::NOT_A_KEY, KeyCode::A, KeyModifiers::SHIFT; "shift a")]
    #[test_case(1, WinKeyCode::NOT_A_KEY, KeyCode::A, KeyModifiers::CTRL; "ctrl a")]
    #[test_case(26, WinKeyCode::NOT_A_KEY, KeyCode::Z, KeyModifiers::CTRL; "ctrl z")]
    #[test_case(8, WinKeyCode::NOT_A_KEY, KeyCode::BackSpace, KeyModifiers::NONE; "backspace wins over ctrl h")]
    #[test_case(13, WinKeyCode::NOT_A_KEY, KeyCode::Enter, KeyModifiers::NONE; "enter wins over ctrl m")]
    #[test_case(0xE0, 200, KeyCode::Unknown, KeyModifiers::NONE; "unknown extended")]
    #[test_case(300, WinKeyCode::NOT_A_KEY, KeyCode::Unknown, KeyModifiers::NONE; "out of range")]
    fn test_decode(first: i32, second: i32, key_code: KeyCode, modifiers: KeyModifiers) {
        assert_eq!(
            decode(first, second, false),
            KeyAndModifiers::new(key_code, modifiers)
        );
    }

    #[test]
    fn test_alt_is_merged_from_sampled_state() {
        assert_eq!(
            decode(i32::from(b'x'), WinKeyCode::NOT_A_KEY, true),
            KeyAndModifiers::new(KeyCode::X, KeyModifiers::ALT)
        );
        assert_eq!(
            decode(i32::from(b'X'), WinKeyCode::NOT_A_KEY, true),
            KeyAndModifiers::new(KeyCode::X, KeyModifiers::ALT | KeyModifiers::SHIFT)
        );
        assert_eq!(
            decode(0, 94, true),
            KeyAndModifiers::new(KeyCode::F1, KeyModifiers::ALT | KeyModifiers::CTRL)
        );
    }

    #[test]
    fn test_every_table_entry_decodes_to_itself_without_modifiers() {
        let decoder = WindowsKeyDecoder::new();
        for (win_code, key_code) in decoder.entries() {
            assert_eq!(
                decoder.decode(&win_code.into()),
                KeyAndModifiers::from(key_code),
                "codes {win_code}"
            );
        }
    }

    #[test]
    fn test_every_key_code_except_unknown_has_codes() {
        let decoder = WindowsKeyDecoder::new();
        for key_code in KeyCode::iter().filter(|it| *it != KeyCode::Unknown) {
            let win_code = decoder.win_key_code(key_code).unwrap();
            assert_eq!(decoder.lookup(&win_code.into()), key_code);
        }
        assert_eq!(decoder.win_key_code(KeyCode::Unknown), None);
    }

    #[test]
    fn test_prefix_codes() {
        assert!(WinKeyCode::is_prefix(0));
        assert!(WinKeyCode::is_prefix(0xE0));
        assert!(!WinKeyCode::is_prefix(b'a'.into()));
    }
}
