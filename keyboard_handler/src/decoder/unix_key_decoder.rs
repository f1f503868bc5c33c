// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Terminal byte sequences. See [`UnixKeyDecoder::decode`] for the inference rules.

use std::{collections::HashMap, ops::RangeInclusive};

use super::printable_keys::PRINTABLE_ASCII_KEYS;
use crate::{KeyAndModifiers, KeyCode, KeyDecoder, KeyModifiers};

const ESC: u8 = 27;

/// `CTRL+<letter>` arrives as the letter's position in the alphabet (`CTRL+A` is `1`).
/// `0` is `CTRL+@` / `CTRL+SPACE`, which lands on `` ` ``.
const CTRL_RANGE: RangeInclusive<u8> = 0..=26;
const CTRL_TO_LOWERCASE_OFFSET: u8 = 96;

/// Sequences for keys that aren't a single printable byte.
const NAMED_KEY_SEQUENCES: &[(KeyCode, &[u8])] = &[
    (KeyCode::Escape, &[ESC]),
    (KeyCode::Enter, &[10]),
    (KeyCode::BackSpace, &[127]),
    (KeyCode::CursorUp, &[ESC, b'[', b'A']),
    (KeyCode::CursorDown, &[ESC, b'[', b'B']),
    (KeyCode::CursorRight, &[ESC, b'[', b'C']),
    (KeyCode::CursorLeft, &[ESC, b'[', b'D']),
    (KeyCode::Home, &[ESC, b'[', b'H']),
    (KeyCode::End, &[ESC, b'[', b'F']),
    (KeyCode::Insert, &[ESC, b'[', b'2', b'~']),
    (KeyCode::DeleteKey, &[ESC, b'[', b'3', b'~']),
    (KeyCode::PgUp, &[ESC, b'[', b'5', b'~']),
    (KeyCode::PgDown, &[ESC, b'[', b'6', b'~']),
    (KeyCode::F1, &[ESC, b'O', b'P']),
    (KeyCode::F2, &[ESC, b'O', b'Q']),
    (KeyCode::F3, &[ESC, b'O', b'R']),
    (KeyCode::F4, &[ESC, b'O', b'S']),
    (KeyCode::F5, &[ESC, b'[', b'1', b'5', b'~']),
    (KeyCode::F6, &[ESC, b'[', b'1', b'7', b'~']),
    (KeyCode::F7, &[ESC, b'[', b'1', b'8', b'~']),
    (KeyCode::F8, &[ESC, b'[', b'1', b'9', b'~']),
    (KeyCode::F9, &[ESC, b'[', b'2', b'0', b'~']),
    (KeyCode::F10, &[ESC, b'[', b'2', b'1', b'~']),
    (KeyCode::F11, &[ESC, b'[', b'2', b'3', b'~']),
    (KeyCode::F12, &[ESC, b'[', b'2', b'4', b'~']),
];

/// Decodes what a terminal in non-canonical mode produces for one key press.
///
/// The sequence table is built once in [`UnixKeyDecoder::new`] and never changes.
#[derive(Debug, Clone)]
pub struct UnixKeyDecoder {
    key_code_by_sequence: HashMap<Vec<u8>, KeyCode>,
    sequence_by_key_code: HashMap<KeyCode, Vec<u8>>,
}

impl Default for UnixKeyDecoder {
    fn default() -> Self { Self::new() }
}

impl UnixKeyDecoder {
    #[must_use]
    pub fn new() -> Self {
        let printable = PRINTABLE_ASCII_KEYS
            .iter()
            .map(|(byte, key_code)| (*key_code, vec![*byte]));
        let named = NAMED_KEY_SEQUENCES
            .iter()
            .map(|(key_code, sequence)| (*key_code, sequence.to_vec()));

        let mut key_code_by_sequence = HashMap::new();
        let mut sequence_by_key_code = HashMap::new();
        for (key_code, sequence) in printable.chain(named) {
            key_code_by_sequence.insert(sequence.clone(), key_code);
            sequence_by_key_code.insert(key_code, sequence);
        }

        Self {
            key_code_by_sequence,
            sequence_by_key_code,
        }
    }

    /// The bytes a terminal sends for `key_code` with no modifiers held.
    #[must_use]
    pub fn terminal_sequence(&self, key_code: KeyCode) -> Option<&[u8]> {
        self.sequence_by_key_code.get(&key_code).map(Vec::as_slice)
    }

    /// Every `(sequence, key_code)` pair in the table, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (&[u8], KeyCode)> {
        self.key_code_by_sequence
            .iter()
            .map(|(sequence, key_code)| (sequence.as_slice(), *key_code))
    }
}

impl KeyDecoder for UnixKeyDecoder {
    type RawInput = [u8];

    fn lookup(&self, raw: &[u8]) -> KeyCode {
        self.key_code_by_sequence
            .get(raw)
            .copied()
            .unwrap_or(KeyCode::Unknown)
    }

    /// 1. `[ESC, x]` sets ALT and continues with `[x]`.
    /// 2. A single uppercase letter sets SHIFT and continues lowercase.
    /// 3. Table lookup.
    /// 4. On a miss, a single byte in `0..=26` sets CTRL and is looked up again as
    ///    `byte + 96`.
    ///
    /// Sequences of more than one byte (cursor keys, F-keys) are only looked up, so they
    /// never carry modifiers. CTRL+digit can't be told apart from the digit and
    /// CTRL+SHIFT collapses to CTRL, because terminals don't send anything different.
    fn decode(&self, raw: &[u8]) -> KeyAndModifiers {
        let (mut modifiers, unit) = match raw {
            [ESC, second] => (KeyModifiers::ALT, std::slice::from_ref(second)),
            _ => (KeyModifiers::NONE, raw),
        };

        let folded: [u8; 1];
        let unit = match unit {
            [byte] if byte.is_ascii_uppercase() => {
                modifiers |= KeyModifiers::SHIFT;
                folded = [byte.to_ascii_lowercase()];
                &folded[..]
            }
            _ => unit,
        };

        let key_code = self.lookup(unit);
        if key_code != KeyCode::Unknown {
            return KeyAndModifiers::new(key_code, modifiers);
        }

        match unit {
            [byte] if CTRL_RANGE.contains(byte) => {
                modifiers |= KeyModifiers::CTRL;
                let key_code = self.lookup(&[byte + CTRL_TO_LOWERCASE_OFFSET]);
                KeyAndModifiers::new(key_code, modifiers)
            }
            _ => KeyAndModifiers::new(KeyCode::Unknown, modifiers),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;
    use test_case::test_case;

    #[test_case(&[27, b'a'], KeyCode::A, KeyModifiers::ALT; "alt a")]
    #[test_case(&[b'A'], KeyCode::A, KeyModifiers::SHIFT; "shift a")]
    #[test_case(&[1], KeyCode::A, KeyModifiers::CTRL; "ctrl a")]
    #[test_case(&[26], KeyCode::Z, KeyModifiers::CTRL; "ctrl z")]
    #[test_case(&[0], KeyCode::GraveAccentSign, KeyModifiers::CTRL; "ctrl space")]
    #[test_case(&[27, b'Q'], KeyCode::Q, KeyModifiers::ALT.union(KeyModifiers::SHIFT); "alt shift q")]
    #[test_case(&[27, 3], KeyCode::C, KeyModifiers::ALT.union(KeyModifiers::CTRL); "alt ctrl c")]
    #[test_case(&[27, 27], KeyCode::Escape, KeyModifiers::ALT; "alt escape")]
    #[test_case(&[b'a'], KeyCode::A, KeyModifiers::NONE; "plain a")]
    #[test_case(&[b'7'], KeyCode::Number7, KeyModifiers::NONE; "digit")]
    #[test_case(&[9], KeyCode::I, KeyModifiers::CTRL; "tab is ctrl i")]
    #[test_case(&[10], KeyCode::Enter, KeyModifiers::NONE; "enter wins over ctrl j")]
    #[test_case(&[27], KeyCode::Escape, KeyModifiers::NONE; "escape")]
    #[test_case(&[27, b'[', b'A'], KeyCode::CursorUp, KeyModifiers::NONE; "cursor up")]
    #[test_case(&[27, b'[', b'2', b'4', b'~'], KeyCode::F12, KeyModifiers::NONE; "f12")]
    #[test_case(&[27, b'[', b'9', b'9', b'~'], KeyCode::Unknown, KeyModifiers::NONE; "unknown sequence")]
    #[test_case(&[b'a', b'b', b'c'], KeyCode::Unknown, KeyModifiers::NONE; "pasted text")]
    #[test_case(&[200], KeyCode::Unknown, KeyModifiers::NONE; "high byte")]
    #[test_case(&[27, 200], KeyCode::Unknown, KeyModifiers::ALT; "alt high byte")]
    fn test_decode(raw: &[u8], key_code: KeyCode, modifiers: KeyModifiers) {
        let decoder = UnixKeyDecoder::new();
        assert_eq!(
            decoder.decode(raw),
            KeyAndModifiers::new(key_code, modifiers)
        );
    }

    #[test]
    fn test_every_table_entry_decodes_to_itself_without_modifiers() {
        let decoder = UnixKeyDecoder::new();
        for (sequence, key_code) in decoder.entries() {
            assert_eq!(
                decoder.decode(sequence),
                KeyAndModifiers::from(key_code),
                "sequence {sequence:?}"
            );
        }
    }

    #[test]
    fn test_every_key_code_except_unknown_has_a_sequence() {
        let decoder = UnixKeyDecoder::new();
        for key_code in KeyCode::iter().filter(|it| *it != KeyCode::Unknown) {
            let sequence = decoder.terminal_sequence(key_code).unwrap();
            assert!((1..=8).contains(&sequence.len()));
            assert!(!sequence.contains(&0));
            assert_eq!(decoder.lookup(sequence), key_code);
        }
        assert_eq!(decoder.terminal_sequence(KeyCode::Unknown), None);
    }

    #[test]
    fn test_lookup_does_not_infer_modifiers() {
        let decoder = UnixKeyDecoder::new();
        assert_eq!(decoder.lookup(b"A"), KeyCode::Unknown);
        assert_eq!(decoder.lookup(&[1]), KeyCode::Unknown);
        assert_eq!(decoder.lookup(&[27, b'a']), KeyCode::Unknown);
    }
}
