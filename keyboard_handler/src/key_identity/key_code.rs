// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{fmt::{Display, Formatter, Result as FmtResult},
          str::FromStr};
use strum_macros::{EnumIter, EnumString, IntoStaticStr};

/// Every logical key the decoders can recognize.
///
/// The variant order is the declaration order of the printable ASCII range, followed by
/// navigation keys and function keys. It is only used for iteration (see
/// [`strum::IntoEnumIterator`]), it carries no meaning for matching.
///
/// Letters are case-less: `A` is reported for both `a` and `A`, with
/// [`KeyModifiers::SHIFT`](crate::KeyModifiers::SHIFT) set for the latter.
///
/// The [`std::fmt::Display`] and [`FromStr`] impls use the strings below. Use
/// [`key_code_to_str`] and [`str_to_key_code`] for conversions that never fail.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
pub enum KeyCode {
    #[default]
    #[strum(serialize = "UNKNOWN")]
    Unknown,
    #[strum(serialize = "!")]
    ExclamationMark,
    #[strum(serialize = "\"")]
    QuotationMark,
    #[strum(serialize = "#")]
    HashtagSign,
    #[strum(serialize = "$")]
    DollarSign,
    #[strum(serialize = "%")]
    PercentSign,
    #[strum(serialize = "&")]
    Ampersand,
    #[strum(serialize = "'")]
    Apostrophe,
    #[strum(serialize = "(")]
    OpeningParenthesis,
    #[strum(serialize = ")")]
    ClosingParenthesis,
    #[strum(serialize = "*")]
    Star,
    #[strum(serialize = "+")]
    Plus,
    #[strum(serialize = ",")]
    Comma,
    #[strum(serialize = "-")]
    Minus,
    #[strum(serialize = ".")]
    Dot,
    #[strum(serialize = "/")]
    RightSlash,
    #[strum(serialize = "NUMBER_0")]
    Number0,
    #[strum(serialize = "NUMBER_1")]
    Number1,
    #[strum(serialize = "NUMBER_2")]
    Number2,
    #[strum(serialize = "NUMBER_3")]
    Number3,
    #[strum(serialize = "NUMBER_4")]
    Number4,
    #[strum(serialize = "NUMBER_5")]
    Number5,
    #[strum(serialize = "NUMBER_6")]
    Number6,
    #[strum(serialize = "NUMBER_7")]
    Number7,
    #[strum(serialize = "NUMBER_8")]
    Number8,
    #[strum(serialize = "NUMBER_9")]
    Number9,
    #[strum(serialize = ":")]
    Colon,
    #[strum(serialize = ";")]
    Semicolon,
    #[strum(serialize = "<")]
    LeftAngleBracket,
    #[strum(serialize = "=")]
    EqualSign,
    #[strum(serialize = ">")]
    RightAngleBracket,
    #[strum(serialize = "?")]
    QuestionMark,
    #[strum(serialize = "@")]
    At,
    #[strum(serialize = "[")]
    LeftSquareBracket,
    #[strum(serialize = "\\")]
    BackSlash,
    #[strum(serialize = "]")]
    RightSquareBracket,
    #[strum(serialize = "^")]
    Caret,
    #[strum(serialize = "_")]
    UnderscoreSign,
    #[strum(serialize = "`")]
    GraveAccentSign,
    #[strum(serialize = "a")]
    A,
    #[strum(serialize = "b")]
    B,
    #[strum(serialize = "c")]
    C,
    #[strum(serialize = "d")]
    D,
    #[strum(serialize = "e")]
    E,
    #[strum(serialize = "f")]
    F,
    #[strum(serialize = "g")]
    G,
    #[strum(serialize = "h")]
    H,
    #[strum(serialize = "i")]
    I,
    #[strum(serialize = "j")]
    J,
    #[strum(serialize = "k")]
    K,
    #[strum(serialize = "l")]
    L,
    #[strum(serialize = "m")]
    M,
    #[strum(serialize = "n")]
    N,
    #[strum(serialize = "o")]
    O,
    #[strum(serialize = "p")]
    P,
    #[strum(serialize = "q")]
    Q,
    #[strum(serialize = "r")]
    R,
    #[strum(serialize = "s")]
    S,
    #[strum(serialize = "t")]
    T,
    #[strum(serialize = "u")]
    U,
    #[strum(serialize = "v")]
    V,
    #[strum(serialize = "w")]
    W,
    #[strum(serialize = "x")]
    X,
    #[strum(serialize = "y")]
    Y,
    #[strum(serialize = "z")]
    Z,
    #[strum(serialize = "{")]
    LeftCurlyBracket,
    #[strum(serialize = "|")]
    VerticalBar,
    #[strum(serialize = "}")]
    RightCurlyBracket,
    #[strum(serialize = "~")]
    Tilda,
    #[strum(serialize = "CURSOR_UP")]
    CursorUp,
    #[strum(serialize = "CURSOR_DOWN")]
    CursorDown,
    #[strum(serialize = "CURSOR_LEFT")]
    CursorLeft,
    #[strum(serialize = "CURSOR_RIGHT")]
    CursorRight,
    #[strum(serialize = "ESCAPE")]
    Escape,
    #[strum(serialize = "SPACE")]
    Space,
    #[strum(serialize = "ENTER")]
    Enter,
    #[strum(serialize = "BACK_SPACE")]
    BackSpace,
    #[strum(serialize = "DELETE")]
    DeleteKey,
    #[strum(serialize = "END")]
    End,
    #[strum(serialize = "PAGE_DOWN")]
    PgDown,
    #[strum(serialize = "PAGE_UP")]
    PgUp,
    #[strum(serialize = "HOME")]
    Home,
    #[strum(serialize = "INSERT")]
    Insert,
    #[strum(serialize = "F1")]
    F1,
    #[strum(serialize = "F2")]
    F2,
    #[strum(serialize = "F3")]
    F3,
    #[strum(serialize = "F4")]
    F4,
    #[strum(serialize = "F5")]
    F5,
    #[strum(serialize = "F6")]
    F6,
    #[strum(serialize = "F7")]
    F7,
    #[strum(serialize = "F8")]
    F8,
    #[strum(serialize = "F9")]
    F9,
    #[strum(serialize = "F10")]
    F10,
    #[strum(serialize = "F11")]
    F11,
    #[strum(serialize = "F12")]
    F12,
}

/// Written by hand: strum's `Display` derive reads `serialize` strings as format
/// strings, which rejects the bare `{` and `}` keys.
impl Display for KeyCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult { f.write_str(key_code_to_str(*self)) }
}

/// Display string for `key_code`, e.g. `"a"`, `"NUMBER_1"`, `"CURSOR_UP"`.
#[must_use]
pub fn key_code_to_str(key_code: KeyCode) -> &'static str { key_code.into() }

/// Inverse of [`key_code_to_str`]. Strings that name no key give [`KeyCode::Unknown`].
#[must_use]
pub fn str_to_key_code(key_code_str: &str) -> KeyCode {
    KeyCode::from_str(key_code_str).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;
    use test_case::test_case;

    #[test_case(KeyCode::A, "a")]
    #[test_case(KeyCode::Z, "z")]
    #[test_case(KeyCode::Number1, "NUMBER_1")]
    #[test_case(KeyCode::CursorUp, "CURSOR_UP")]
    #[test_case(KeyCode::BackSlash, "\\")]
    #[test_case(KeyCode::LeftCurlyBracket, "{")]
    #[test_case(KeyCode::RightCurlyBracket, "}")]
    #[test_case(KeyCode::F12, "F12")]
    #[test_case(KeyCode::Unknown, "UNKNOWN")]
    fn test_key_code_to_str(key_code: KeyCode, expected: &str) {
        assert_eq!(key_code_to_str(key_code), expected);
        assert_eq!(key_code.to_string(), expected);
    }

    #[test]
    fn test_every_key_code_converts_back_from_its_string() {
        for key_code in KeyCode::iter() {
            assert_eq!(str_to_key_code(key_code_to_str(key_code)), key_code);
        }
    }

    #[test_case("")]
    #[test_case("A")]
    #[test_case("cursor_up")]
    #[test_case("F13")]
    fn test_unknown_strings_give_unknown(input: &str) {
        assert_eq!(str_to_key_code(input), KeyCode::Unknown);
    }

    #[test]
    fn test_key_code_count() {
        // Unknown, 68 printable keys, 14 navigation and editing keys, 12 function keys.
        assert_eq!(KeyCode::iter().count(), 1 + 68 + 14 + 12);
    }

    #[test]
    fn test_declaration_order_is_total() {
        assert!(KeyCode::Unknown < KeyCode::ExclamationMark);
        assert!(KeyCode::Z < KeyCode::LeftCurlyBracket);
        assert!(KeyCode::Insert < KeyCode::F1);
    }
}
