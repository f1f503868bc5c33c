// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{convert::Infallible,
          fmt::{Display, Formatter, Result as FmtResult},
          str::FromStr};

bitflags::bitflags! {
    /// Bitmask of the modifier keys held down with a key press.
    ///
    /// Equality is exact: `SHIFT | CTRL` does not match a callback registered for
    /// `CTRL`. Which bits a decoder can actually report depends on the platform, see
    /// [`UnixKeyDecoder`](crate::UnixKeyDecoder) and
    /// [`WindowsKeyDecoder`](crate::WindowsKeyDecoder).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct KeyModifiers: u8 {
        const SHIFT = 1;
        const ALT = 2;
        const CTRL = 4;
    }
}

impl KeyModifiers {
    pub const NONE: Self = Self::empty();

    /// Display order for [`Display`], independent of bit order.
    const DISPLAY_ORDER: [(Self, &'static str); 3] =
        [(Self::SHIFT, "SHIFT"), (Self::CTRL, "CTRL"), (Self::ALT, "ALT")];
}

/// Space separated names in the order `SHIFT CTRL ALT`, or `NONE` for the empty set.
impl Display for KeyModifiers {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let mut first = true;
        for (flag, name) in Self::DISPLAY_ORDER {
            if self.contains(flag) {
                if !first {
                    f.write_str(" ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Accepts the names in any order. A single unrecognized name turns the whole string
/// into [`KeyModifiers::NONE`].
impl FromStr for KeyModifiers {
    type Err = Infallible;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut acc = Self::NONE;
        for token in input.split_whitespace() {
            match token {
                "SHIFT" => acc |= Self::SHIFT,
                "CTRL" => acc |= Self::CTRL,
                "ALT" => acc |= Self::ALT,
                "NONE" => {}
                _ => return Ok(Self::NONE),
            }
        }
        Ok(acc)
    }
}

#[must_use]
pub fn key_modifiers_to_string(modifiers: KeyModifiers) -> String { modifiers.to_string() }

#[must_use]
pub fn str_to_key_modifiers(modifiers_str: &str) -> KeyModifiers {
    match KeyModifiers::from_str(modifiers_str) {
        Ok(it) => it,
        Err(never) => match never {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case(KeyModifiers::NONE, "NONE")]
    #[test_case(KeyModifiers::SHIFT, "SHIFT")]
    #[test_case(KeyModifiers::ALT | KeyModifiers::SHIFT, "SHIFT ALT")]
    #[test_case(KeyModifiers::ALT | KeyModifiers::CTRL, "CTRL ALT")]
    #[test_case(KeyModifiers::all(), "SHIFT CTRL ALT")]
    fn test_display(modifiers: KeyModifiers, expected: &str) {
        assert_eq!(key_modifiers_to_string(modifiers), expected);
    }

    #[test_case("SHIFT CTRL ALT", KeyModifiers::all())]
    #[test_case("ALT SHIFT", KeyModifiers::ALT | KeyModifiers::SHIFT)]
    #[test_case("  CTRL  ", KeyModifiers::CTRL)]
    #[test_case("NONE", KeyModifiers::NONE)]
    #[test_case("", KeyModifiers::NONE)]
    #[test_case("SHIFT META", KeyModifiers::NONE)]
    #[test_case("shift", KeyModifiers::NONE)]
    fn test_parse(input: &str, expected: KeyModifiers) {
        assert_eq!(str_to_key_modifiers(input), expected);
    }

    #[test]
    fn test_union_and_membership() {
        let modifiers = KeyModifiers::SHIFT | KeyModifiers::CTRL;
        assert!(modifiers.contains(KeyModifiers::SHIFT));
        assert!(modifiers.contains(KeyModifiers::CTRL));
        assert!(!modifiers.contains(KeyModifiers::ALT));
        assert_ne!(modifiers, KeyModifiers::CTRL);
        assert_eq!(modifiers.bits(), 5);
    }
}
