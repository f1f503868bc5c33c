// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::KeyCode;

/// Every printable ASCII byte except `A..=Z`, which decode as lowercase plus SHIFT.
/// Shared by the terminal and console tables, where each byte stands for itself.
pub(crate) const PRINTABLE_ASCII_KEYS: [(u8, KeyCode); 69] = [
    (b' ', KeyCode::Space),
    (b'!', KeyCode::ExclamationMark),
    (b'"', KeyCode::QuotationMark),
    (b'#', KeyCode::HashtagSign),
    (b'$', KeyCode::DollarSign),
    (b'%', KeyCode::PercentSign),
    (b'&', KeyCode::Ampersand),
    (b'\'', KeyCode::Apostrophe),
    (b'(', KeyCode::OpeningParenthesis),
    (b')', KeyCode::ClosingParenthesis),
    (b'*', KeyCode::Star),
    (b'+', KeyCode::Plus),
    (b',', KeyCode::Comma),
    (b'-', KeyCode::Minus),
    (b'.', KeyCode::Dot),
    (b'/', KeyCode::RightSlash),
    (b'0', KeyCode::Number0),
    (b'1', KeyCode::Number1),
    (b'2', KeyCode::Number2),
    (b'3', KeyCode::Number3),
    (b'4', KeyCode::Number4),
    (b'5', KeyCode::Number5),
    (b'6', KeyCode::Number6),
    (b'7', KeyCode::Number7),
    (b'8', KeyCode::Number8),
    (b'9', KeyCode::Number9),
    (b':', KeyCode::Colon),
    (b';', KeyCode::Semicolon),
    (b'<', KeyCode::LeftAngleBracket),
    (b'=', KeyCode::EqualSign),
    (b'>', KeyCode::RightAngleBracket),
    (b'?', KeyCode::QuestionMark),
    (b'@', KeyCode::At),
    (b'[', KeyCode::LeftSquareBracket),
    (b'\\', KeyCode::BackSlash),
    (b']', KeyCode::RightSquareBracket),
    (b'^', KeyCode::Caret),
    (b'_', KeyCode::UnderscoreSign),
    (b'`', KeyCode::GraveAccentSign),
    (b'a', KeyCode::A),
    (b'b', KeyCode::B),
    (b'c', KeyCode::C),
    (b'd', KeyCode::D),
    (b'e', KeyCode::E),
    (b'f', KeyCode::F),
    (b'g', KeyCode::G),
    (b'h', KeyCode::H),
    (b'i', KeyCode::I),
    (b'j', KeyCode::J),
    (b'k', KeyCode::K),
    (b'l', KeyCode::L),
    (b'm', KeyCode::M),
    (b'n', KeyCode::N),
    (b'o', KeyCode::O),
    (b'p', KeyCode::P),
    (b'q', KeyCode::Q),
    (b'r', KeyCode::R),
    (b's', KeyCode::S),
    (b't', KeyCode::T),
    (b'u', KeyCode::U),
    (b'v', KeyCode::V),
    (b'w', KeyCode::W),
    (b'x', KeyCode::X),
    (b'y', KeyCode::Y),
    (b'z', KeyCode::Z),
    (b'{', KeyCode::LeftCurlyBracket),
    (b'|', KeyCode::VerticalBar),
    (b'}', KeyCode::RightCurlyBracket),
    (b'~', KeyCode::Tilda),
];
