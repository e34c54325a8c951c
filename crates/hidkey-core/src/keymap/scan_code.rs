//! PC/AT "set 1" keyboard scan codes for the key alphabet a panel input can
//! be bound to.
//!
//! # What is a scan code? (for beginners)
//!
//! A keyboard does not send letters to the computer.  It sends a *scan code*:
//! a number that identifies the physical key position.  The operating system
//! later turns the scan code into a character using the active layout.
//!
//! Windows `SendInput` can inject a key either by its *virtual key* (a logical
//! key, layout-aware) or by its *scan code* (a physical position).  Games that
//! read DirectInput or raw input usually ignore virtual keys, so this crate
//! injects by scan code only.
//!
//! | Key | Scan code |
//! |-----|-----------|
//! | q   | 0x10      |
//! | a   | 0x1E      |
//! | z   | 0x2C      |
//!
//! Notice the values follow the keyboard rows (q w e r t y ...), not the
//! alphabet.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a textual key identifier is not in the alphabet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown key identifier {0:?}; expected a single letter a-z")]
pub struct UnknownKey(pub String);

/// Set-1 make code of a letter key.
///
/// The numeric value of each variant is the scan code placed in `wScan`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u16)]
pub enum ScanCode {
    // Top row
    Q = 0x10,
    W = 0x11,
    E = 0x12,
    R = 0x13,
    T = 0x14,
    Y = 0x15,
    U = 0x16,
    I = 0x17,
    O = 0x18,
    P = 0x19,

    // Home row
    A = 0x1E,
    S = 0x1F,
    D = 0x20,
    F = 0x21,
    G = 0x22,
    H = 0x23,
    J = 0x24,
    K = 0x25,
    L = 0x26,

    // Bottom row
    Z = 0x2C,
    X = 0x2D,
    C = 0x2E,
    V = 0x2F,
    B = 0x30,
    N = 0x31,
    M = 0x32,
}

impl ScanCode {
    /// Every supported key, in alphabetical order.
    pub const ALL: [ScanCode; 26] = [
        ScanCode::A,
        ScanCode::B,
        ScanCode::C,
        ScanCode::D,
        ScanCode::E,
        ScanCode::F,
        ScanCode::G,
        ScanCode::H,
        ScanCode::I,
        ScanCode::J,
        ScanCode::K,
        ScanCode::L,
        ScanCode::M,
        ScanCode::N,
        ScanCode::O,
        ScanCode::P,
        ScanCode::Q,
        ScanCode::R,
        ScanCode::S,
        ScanCode::T,
        ScanCode::U,
        ScanCode::V,
        ScanCode::W,
        ScanCode::X,
        ScanCode::Y,
        ScanCode::Z,
    ];

    /// Returns the raw scan code value.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Converts a raw scan code back to a [`ScanCode`].
    ///
    /// Returns `None` for codes outside the letter alphabet.
    pub fn from_u16(value: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|code| code.as_u16() == value)
    }

    /// Resolves a single-letter key name.  Letters are accepted in either case.
    pub fn from_letter(letter: char) -> Option<Self> {
        if !letter.is_ascii_alphabetic() {
            return None;
        }
        let index = (letter.to_ascii_lowercase() as u8 - b'a') as usize;
        Self::ALL.get(index).copied()
    }

    /// The lowercase letter this key produces on a US layout.
    pub fn letter(self) -> char {
        let index = Self::ALL
            .iter()
            .position(|code| *code == self)
            .unwrap_or_default();
        (b'a' + index as u8) as char
    }
}

impl FromStr for ScanCode {
    type Err = UnknownKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Self::from_letter(letter).ok_or_else(|| UnknownKey(s.to_string())),
            _ => Err(UnknownKey(s.to_string())),
        }
    }
}

impl fmt::Display for ScanCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_scan_code_values() {
        assert_eq!(ScanCode::A.as_u16(), 0x1E);
        assert_eq!(ScanCode::Q.as_u16(), 0x10);
        assert_eq!(ScanCode::Z.as_u16(), 0x2C);
        assert_eq!(ScanCode::M.as_u16(), 0x32);
    }

    #[test]
    fn test_all_is_alphabetical() {
        for (index, code) in ScanCode::ALL.iter().enumerate() {
            assert_eq!(code.letter(), (b'a' + index as u8) as char);
        }
    }

    #[test]
    fn test_all_scan_codes_are_distinct() {
        let mut values: Vec<u16> = ScanCode::ALL.iter().map(|c| c.as_u16()).collect();
        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), ScanCode::ALL.len());
    }

    #[test]
    fn test_from_u16_rejects_non_letter_codes() {
        assert_eq!(ScanCode::from_u16(0x1E), Some(ScanCode::A));
        assert_eq!(ScanCode::from_u16(0x01), None); // Escape
        assert_eq!(ScanCode::from_u16(0x39), None); // Space
    }

    #[test]
    fn test_parse_single_letter() {
        assert_eq!("a".parse::<ScanCode>(), Ok(ScanCode::A));
        assert_eq!("K".parse::<ScanCode>(), Ok(ScanCode::K));
    }

    #[test]
    fn test_parse_rejects_words_digits_and_empty() {
        assert!("".parse::<ScanCode>().is_err());
        assert!("ab".parse::<ScanCode>().is_err());
        assert!("7".parse::<ScanCode>().is_err());
        assert!("F1".parse::<ScanCode>().is_err());
        assert!(" a".parse::<ScanCode>().is_err());
    }

    #[test]
    fn test_unknown_key_message_names_the_input() {
        let err = "enter".parse::<ScanCode>().unwrap_err();
        assert!(err.to_string().contains("\"enter\""));
    }

    #[test]
    fn test_display_is_lowercase_letter() {
        assert_eq!(ScanCode::W.to_string(), "w");
    }
}
