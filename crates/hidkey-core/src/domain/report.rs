//! Input reports, bit coordinates, and the one-step baseline.
//!
//! # What is an input report? (for beginners)
//!
//! A HID device describes its current state as a small, fixed-size block of
//! bytes called an *input report*.  A button panel typically packs one button
//! per bit: byte 6, bit 4 might be "ignition", byte 6, bit 5 "lights".  The
//! device sends a fresh report every time any input changes, so comparing two
//! consecutive reports tells us exactly which switches moved.
//!
//! ```text
//! byte 6 before:  0b0000_0000
//! byte 6 after:   0b0001_0000
//!                      ^ bit 4 flipped 0 -> 1
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of addressable bits in a report byte.
pub const BITS_PER_BYTE: u8 = 8;

/// A (byte, bit) coordinate inside a report.
///
/// `bit` counts from the least-significant bit of the byte, so bit 0 is
/// `0b0000_0001` and bit 7 is `0b1000_0000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BitPosition {
    pub byte: usize,
    pub bit: u8,
}

impl BitPosition {
    pub const fn new(byte: usize, bit: u8) -> Self {
        Self { byte, bit }
    }

    /// `true` when `bit` addresses a real bit of a byte (0–7).
    pub fn has_valid_bit(&self) -> bool {
        self.bit < BITS_PER_BYTE
    }

    /// Mask selecting this bit within its byte.
    pub fn mask(&self) -> u8 {
        1u8 << (self.bit % BITS_PER_BYTE)
    }
}

impl fmt::Display for BitPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "byte {} bit {}", self.byte, self.bit)
    }
}

/// One snapshot of a device's input state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report(Vec<u8>);

impl Report {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// All-zero report of `len` bytes.
    pub fn zeroed(len: usize) -> Self {
        Self(vec![0; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Reads one bit.  A byte index past the end reads as 0.
    pub fn bit(&self, position: BitPosition) -> bool {
        self.0
            .get(position.byte)
            .is_some_and(|byte| byte & position.mask() != 0)
    }

    /// Overwrites the contents with `bytes`, reusing the allocation.
    pub fn copy_from(&mut self, bytes: &[u8]) {
        self.0.clear();
        self.0.extend_from_slice(bytes);
    }
}

impl From<&[u8]> for Report {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

/// Previous-report state shared by the detector and the diagnostic differ.
///
/// A session starts `Uninitialized`; the first report only arms it.  There is
/// no way to hold a baseline buffer without having received a report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Baseline {
    #[default]
    Uninitialized,
    Armed(Report),
}

impl Baseline {
    pub fn is_armed(&self) -> bool {
        matches!(self, Baseline::Armed(_))
    }

    /// Stores `current` as the new baseline.
    ///
    /// Returns the report it replaced, or `None` if this was the first one.
    pub fn advance(&mut self, current: &[u8]) -> Option<Report> {
        match self {
            Baseline::Uninitialized => {
                *self = Baseline::Armed(Report::from(current));
                None
            }
            Baseline::Armed(previous) => {
                let replaced = previous.clone();
                previous.copy_from(current);
                Some(replaced)
            }
        }
    }

    /// Forgets the baseline; the next report arms it again.
    pub fn reset(&mut self) {
        *self = Baseline::Uninitialized;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_reads_from_least_significant_end() {
        let report = Report::new(vec![0, 0, 0, 0, 0, 0, 0b0001_0000, 0]);
        assert!(report.bit(BitPosition::new(6, 4)));
        assert!(!report.bit(BitPosition::new(6, 3)));
        assert!(!report.bit(BitPosition::new(5, 4)));
    }

    #[test]
    fn test_bit_past_end_reads_as_zero() {
        let report = Report::new(vec![0xFF; 2]);
        assert!(!report.bit(BitPosition::new(9, 0)));
    }

    #[test]
    fn test_mask_values() {
        assert_eq!(BitPosition::new(0, 0).mask(), 0b0000_0001);
        assert_eq!(BitPosition::new(0, 7).mask(), 0b1000_0000);
    }

    #[test]
    fn test_has_valid_bit() {
        assert!(BitPosition::new(3, 7).has_valid_bit());
        assert!(!BitPosition::new(3, 8).has_valid_bit());
    }

    #[test]
    fn test_baseline_first_advance_arms_without_previous() {
        // Arrange
        let mut baseline = Baseline::default();

        // Act
        let previous = baseline.advance(&[1, 2, 3]);

        // Assert
        assert!(previous.is_none());
        assert_eq!(baseline, Baseline::Armed(Report::new(vec![1, 2, 3])));
    }

    #[test]
    fn test_baseline_second_advance_returns_previous_report() {
        let mut baseline = Baseline::default();
        baseline.advance(&[1, 2, 3]);

        let previous = baseline.advance(&[4, 5, 6]);

        assert_eq!(previous, Some(Report::new(vec![1, 2, 3])));
        assert_eq!(baseline, Baseline::Armed(Report::new(vec![4, 5, 6])));
    }

    #[test]
    fn test_baseline_reset_disarms() {
        let mut baseline = Baseline::default();
        baseline.advance(&[0]);
        baseline.reset();
        assert!(!baseline.is_armed());
    }
}
