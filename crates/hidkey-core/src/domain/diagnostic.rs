//! Calibration helpers: which byte/bit changed between two reports.
//!
//! Used to discover the wiring offsets of a new panel.  Press one button at a
//! time and note the `Byte: <n>; Bit: <n>` line it produces; those numbers go
//! straight into the `byte`/`bit` fields of the configuration.
//!
//! # Known limitation
//!
//! Only one bit is reported per changed byte.  Bits are scanned from 0 to 7
//! and the last differing bit wins, so pressing two buttons wired to the same
//! byte at once reports only the higher one.  Press buttons one at a time.
//!
//! # Housekeeping byte
//!
//! Some panels keep a counter or heartbeat in one byte that changes on every
//! report.  The differ skips one configurable byte index so that noise does
//! not drown out real changes.

use std::fmt;

use super::report::{Baseline, BITS_PER_BYTE};

/// Byte index skipped by default: the last byte of an 8-byte report.
pub const DEFAULT_HOUSEKEEPING_BYTE: usize = 7;

/// A changed byte and the bit reported for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitChange {
    pub byte: usize,
    pub bit: u8,
}

impl fmt::Display for BitChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Byte: {}; Bit: {}", self.byte, self.bit)
    }
}

/// Compares `previous` and `current` byte by byte.
///
/// Bytes beyond the shorter report are not compared.  `excluded` names a
/// byte index that is never reported.
pub fn diff_reports(previous: &[u8], current: &[u8], excluded: Option<usize>) -> Vec<BitChange> {
    previous
        .iter()
        .zip(current)
        .enumerate()
        .filter(|(index, _)| Some(*index) != excluded)
        .filter_map(|(byte, (was, now))| {
            let changed = was ^ now;
            if changed == 0 {
                return None;
            }
            let mut reported = 0;
            for bit in 0..BITS_PER_BYTE {
                if changed & (1 << bit) != 0 {
                    reported = bit;
                }
            }
            Some(BitChange { byte, bit: reported })
        })
        .collect()
}

/// Stateful differ for a stream of reports.
#[derive(Debug, Clone, Default)]
pub struct ReportDiffer {
    excluded: Option<usize>,
    baseline: Baseline,
}

impl ReportDiffer {
    pub fn new(excluded: Option<usize>) -> Self {
        Self {
            excluded,
            baseline: Baseline::Uninitialized,
        }
    }

    /// Feeds the next report.  The first report yields nothing.
    pub fn observe(&mut self, report: &[u8]) -> Vec<BitChange> {
        match self.baseline.advance(report) {
            Some(previous) => diff_reports(previous.as_bytes(), report, self.excluded),
            None => Vec::new(),
        }
    }
}

/// Renders a report as the multi-line bit dump used by `hidkey dump`.
///
/// ```text
/// Bitstream:
/// Byte0: 00000000
/// Byte1: 00010000
/// ```
pub fn format_bitstream(report: &[u8]) -> String {
    let mut out = String::from("Bitstream:\n");
    for (index, byte) in report.iter().enumerate() {
        out.push_str(&format!("Byte{index}: {byte:08b}\n"));
    }
    out
}
