//! Bit-transition detection.
//!
//! [`TransitionDetector`] is the stateful heart of a device session.  It keeps
//! the previous report, and for each new report walks the key mapping table
//! in order, comparing the bound bit in both reports.
//!
//! # Toggle semantics
//!
//! Both edges count.  A switch going 0 → 1 and the same switch going 1 → 0
//! each produce one [`Transition`], and each transition is turned into one
//! full key tap downstream.  The physical hold state of a switch is not
//! mirrored as a held key.
//!
//! # Ordering
//!
//! Transitions from one report come out in table order, not in byte/bit
//! order.  Two inputs flipping in the same report therefore always produce
//! their taps in the order the inputs were declared.

use thiserror::Error;
use tracing::trace;

use super::binding::KeyMappingTable;
use super::report::{Baseline, BitPosition, Report};
use crate::keymap::ScanCode;

/// Errors raised while observing a report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectorError {
    /// The report is not the length declared for this device.
    #[error("report length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Direction a bit moved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    /// 0 → 1
    Rising,
    /// 1 → 0
    Falling,
}

/// A bound bit that changed between two reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub position: BitPosition,
    pub key: ScanCode,
    pub edge: Edge,
}

/// Compares two reports against `table`.
///
/// Only bound positions are inspected.  The result is in table order.
pub fn transitions(previous: &Report, current: &Report, table: &KeyMappingTable) -> Vec<Transition> {
    table
        .iter()
        .filter_map(|binding| {
            let was = previous.bit(binding.position);
            let now = current.bit(binding.position);
            let edge = match (was, now) {
                (false, true) => Edge::Rising,
                (true, false) => Edge::Falling,
                _ => return None,
            };
            Some(Transition {
                position: binding.position,
                key: binding.key,
                edge,
            })
        })
        .collect()
}

/// Per-session detector: mapping table plus one-report baseline.
#[derive(Debug, Clone)]
pub struct TransitionDetector {
    report_len: usize,
    table: KeyMappingTable,
    baseline: Baseline,
}

impl TransitionDetector {
    /// Creates a detector for reports of exactly `report_len` bytes.
    pub fn new(report_len: usize, table: KeyMappingTable) -> Self {
        Self {
            report_len,
            table,
            baseline: Baseline::Uninitialized,
        }
    }

    pub fn report_len(&self) -> usize {
        self.report_len
    }

    pub fn table(&self) -> &KeyMappingTable {
        &self.table
    }

    /// `true` once the first report has been seen.
    pub fn is_armed(&self) -> bool {
        self.baseline.is_armed()
    }

    /// Feeds the next report.
    ///
    /// The first report only establishes the baseline and yields nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::LengthMismatch`] when `report` is not
    /// `report_len` bytes long.  The baseline is left unchanged in that case.
    pub fn observe(&mut self, report: &[u8]) -> Result<Vec<Transition>, DetectorError> {
        if report.len() != self.report_len {
            return Err(DetectorError::LengthMismatch {
                expected: self.report_len,
                actual: report.len(),
            });
        }

        let Some(previous) = self.baseline.advance(report) else {
            trace!("baseline captured ({} bytes)", report.len());
            return Ok(Vec::new());
        };

        let current = Report::from(report);
        let found = transitions(&previous, &current, &self.table);
        if !found.is_empty() {
            trace!("{} transition(s) detected", found.len());
        }
        Ok(found)
    }

    /// Drops the baseline so the next report is treated as the first.
    pub fn reset(&mut self) {
        self.baseline.reset();
    }
}
