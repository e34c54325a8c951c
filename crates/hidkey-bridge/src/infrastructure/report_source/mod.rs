//! Report sources: where a session's input reports come from.
//!
//! On real hardware a dedicated reader thread performs blocking `hidapi`
//! reads and forwards each report into a Tokio channel, so the session task
//! only suspends while waiting on that channel.  Nothing else in the session
//! loop ever blocks.
//!
//! # Testability
//!
//! The [`ReportSource`] trait lets tests feed synthetic reports through
//! [`mock::MockReportSource`] without a device attached.

use async_trait::async_trait;
use thiserror::Error;

pub mod hid;
pub mod mock;

/// Error type for report reads.  Always fatal to the reading session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeviceReadError {
    /// The device could not be opened.
    #[error("failed to open device {path}: {reason}")]
    Open { path: String, reason: String },
    /// The underlying read call failed.
    #[error("device read failed: {0}")]
    Read(String),
    /// The stream ended (device removed or reader stopped).
    #[error("report stream closed")]
    Closed,
}

/// A stream of fixed-length input reports from one device.
#[async_trait]
pub trait ReportSource: Send {
    /// Waits for the next report and copies it into `buf`.
    ///
    /// Returns the number of bytes written.  A report longer than `buf` is
    /// truncated; the returned count is then the full report length so the
    /// caller can detect the mismatch.
    async fn read_report(&mut self, buf: &mut [u8]) -> Result<usize, DeviceReadError>;

    /// Human-readable identifier used in log lines.
    fn describe(&self) -> String;
}

/// Copies `report` into `buf`, returning the report's full length.
pub(crate) fn copy_report(report: &[u8], buf: &mut [u8]) -> usize {
    let n = report.len().min(buf.len());
    buf[..n].copy_from_slice(&report[..n]);
    report.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_report_fits() {
        let mut buf = [0u8; 4];
        assert_eq!(copy_report(&[1, 2, 3, 4], &mut buf), 4);
        assert_eq!(buf, [1, 2, 3, 4]);
    }

    #[test]
    fn test_copy_report_truncates_but_reports_full_length() {
        let mut buf = [0u8; 2];
        assert_eq!(copy_report(&[1, 2, 3], &mut buf), 3);
        assert_eq!(buf, [1, 2]);
    }
}
