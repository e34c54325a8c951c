//! Diagnostic consumers of a report source, used while wiring a panel.
//!
//! - [`DiagnosticMode::Changes`] prints one `Byte: <n>; Bit: <n>` line per
//!   changed byte, skipping the housekeeping byte.  Flip a switch and read off
//!   its position.
//! - [`DiagnosticMode::Dump`] prints every report as a binary bitstream.
//!
//! Neither mode injects keys.

use hidkey_core::domain::diagnostic::format_bitstream;
use hidkey_core::ReportDiffer;
use tracing::info;

use crate::infrastructure::report_source::{DeviceReadError, ReportSource};

/// Diagnostic reads accept any report length up to this size.
const DIAGNOSTIC_BUFFER_LEN: usize = 512;

/// Where diagnostic lines go.
pub trait DiagnosticSink: Send {
    fn write_line(&mut self, line: &str);
}

/// Prints to stdout, one line per call.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl DiagnosticSink for StdoutSink {
    fn write_line(&mut self, line: &str) {
        println!("{line}");
    }
}

impl DiagnosticSink for Vec<String> {
    fn write_line(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

/// What a [`DiagnosticSession`] prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticMode {
    /// Changed bit per byte, compared with the previous report.
    Changes,
    /// Every report in full.
    Dump,
}

/// Reads reports and writes diagnostic lines to a sink.
pub struct DiagnosticSession<S: DiagnosticSink> {
    source: Box<dyn ReportSource>,
    mode: DiagnosticMode,
    differ: ReportDiffer,
    sink: S,
    buf: Vec<u8>,
}

impl<S: DiagnosticSink> DiagnosticSession<S> {
    /// `housekeeping_byte` is excluded from [`DiagnosticMode::Changes`]
    /// output; `None` reports every byte.
    pub fn new(
        source: Box<dyn ReportSource>,
        mode: DiagnosticMode,
        housekeeping_byte: Option<usize>,
        sink: S,
    ) -> Self {
        Self {
            source,
            mode,
            differ: ReportDiffer::new(housekeeping_byte),
            sink,
            buf: vec![0u8; DIAGNOSTIC_BUFFER_LEN],
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Reads one report and writes its lines.  Returns the number of lines
    /// written.
    pub async fn step(&mut self) -> Result<usize, DeviceReadError> {
        let n = self.source.read_report(&mut self.buf).await?;
        let report = &self.buf[..n.min(self.buf.len())];

        match self.mode {
            DiagnosticMode::Changes => {
                let changes = self.differ.observe(report);
                for change in &changes {
                    self.sink.write_line(&change.to_string());
                }
                Ok(changes.len())
            }
            DiagnosticMode::Dump => {
                let text = format_bitstream(report);
                for line in text.lines() {
                    self.sink.write_line(line);
                }
                Ok(report.len() + 1)
            }
        }
    }

    /// Runs until the source fails and returns the error.
    pub async fn run(mut self) -> DeviceReadError {
        info!(
            "diagnosing {} ({:?}); flip switches to see their positions",
            self.source.describe(),
            self.mode
        );
        loop {
            if let Err(e) = self.step().await {
                return e;
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
