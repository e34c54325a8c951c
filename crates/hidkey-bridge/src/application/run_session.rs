//! DeviceSession: the read → detect → emit loop for one device.
//!
//! # Pipeline
//!
//! ```text
//! ReportSource::read_report ──▶ TransitionDetector::observe ──▶ KeyEmitter::tap
//!        (suspends)                    (synchronous)             (one batch/tap)
//! ```
//!
//! A session owns its report buffer, its detector (mapping table plus
//! baseline) and its report source.  The only thing it shares with other
//! sessions is the injector behind the [`KeyEmitter`].
//!
//! # Error policy
//!
//! - A read error or a wrong-length report ends the session.
//! - An injection error is logged and the loop keeps sampling.

use hidkey_core::{DetectorError, KeyMappingTable, TransitionDetector};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::application::emit_keys::KeyEmitter;
use crate::infrastructure::report_source::{DeviceReadError, ReportSource};

/// Fatal session errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Read(#[from] DeviceReadError),
    #[error(transparent)]
    Detector(#[from] DetectorError),
}

/// Everything a session needs to know about its device, resolved up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Configured device name, used in log lines and session reports.
    pub device_name: String,
    /// Declared length of every input report.
    pub report_len: usize,
    /// Bindings for this device, in declaration order.
    pub table: KeyMappingTable,
}

/// One running device pipeline.
pub struct DeviceSession {
    device: String,
    source: Box<dyn ReportSource>,
    detector: TransitionDetector,
    emitter: KeyEmitter,
    buf: Vec<u8>,
    taps: u64,
    injection_failures: u64,
}

impl DeviceSession {
    pub fn new(ctx: SessionContext, source: Box<dyn ReportSource>, emitter: KeyEmitter) -> Self {
        Self {
            buf: vec![0u8; ctx.report_len],
            detector: TransitionDetector::new(ctx.report_len, ctx.table),
            device: ctx.device_name,
            source,
            emitter,
            taps: 0,
            injection_failures: 0,
        }
    }

    /// Configured device name.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Taps accepted by the injector so far.
    pub fn taps(&self) -> u64 {
        self.taps
    }

    /// Taps the injector rejected (fully or partially) so far.
    pub fn injection_failures(&self) -> u64 {
        self.injection_failures
    }

    /// Waits for one report and emits a tap for each bound bit that changed.
    ///
    /// Returns the number of transitions found in the report.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Read`] if the source fails and
    /// [`SessionError::Detector`] if the report has the wrong length.
    /// Injection failures are logged, counted and otherwise ignored.
    pub async fn step(&mut self) -> Result<usize, SessionError> {
        let n = self.source.read_report(&mut self.buf).await?;
        if n > self.buf.len() {
            return Err(DetectorError::LengthMismatch {
                expected: self.buf.len(),
                actual: n,
            }
            .into());
        }

        let transitions = self.detector.observe(&self.buf[..n])?;
        for transition in &transitions {
            debug!(
                "{}: {} {:?} -> tap '{}'",
                self.device, transition.position, transition.edge, transition.key
            );
            match self.emitter.tap(transition.key) {
                Ok(()) => self.taps += 1,
                Err(e) => {
                    self.injection_failures += 1;
                    warn!("{}: failed to inject '{}': {e}", self.device, transition.key);
                }
            }
        }
        Ok(transitions.len())
    }

    /// Runs the loop until a fatal error and returns that error.
    pub async fn run(mut self) -> SessionError {
        info!(
            "{}: session started ({} binding(s), {}-byte reports, source {})",
            self.device,
            self.detector.table().len(),
            self.detector.report_len(),
            self.source.describe()
        );

        loop {
            if let Err(e) = self.step().await {
                error!(
                    "{}: session ended after {} tap(s): {e}",
                    self.device, self.taps
                );
                return e;
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
