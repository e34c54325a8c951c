//! hidapi-backed report source.
//!
//! `hidapi` reads are blocking, so each opened device gets its own reader
//! thread.  The thread loops on `HidDevice::read` and forwards every report
//! over a bounded Tokio channel; [`HidReportSource::read_report`] awaits the
//! channel.
//!
//! ```text
//!  reader thread                       session task
//!  ─────────────                       ────────────
//!  HidDevice::read ──blocking_send──▶  rx.recv().await ──▶ detector
//! ```
//!
//! The thread ends after forwarding a read error, or on the first report it
//! cannot deliver because the session dropped its receiver.

use std::ffi::CString;

use async_trait::async_trait;
use hidapi::{HidApi, HidDevice};
use tokio::sync::mpsc;
use tracing::{debug, info};

use super::{copy_report, DeviceReadError, ReportSource};

/// Scratch buffer used by the reader thread.  Larger than any report a
/// button panel sends, so oversized reports arrive whole and can be rejected.
const READ_BUFFER_LEN: usize = 512;

/// Reports buffered between the reader thread and the session.
const CHANNEL_CAPACITY: usize = 64;

type ReportResult = Result<Vec<u8>, DeviceReadError>;

/// A [`ReportSource`] reading from one HID device.
pub struct HidReportSource {
    label: String,
    rx: mpsc::Receiver<ReportResult>,
}

impl HidReportSource {
    /// Opens the device at `path` and starts its reader thread.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceReadError::Open`] if the path is not a valid C string,
    /// the device cannot be opened, or the reader thread cannot be spawned.
    pub fn open(api: &HidApi, path: &str, label: &str) -> Result<Self, DeviceReadError> {
        let open_error = |reason: String| DeviceReadError::Open {
            path: path.to_string(),
            reason,
        };

        let c_path = CString::new(path).map_err(|e| open_error(e.to_string()))?;
        let device = api.open_path(&c_path).map_err(|e| open_error(e.to_string()))?;
        device
            .set_blocking_mode(true)
            .map_err(|e| open_error(e.to_string()))?;

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        std::thread::Builder::new()
            .name(format!("hidkey-reader-{label}"))
            .spawn(move || reader_loop(device, tx))
            .map_err(|e| open_error(e.to_string()))?;

        info!("opened {label} at {path}");
        Ok(Self {
            label: label.to_string(),
            rx,
        })
    }
}

#[async_trait]
impl ReportSource for HidReportSource {
    async fn read_report(&mut self, buf: &mut [u8]) -> Result<usize, DeviceReadError> {
        match self.rx.recv().await {
            Some(Ok(report)) => Ok(copy_report(&report, buf)),
            Some(Err(e)) => Err(e),
            None => Err(DeviceReadError::Closed),
        }
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

/// Blocking read loop executed on the reader thread.
fn reader_loop(device: HidDevice, tx: mpsc::Sender<ReportResult>) {
    let mut buf = vec![0u8; READ_BUFFER_LEN];

    loop {
        let item = match device.read(&mut buf) {
            // Blocking mode only returns 0 on a spurious wake-up.
            Ok(0) => continue,
            Ok(n) => Ok(buf[..n].to_vec()),
            Err(e) => Err(DeviceReadError::Read(e.to_string())),
        };
        let fatal = item.is_err();

        if tx.blocking_send(item).is_err() {
            debug!("report receiver dropped; reader thread exiting");
            break;
        }
        if fatal {
            break;
        }
    }
}
