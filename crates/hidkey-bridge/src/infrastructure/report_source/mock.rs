//! Mock report source for unit testing.
//!
//! Allows tests to push synthetic reports (and failures) into a session
//! without a HID device.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{copy_report, DeviceReadError, ReportSource};

/// Test-side handle used to feed a [`MockReportSource`].
///
/// Dropping the feed closes the stream; the source then returns
/// [`DeviceReadError::Closed`].
#[derive(Clone)]
pub struct MockReportFeed {
    tx: mpsc::UnboundedSender<Result<Vec<u8>, DeviceReadError>>,
}

impl MockReportFeed {
    /// Queues a report, as if the device had sent it.
    ///
    /// Panics if the source has been dropped.
    pub fn push(&self, report: impl Into<Vec<u8>>) {
        self.tx
            .send(Ok(report.into()))
            .expect("mock report source has been dropped");
    }

    /// Queues a read failure.
    pub fn fail(&self, error: DeviceReadError) {
        self.tx
            .send(Err(error))
            .expect("mock report source has been dropped");
    }
}

/// A [`ReportSource`] fed from a [`MockReportFeed`].
pub struct MockReportSource {
    label: String,
    rx: mpsc::UnboundedReceiver<Result<Vec<u8>, DeviceReadError>>,
}

impl MockReportSource {
    /// Creates a source and the feed that drives it.
    pub fn new(label: &str) -> (Self, MockReportFeed) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                label: label.to_string(),
                rx,
            },
            MockReportFeed { tx },
        )
    }

    /// Creates a source preloaded with `reports` whose stream closes after
    /// the last one.
    pub fn with_reports<I, R>(label: &str, reports: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Vec<u8>>,
    {
        let (source, feed) = Self::new(label);
        for report in reports {
            feed.push(report);
        }
        source
    }
}

#[async_trait]
impl ReportSource for MockReportSource {
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
