//! StreamSupervisor: runs every device session as its own Tokio task.
//!
//! Sessions never wait on each other.  When one fails the others keep
//! running; [`StreamSupervisor::join_all`] only returns once every session has
//! ended, with one [`SessionReport`] per session in spawn order.
//!
//! Shutdown (Ctrl-C) goes through a [`ShutdownHandle`], which can be moved
//! into a signal task while the host awaits `join_all`.

use tokio::task::{AbortHandle, JoinHandle};
use tracing::{info, warn};

use crate::application::run_session::{DeviceSession, SessionError};

/// How a session ended.
#[derive(Debug)]
pub enum SessionOutcome {
    /// The session hit a fatal read or detector error.
    Failed(SessionError),
    /// The session was aborted by [`ShutdownHandle::shutdown`].
    Cancelled,
    /// The session task panicked.
    Panicked(String),
}

/// Final state of one session.
#[derive(Debug)]
pub struct SessionReport {
    pub device: String,
    pub outcome: SessionOutcome,
}

/// Aborts every session spawned before the handle was taken.
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    handles: Vec<AbortHandle>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        for handle in &self.handles {
            handle.abort();
        }
    }
}

/// Owns the task handle of every running session.
#[derive(Default)]
pub struct StreamSupervisor {
    sessions: Vec<(String, JoinHandle<SessionError>)>,
}

impl StreamSupervisor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts `session` on the Tokio runtime.
    pub fn spawn(&mut self, session: DeviceSession) {
        let device = session.device().to_string();
        info!("{device}: spawning session");
        let handle = tokio::spawn(session.run());
        self.sessions.push((device, handle));
    }

    /// Number of sessions spawned.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Returns a handle that aborts all sessions spawned so far.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle {
            handles: self
                .sessions
                .iter()
                .map(|(_, handle)| handle.abort_handle())
                .collect(),
        }
    }

    /// Aborts every session.  Use [`Self::join_all`] afterwards to collect
    /// the reports.
    pub fn shutdown(&self) {
        self.shutdown_handle().shutdown();
    }

    /// Waits for every session to end.
    pub async fn join_all(self) -> Vec<SessionReport> {
        let mut reports = Vec::with_capacity(self.sessions.len());

        for (device, handle) in self.sessions {
            let outcome = match handle.await {
                Ok(e) => SessionOutcome::Failed(e),
                Err(e) if e.is_cancelled() => SessionOutcome::Cancelled,
                Err(e) => {
                    warn!("{device}: session task panicked: {e}");
                    SessionOutcome::Panicked(e.to_string())
                }
            };
            reports.push(SessionReport { device, outcome });
        }

        reports
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use hidkey_core::{DigitalInput, KeyMappingTable, ScanCode};

    use super::*;
    use crate::application::emit_keys::KeyEmitter;
    use crate::application::run_session::SessionContext;
    use crate::infrastructure::key_injection::mock::RecordingInjector;
    use crate::infrastructure::report_source::mock::{MockReportFeed, MockReportSource};
    use crate::infrastructure::report_source::DeviceReadError;

    fn session(name: &str, key: &str, injector: Arc<RecordingInjector>) -> (DeviceSession, MockReportFeed) {
        let table = KeyMappingTable::from_inputs(&[DigitalInput {
            name: "DI_K1".to_string(),
            byte: 0,
            bit: 0,
            key: Some(key.to_string()),
        }])
        .unwrap();
        let ctx = SessionContext {
            device_name: name.to_string(),
            report_len: 2,
            table,
        };
        let (source, feed) = MockReportSource::new(name);
        (DeviceSession::new(ctx, Box::new(source), KeyEmitter::new(injector)), feed)
    }

    #[tokio::test]
    async fn test_failing_session_does_not_stop_sibling() {
        // Arrange
        let injector = Arc::new(RecordingInjector::new());
        let (left, left_feed) = session("left", "a", injector.clone());
        let (right, right_feed) = session("right", "b", injector.clone());
        let mut supervisor = StreamSupervisor::new();
        supervisor.spawn(left);
        supervisor.spawn(right);

        // Act: left fails immediately, right keeps processing reports
        left_feed.fail(DeviceReadError::Read("unplugged".to_string()));
        right_feed.push(vec![0, 0]);
        right_feed.push(vec![1, 0]);
        drop(right_feed);
        let reports = supervisor.join_all().await;

        // Assert
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].device, "left");
        assert!(matches!(
            reports[0].outcome,
            SessionOutcome::Failed(SessionError::Read(DeviceReadError::Read(_)))
        ));
        assert_eq!(reports[1].device, "right");
        assert!(matches!(
            reports[1].outcome,
            SessionOutcome::Failed(SessionError::Read(DeviceReadError::Closed))
        ));
        assert_eq!(injector.tapped_keys(), vec![ScanCode::B]);
        drop(left_feed);
    }

    #[tokio::test]
    async fn test_shutdown_cancels_idle_sessions() {
        // Arrange: the feed stays alive so the session waits forever
        let injector = Arc::new(RecordingInjector::new());
        let (idle, _feed) = session("idle", "a", injector);
        let mut supervisor = StreamSupervisor::new();
        supervisor.spawn(idle);

        // Act
        supervisor.shutdown_handle().shutdown();
        let reports = supervisor.join_all().await;

        // Assert
        assert_eq!(reports.len(), 1);
        assert!(matches!(reports[0].outcome, SessionOutcome::Cancelled));
    }

    #[tokio::test]
    async fn test_join_all_on_empty_supervisor_returns_nothing() {
        let supervisor = StreamSupervisor::new();
        assert!(supervisor.is_empty());
        assert!(supervisor.join_all().await.is_empty());
    }
}
