//! End-to-end tests: config text → sessions → injected key batches.
//!
//! No hardware is involved.  Reports come from `MockReportSource` and taps
//! land in a `RecordingInjector`.

use std::sync::Arc;

use tokio_test::{assert_err, assert_ok};

use hidkey_bridge::application::emit_keys::KeyEmitter;
use hidkey_bridge::application::run_session::{DeviceSession, SessionError};
use hidkey_bridge::application::supervise::{SessionOutcome, StreamSupervisor};
use hidkey_bridge::infrastructure::key_injection::mock::RecordingInjector;
use hidkey_bridge::infrastructure::report_source::mock::MockReportSource;
use hidkey_bridge::infrastructure::report_source::DeviceReadError;
use hidkey_bridge::infrastructure::storage::config::{parse_config, AppConfig};
use hidkey_core::{DetectorError, KeyDescriptor, KeyDirection, ScanCode};

const TWO_PANELS: &str = r#"
[[devices]]
name = "left"
vendor_id = 121
product_id = 6

[[devices.inputs]]
name = "DI_K1"
byte = 6
bit = 4
key = "a"

[[devices.inputs]]
name = "DI_K3"
byte = 6
bit = 6
key = "c"

[[devices.inputs]]
name = "DI_K2"
byte = 6
bit = 5
key = "b"

[[devices]]
name = "right"
report_length = 4

[[devices.inputs]]
name = "DI_K1"
byte = 0
bit = 0
key = "z"
"#;

fn panels() -> AppConfig {
    let cfg = assert_ok!(parse_config(TWO_PANELS));
    assert_ok!(cfg.validate());
    cfg
}

fn byte6(value: u8) -> Vec<u8> {
    let mut report = vec![0u8; 8];
    report[6] = value;
    report
}

fn session_for(
    cfg: &AppConfig,
    name: &str,
    reports: Vec<Vec<u8>>,
    injector: &Arc<RecordingInjector>,
) -> DeviceSession {
    let ctx = assert_ok!(cfg.device(name).expect("configured").session_context());
    let source = MockReportSource::with_reports(name, reports);
    DeviceSession::new(ctx, Box::new(source), KeyEmitter::new(injector.clone()))
}

#[tokio::test]
async fn toggle_on_and_off_taps_the_bound_key_each_time() {
    // Arrange
    let cfg = panels();
    let injector = Arc::new(RecordingInjector::new());
    let session = session_for(
        &cfg,
        "left",
        vec![byte6(0), byte6(0b0001_0000), byte6(0b0001_0000), byte6(0)],
        &injector,
    );

    // Act
    let err = session.run().await;

    // Assert
    assert_eq!(err, SessionError::Read(DeviceReadError::Closed));
    let tap_a = vec![
        KeyDescriptor::new(ScanCode::A, KeyDirection::Down),
        KeyDescriptor::new(ScanCode::A, KeyDirection::Up),
    ];
    assert_eq!(injector.batches(), vec![tap_a.clone(), tap_a]);
}

#[tokio::test]
async fn simultaneous_flips_follow_declaration_order() {
    // Arrange: DI_K3 (bit 6) is declared before DI_K2 (bit 5)
    let cfg = panels();
    let injector = Arc::new(RecordingInjector::new());
    let session = session_for(&cfg, "left", vec![byte6(0), byte6(0b0111_0000)], &injector);

    // Act
    session.run().await;

    // Assert
    assert_eq!(injector.tapped_keys(), vec![ScanCode::A, ScanCode::C, ScanCode::B]);
}

#[tokio::test]
async fn unbound_bits_never_tap() {
    let cfg = panels();
    let injector = Arc::new(RecordingInjector::new());
    let session = session_for(
        &cfg,
        "left",
        vec![byte6(0), byte6(0b1000_1111), vec![0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0b1000_1111, 0xFF]],
        &injector,
    );

    session.run().await;

    assert!(injector.batches().is_empty());
}

#[tokio::test]
async fn wrong_length_report_ends_only_that_session() {
    // Arrange
    let cfg = panels();
    let injector = Arc::new(RecordingInjector::new());
    let left = session_for(&cfg, "left", vec![byte6(0), vec![0u8; 3]], &injector);
    let right = session_for(&cfg, "right", vec![vec![0, 0, 0, 0], vec![1, 0, 0, 0]], &injector);
    let mut supervisor = StreamSupervisor::new();
    supervisor.spawn(left);
    supervisor.spawn(right);

    // Act
    let reports = supervisor.join_all().await;

    // Assert
    assert!(matches!(
        &reports[0].outcome,
        SessionOutcome::Failed(SessionError::Detector(DetectorError::LengthMismatch {
            expected: 8,
            actual: 3
        }))
    ));
    assert!(matches!(
        &reports[1].outcome,
        SessionOutcome::Failed(SessionError::Read(DeviceReadError::Closed))
    ));
    assert_eq!(injector.tapped_keys(), vec![ScanCode::Z]);
}

#[tokio::test]
async fn session_keeps_sampling_after_partial_injection() {
    // Arrange
    let cfg = panels();
    let injector = Arc::new(RecordingInjector::accepting(1));
    let mut session = session_for(
        &cfg,
        "left",
        vec![byte6(0), byte6(0b0001_0000), byte6(0)],
        &injector,
    );

    // Act
    assert_ok!(session.step().await);
    assert_ok!(session.step().await);
    assert_ok!(session.step().await);
    let end = session.step().await;

    // Assert
    assert_err!(&end);
    assert_eq!(session.injection_failures(), 2);
    assert_eq!(injector.batches().len(), 2);
}
