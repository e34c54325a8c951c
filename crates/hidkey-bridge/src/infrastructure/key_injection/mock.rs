//! Recording key injector for tests.
//!
//! # Why a recording injector?
//!
//! The real injector presses keys on the machine running the tests, and the
//! result cannot be observed from Rust code.  `RecordingInjector` stores every
//! batch in a `Mutex<Vec<...>>` instead, so assertions can inspect exactly
//! what was submitted, in what order, and that each pair stayed together.
//!
//! # Usage in tests
//!
//! ```ignore
//! let injector = Arc::new(RecordingInjector::new());
//! let emitter = KeyEmitter::new(injector.clone());
//!
//! emitter.tap(ScanCode::A).unwrap();
//!
//! assert_eq!(injector.batches().len(), 1);
//! ```
//!
//! # Short acceptance
//!
//! [`RecordingInjector::accepting`] builds an injector that reports only `n`
//! descriptors as accepted, to exercise the partial-injection path.

use std::sync::Mutex;

use hidkey_core::keymap::{KeyDescriptor, ScanCode};

use crate::application::emit_keys::{InjectionError, KeyInjector};

/// An injector that records every batch without touching the OS.
#[derive(Debug, Default)]
pub struct RecordingInjector {
    batches: Mutex<Vec<Vec<KeyDescriptor>>>,
    accept_limit: Option<usize>,
}

impl RecordingInjector {
    /// Creates an injector that accepts every descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an injector that accepts at most `limit` descriptors per batch.
    pub fn accepting(limit: usize) -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            accept_limit: Some(limit),
        }
    }

    /// Every batch submitted so far, in submission order.
    pub fn batches(&self) -> Vec<Vec<KeyDescriptor>> {
        self.batches.lock().expect("lock poisoned").clone()
    }

    /// The key of each recorded batch, assuming every batch is a tap.
    pub fn tapped_keys(&self) -> Vec<ScanCode> {
        self.batches
            .lock()
            .expect("lock poisoned")
            .iter()
            .filter_map(|batch| batch.first().map(|d| d.scan_code))
            .collect()
    }
}

impl KeyInjector for RecordingInjector {
    fn inject(&self, batch: &[KeyDescriptor]) -> Result<usize, InjectionError> {
        self.batches
            .lock()
            .expect("lock poisoned")
            .push(batch.to_vec());
        Ok(self.accept_limit.map_or(batch.len(), |limit| limit.min(batch.len())))
    }
}
