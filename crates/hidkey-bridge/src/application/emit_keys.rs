//! KeyEmitter: turns a key into one atomic down/up batch for the OS.
//!
//! This use case sits at the application layer and delegates to a
//! [`KeyInjector`] trait object for the actual OS call.  Platform
//! implementations live in the infrastructure layer.
//!
//! # Why one batch per tap?
//!
//! Several device sessions share the same injector.  If the key-down and
//! key-up of one tap were submitted in two calls, another session's tap could
//! land in between and the application would see `a↓ b↓ a↑ b↑`.  Submitting
//! both descriptors in a single call keeps every pair contiguous in the OS
//! input queue.

use std::sync::Arc;

use hidkey_core::keymap::{self, KeyDescriptor, ScanCode};
use thiserror::Error;

/// Error type for key injection.
#[derive(Debug, Error)]
pub enum InjectionError {
    /// The OS accepted fewer descriptors than were submitted.
    #[error("OS accepted {accepted} of {submitted} key events")]
    Partial { submitted: usize, accepted: usize },
    /// The platform call failed outright.
    #[error("platform error: {0}")]
    Platform(String),
}

/// Platform-agnostic keyboard injection.
///
/// Implementations must be safe to call from several sessions at once and
/// must submit each `batch` as one unit.
#[cfg_attr(test, mockall::automock)]
pub trait KeyInjector: Send + Sync {
    /// Submits `batch` in a single OS call and returns how many descriptors
    /// the OS accepted.
    fn inject(&self, batch: &[KeyDescriptor]) -> Result<usize, InjectionError>;
}

/// Builds and submits key taps.
#[derive(Clone)]
pub struct KeyEmitter {
    injector: Arc<dyn KeyInjector>,
}

impl KeyEmitter {
    /// Creates an emitter on top of `injector`.
    pub fn new(injector: Arc<dyn KeyInjector>) -> Self {
        Self { injector }
    }

    /// Presses and releases `key`.
    ///
    /// # Errors
    ///
    /// Returns [`InjectionError::Partial`] when the OS accepted only part of
    /// the pair, or whatever error the injector reports.
    pub fn tap(&self, key: ScanCode) -> Result<(), InjectionError> {
        let batch = keymap::tap(key);
        let accepted = self.injector.inject(&batch)?;
        if accepted != batch.len() {
            return Err(InjectionError::Partial {
                submitted: batch.len(),
                accepted,
            });
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
