//! Keyboard injection backends.
//!
//! The real backend is selected at compile time via `#[cfg(target_os = ...)]`.
//! Only Windows injects keystrokes; every platform has the dry-run backend,
//! which logs what would have been sent.

pub mod dry_run;
pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

use std::sync::Arc;

use crate::application::emit_keys::KeyInjector;

/// Returns the injector for this build.
///
/// `dry_run` forces the logging backend even where a real one exists.
pub fn platform_injector(dry_run: bool) -> Arc<dyn KeyInjector> {
    if dry_run {
        return Arc::new(dry_run::DryRunInjector::new());
    }

    #[cfg(target_os = "windows")]
    {
        Arc::new(windows::SendInputInjector::new())
    }

    #[cfg(not(target_os = "windows"))]
    {
        tracing::warn!("keystroke injection is only available on Windows; using dry-run injector");
        Arc::new(dry_run::DryRunInjector::new())
    }
}
