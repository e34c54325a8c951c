//! Logging-only injector.
//!
//! Used on hosts without a keyboard injection backend and with `--dry-run`.
//! Every batch is reported through `tracing` and accepted in full.

use std::sync::atomic::{AtomicU64, Ordering};

use hidkey_core::keymap::{KeyDescriptor, KeyDirection};
use tracing::info;

use crate::application::emit_keys::{InjectionError, KeyInjector};

/// Accepts and logs every batch.
#[derive(Debug, Default)]
pub struct DryRunInjector {
    batches: AtomicU64,
}

impl DryRunInjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of batches seen so far.
    pub fn batches(&self) -> u64 {
        self.batches.load(Ordering::Relaxed)
    }
}

impl KeyInjector for DryRunInjector {
    fn inject(&self, batch: &[KeyDescriptor]) -> Result<usize, InjectionError> {
        let rendered: Vec<String> = batch
            .iter()
            .map(|d| {
                let arrow = match d.direction {
                    KeyDirection::Down => "down",
                    KeyDirection::Up => "up",
                };
                format!("{}:{arrow} (scan 0x{:02X})", d.scan_code, d.scan_code.as_u16())
            })
            .collect();
        let n = self.batches.fetch_add(1, Ordering::Relaxed) + 1;
        info!("[dry-run #{n}] {}", rendered.join(", "));
        Ok(batch.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidkey_core::keymap::{tap, ScanCode};

    #[test]
    fn test_dry_run_accepts_whole_batch_and_counts() {
        let injector = DryRunInjector::new();

        assert_eq!(injector.inject(&tap(ScanCode::A)).unwrap(), 2);
        assert_eq!(injector.inject(&tap(ScanCode::B)).unwrap(), 2);

        assert_eq!(injector.batches(), 2);
    }
}
