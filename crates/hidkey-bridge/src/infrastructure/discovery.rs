//! HID device discovery.
//!
//! Configured devices are found by enumerating everything `hidapi` can see
//! and matching each entry against the `[[devices]]` table:
//!
//! - `path` must be a case-insensitive substring of the hidapi path (empty
//!   matches any path), and
//! - `vendor_id` / `product_id` must be equal when they are set.
//!
//! Each attached device is claimed by at most one configured device, in
//! config order, so two identical panels can be listed twice with the same
//! VID/PID and each gets its own device.
//!
//! # Waiting for devices
//!
//! Panels are often plugged in after the bridge starts.
//! [`wait_for_devices`] re-enumerates every `discovery_interval_ms` until at
//! least one configured device is attached, then returns every match found in
//! that pass.  Devices that appear later are not picked up.

use std::time::Duration;

use hidapi::{DeviceInfo, HidApi, HidError};
use thiserror::Error;
use tracing::{debug, info};

use crate::infrastructure::storage::config::DeviceConfig;

/// Error type for device enumeration.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// hidapi could not be initialised.
    #[error("failed to initialise hidapi: {0}")]
    Init(#[source] HidError),
    /// Re-enumerating devices failed.
    #[error("failed to enumerate HID devices: {0}")]
    Enumerate(#[source] HidError),
}

/// One attached HID device (interface) as reported by enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceCandidate {
    pub path: String,
    pub vendor_id: u16,
    pub product_id: u16,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

impl DeviceCandidate {
    fn from_info(info: &DeviceInfo) -> Self {
        Self {
            path: info.path().to_string_lossy().into_owned(),
            vendor_id: info.vendor_id(),
            product_id: info.product_id(),
            manufacturer: info.manufacturer_string().map(str::to_string),
            product: info.product_string().map(str::to_string),
        }
    }
}

impl std::fmt::Display for DeviceCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04x}:{:04x} {} {} ({})",
            self.vendor_id,
            self.product_id,
            self.manufacturer.as_deref().unwrap_or("-"),
            self.product.as_deref().unwrap_or("-"),
            self.path
        )
    }
}

/// A configured device paired with the attached device it matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedDevice {
    pub config: DeviceConfig,
    pub candidate: DeviceCandidate,
}

/// Source of device lists.  Implemented for [`HidApi`]; tests script it.
pub trait DeviceEnumerator {
    /// Re-scans the bus and returns every attached device.
    fn candidates(&mut self) -> Result<Vec<DeviceCandidate>, DiscoveryError>;
}

impl DeviceEnumerator for HidApi {
    fn candidates(&mut self) -> Result<Vec<DeviceCandidate>, DiscoveryError> {
        self.refresh_devices().map_err(DiscoveryError::Enumerate)?;
        Ok(list_candidates(self))
    }
}

/// Initialises hidapi.
///
/// # Errors
///
/// Returns [`DiscoveryError::Init`] if the native library cannot start.
pub fn open_api() -> Result<HidApi, DiscoveryError> {
    HidApi::new().map_err(DiscoveryError::Init)
}

/// Every device in hidapi's current list, with duplicate paths removed.
pub fn list_candidates(api: &HidApi) -> Vec<DeviceCandidate> {
    let mut out: Vec<DeviceCandidate> = Vec::new();
    for info in api.device_list() {
        let candidate = DeviceCandidate::from_info(info);
        if !out.iter().any(|c| c.path == candidate.path) {
            out.push(candidate);
        }
    }
    out
}

/// Whether `candidate` satisfies `device`'s path and VID/PID filters.
pub fn matches(device: &DeviceConfig, candidate: &DeviceCandidate) -> bool {
    let path_ok = device.path.is_empty()
        || candidate
            .path
            .to_lowercase()
            .contains(&device.path.to_lowercase());
    let vid_ok = device.vendor_id.map_or(true, |vid| vid == candidate.vendor_id);
    let pid_ok = device.product_id.map_or(true, |pid| pid == candidate.product_id);
    path_ok && vid_ok && pid_ok
}

/// Pairs configured devices with attached ones.
///
/// Devices are considered in config order and each candidate is claimed at
/// most once.  Configured devices with no match are left out.
pub fn match_devices(devices: &[DeviceConfig], candidates: &[DeviceCandidate]) -> Vec<MatchedDevice> {
    let mut claimed = vec![false; candidates.len()];
    let mut out = Vec::new();

    for device in devices {
        let found = candidates
            .iter()
            .enumerate()
            .find(|(i, c)| !claimed[*i] && matches(device, c));
        if let Some((i, candidate)) = found {
            claimed[i] = true;
            out.push(MatchedDevice {
                config: device.clone(),
                candidate: candidate.clone(),
            });
        }
    }
    out
}

/// Polls `enumerator` until at least one of `devices` is attached.
///
/// # Errors
///
/// Returns [`DiscoveryError::Enumerate`] if a re-scan fails.
pub async fn wait_for_devices<E: DeviceEnumerator>(
    enumerator: &mut E,
    devices: &[DeviceConfig],
    interval: Duration,
) -> Result<Vec<MatchedDevice>, DiscoveryError> {
    let mut announced = false;

    loop {
        let candidates = enumerator.candidates()?;
        let matched = match_devices(devices, &candidates);

        if !matched.is_empty() {
            for m in &matched {
                info!("{}: bound to {}", m.config.name, m.candidate);
            }
            for missing in devices
                .iter()
                .filter(|d| !matched.iter().any(|m| m.config.name == d.name))
            {
                info!("{}: not attached; continuing without it", missing.name);
            }
            return Ok(matched);
        }

        if !announced {
            info!(
                "waiting for {} configured device(s) to be attached...",
                devices.len()
            );
            announced = true;
        }
        debug!("{} HID device(s) present, none configured", candidates.len());
        tokio::time::sleep(interval).await;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(path: &str, vid: u16, pid: u16) -> DeviceCandidate {
        DeviceCandidate {
            path: path.to_string(),
            vendor_id: vid,
            product_id: pid,
            manufacturer: None,
            product: None,
        }
    }

    fn device(name: &str, path: &str, vid: Option<u16>, pid: Option<u16>) -> DeviceConfig {
        DeviceConfig {
            name: name.to_string(),
            path: path.to_string(),
            vendor_id: vid,
            product_id: pid,
            report_length: 8,
            inputs: Vec::new(),
        }
    }

    /// Returns each scripted scan in turn, then repeats the last one.
    struct ScriptedEnumerator {
        scans: Vec<Vec<DeviceCandidate>>,
        calls: usize,
    }

    impl DeviceEnumerator for ScriptedEnumerator {
        fn candidates(&mut self) -> Result<Vec<DeviceCandidate>, DiscoveryError> {
            let index = self.calls.min(self.scans.len() - 1);
            self.calls += 1;
            Ok(self.scans[index].clone())
        }
    }

    #[test]
    fn test_matches_path_substring_case_insensitively() {
        let cfg = device("panel", "VID_0079&PID_0006", None, None);
        assert!(matches(&cfg, &candidate(r"\\?\hid#vid_0079&pid_0006#7&1", 0x79, 6)));
        assert!(!matches(&cfg, &candidate(r"\\?\hid#vid_046d&pid_c077#1", 0x46d, 0xc077)));
    }

    #[test]
    fn test_matches_applies_vid_pid_filters() {
        let cfg = device("panel", "", Some(121), Some(6));
        assert!(matches(&cfg, &candidate("/dev/hidraw3", 121, 6)));
        assert!(!matches(&cfg, &candidate("/dev/hidraw4", 121, 7)));
        assert!(!matches(&cfg, &candidate("/dev/hidraw5", 120, 6)));
    }

    #[test]
    fn test_identical_panels_claim_distinct_devices() {
        // Arrange
        let devices = [
            device("left", "", Some(121), Some(6)),
            device("right", "", Some(121), Some(6)),
        ];
        let candidates = [
            candidate("/dev/hidraw1", 121, 6),
            candidate("/dev/hidraw2", 121, 6),
        ];

        // Act
        let matched = match_devices(&devices, &candidates);

        // Assert
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].config.name, "left");
        assert_eq!(matched[0].candidate.path, "/dev/hidraw1");
        assert_eq!(matched[1].config.name, "right");
        assert_eq!(matched[1].candidate.path, "/dev/hidraw2");
    }

    #[test]
    fn test_unmatched_devices_are_left_out() {
        let devices = [device("left", "", Some(121), Some(6)), device("pedals", "", Some(1), Some(1))];
        let candidates = [candidate("/dev/hidraw1", 121, 6)];

        let matched = match_devices(&devices, &candidates);

        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].config.name, "left");
    }

    #[tokio::test]
    async fn test_wait_for_devices_polls_until_attached() {
        // Arrange: nothing on the first two scans
        let mut enumerator = ScriptedEnumerator {
            scans: vec![
                vec![],
                vec![candidate("/dev/hidraw0", 1, 1)],
                vec![candidate("/dev/hidraw0", 1, 1), candidate("/dev/hidraw1", 121, 6)],
            ],
            calls: 0,
        };
        let devices = [device("panel", "", Some(121), Some(6))];

        // Act
        let matched = wait_for_devices(&mut enumerator, &devices, Duration::from_millis(1))
            .await
            .expect("wait");

        // Assert
        assert_eq!(enumerator.calls, 3);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].candidate.path, "/dev/hidraw1");
    }
}
