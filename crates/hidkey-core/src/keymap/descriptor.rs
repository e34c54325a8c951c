//! Platform-neutral description of one synthetic keyboard event.
//!
//! A [`KeyDescriptor`] carries exactly what the OS injection boundary needs:
//! virtual key (always 0), scan code, and the flag word.  The flag values
//! are the Win32 `KEYEVENTF_*` bits so the Windows backend can pass them
//! through unchanged; other backends only read [`KeyDescriptor::direction`].

use serde::{Deserialize, Serialize};

use super::scan_code::ScanCode;

/// `KEYEVENTF_KEYUP`: the key is being released.
pub const FLAG_KEY_UP: u32 = 0x0002;
/// `KEYEVENTF_SCANCODE`: `wScan` identifies the key, `wVk` is ignored.
pub const FLAG_SCANCODE: u32 = 0x0008;

/// Press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyDirection {
    Down,
    Up,
}

/// One keyboard event ready for submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyDescriptor {
    pub scan_code: ScanCode,
    pub direction: KeyDirection,
}

impl KeyDescriptor {
    /// Builds the descriptor for `scan_code` moving in `direction`.
    pub fn new(scan_code: ScanCode, direction: KeyDirection) -> Self {
        Self {
            scan_code,
            direction,
        }
    }

    /// Virtual key code.  Always zero: keys are injected by scan code.
    pub fn virtual_key(&self) -> u16 {
        0
    }

    /// `KEYEVENTF_*` flag word for this descriptor.
    pub fn flags(&self) -> u32 {
        match self.direction {
            KeyDirection::Down => FLAG_SCANCODE,
            KeyDirection::Up => FLAG_SCANCODE | FLAG_KEY_UP,
        }
    }
}

/// The down/up pair that makes up one key tap, in submission order.
pub fn tap(scan_code: ScanCode) -> [KeyDescriptor; 2] {
    [
        KeyDescriptor::new(scan_code, KeyDirection::Down),
        KeyDescriptor::new(scan_code, KeyDirection::Up),
    ]
}
