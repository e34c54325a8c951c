//! Windows keyboard injection via the SendInput API.
//!
//! Each descriptor becomes one `INPUT_KEYBOARD` record with `wVk = 0`, the
//! scan code in `wScan`, and `KEYEVENTF_SCANCODE` (plus `KEYEVENTF_KEYUP` for
//! releases).  `dwExtraInfo` carries the thread's message extra info so the
//! injected events are marked the same way the system marks its own.
//!
//! A whole batch goes through a single `SendInput` call.  Windows inserts the
//! records of one call into the input stream serially, so events from other
//! threads cannot land inside a batch.

#![cfg(target_os = "windows")]

use hidkey_core::keymap::KeyDescriptor;
use tracing::debug;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS, VIRTUAL_KEY,
};
use windows::Win32::UI::WindowsAndMessaging::GetMessageExtraInfo;

use crate::application::emit_keys::{InjectionError, KeyInjector};

/// Windows implementation of [`KeyInjector`] using SendInput.
pub struct SendInputInjector;

impl SendInputInjector {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SendInputInjector {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyInjector for SendInputInjector {
    fn inject(&self, batch: &[KeyDescriptor]) -> Result<usize, InjectionError> {
        // SAFETY: GetMessageExtraInfo has no preconditions.
        let extra_info = unsafe { GetMessageExtraInfo() }.0 as usize;
        let inputs: Vec<INPUT> = batch
            .iter()
            .map(|descriptor| to_input(descriptor, extra_info))
            .collect();

        // SAFETY: `inputs` is a valid, initialised slice of INPUT structures
        // and cbSize is the size of one element.
        let sent = unsafe { SendInput(&inputs, std::mem::size_of::<INPUT>() as i32) } as usize;

        if sent != inputs.len() {
            // Usually UIPI: the foreground window belongs to a more privileged process.
            debug!(
                "SendInput accepted {sent} of {}: {}",
                inputs.len(),
                std::io::Error::last_os_error()
            );
        }
        Ok(sent)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn to_input(descriptor: &KeyDescriptor, extra_info: usize) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(descriptor.virtual_key()),
                wScan: descriptor.scan_code.as_u16(),
                dwFlags: KEYBD_EVENT_FLAGS(descriptor.flags()),
                time: 0,
                dwExtraInfo: extra_info,
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hidkey_core::keymap::{tap, ScanCode};
    use windows::Win32::UI::Input::KeyboardAndMouse::{KEYEVENTF_KEYUP, KEYEVENTF_SCANCODE};

    #[test]
    fn test_to_input_down_uses_scan_code_and_zero_vk() {
        let [down, _] = tap(ScanCode::A);

        let input = to_input(&down, 0);

        assert_eq!(input.r#type, INPUT_KEYBOARD);
        // SAFETY: the union was written through the `ki` member.
        let ki = unsafe { input.Anonymous.ki };
        assert_eq!(ki.wVk, VIRTUAL_KEY(0));
        assert_eq!(ki.wScan, 0x1E);
        assert_eq!(ki.dwFlags, KEYEVENTF_SCANCODE);
    }

    #[test]
    fn test_to_input_up_sets_key_up_flag() {
        let [_, up] = tap(ScanCode::A);

        let input = to_input(&up, 7);

        // SAFETY: the union was written through the `ki` member.
        let ki = unsafe { input.Anonymous.ki };
        assert_eq!(ki.dwFlags, KEYEVENTF_SCANCODE | KEYEVENTF_KEYUP);
        assert_eq!(ki.dwExtraInfo, 7);
    }
}
