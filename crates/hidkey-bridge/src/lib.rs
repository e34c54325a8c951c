//! hidkey-bridge library entry point.
//!
//! Re-exports all public modules so that integration tests in `tests/`
//! and the binary entry point in `main.rs` share the same module tree.
//!
//! # What does the bridge do? (for beginners)
//!
//! A USB button panel reports its switches as bits inside small binary HID
//! reports.  Games and other desktop applications only understand keyboard
//! input, so the bridge sits in between:
//!
//! 1. Loads the TOML config: which devices to open, which byte/bit each
//!    switch occupies, and which letter each switch should type.
//! 2. Waits until at least one configured panel is attached.
//! 3. Starts one session per panel.  Each session reads reports, compares
//!    the bound bits with the previous report, and for every bit that moved
//!    taps the bound key.
//! 4. Injects each tap as a scan-code key-down/key-up pair (`SendInput` on
//!    Windows) so the foreground application sees ordinary keystrokes.
//!
//! The `diagnose` and `dump` commands print report changes instead of typing,
//! which is how the byte/bit of each switch is found in the first place.

/// Application layer: use cases for the bridge.
pub mod application;

/// Infrastructure layer: HID access, keystroke injection, and configuration.
pub mod infrastructure;
