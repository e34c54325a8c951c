//! Infrastructure layer for the bridge.
//!
//! Contains OS-facing adapters: HID report reading, keystroke injection,
//! device enumeration and configuration files.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `hidkey_core`, but MUST NOT be imported by `hidkey_core`.
//!
//! # Sub-modules
//!
//! - **`report_source`** – `ReportSource` implementations.  The hidapi one
//!   runs a blocking reader thread per device; a channel-fed mock is provided
//!   for tests.
//!
//! - **`key_injection`** – `KeyInjector` implementations.  `SendInput` on
//!   Windows, selected at compile time with `#[cfg(target_os)]`, plus a
//!   logging dry-run injector and a recording injector for tests.
//!
//! - **`discovery`** – Enumerates attached HID devices and matches them
//!   against the configured device list.
//!
//! - **`storage`** – TOML configuration loading, validation and saving.

pub mod discovery;
pub mod key_injection;
pub mod report_source;
pub mod storage;
