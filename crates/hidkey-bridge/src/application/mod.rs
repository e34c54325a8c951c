//! Application layer use cases for the bridge.
//!
//! # What use cases does the bridge have?
//!
//! - **`emit_keys`** – Turns a scan code into one key-down/key-up batch and
//!   hands it to a `KeyInjector`.  The actual OS call is made by an injector
//!   implementation passed in at construction time.
//!
//! - **`run_session`** – The per-device loop: read a report, find the bound
//!   bits that flipped, tap the key bound to each.
//!
//! - **`supervise`** – Runs every device session as its own task and
//!   collects how each one ended.
//!
//! - **`diagnose`** – Prints changed byte/bit positions (or full bit dumps)
//!   instead of injecting keys, for working out how a panel is wired.

pub mod diagnose;
pub mod emit_keys;
pub mod run_session;
pub mod supervise;
