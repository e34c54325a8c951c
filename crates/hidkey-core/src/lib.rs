//! # hidkey-core
//!
//! Shared library for hidkey containing the report model, the bit-transition
//! detector, the key mapping table, and scan-code tables.
//!
//! It has zero dependencies on OS APIs or device libraries.
//!
//! # Architecture overview (for beginners)
//!
//! hidkey turns a USB button panel into a keyboard.  The panel sends small
//! binary *reports* whenever a switch moves.  hidkey remembers the previous
//! report, finds which configured bits changed, and taps the key bound to
//! each changed bit so the foreground application sees ordinary keystrokes.
//!
//! This crate is the part of that pipeline that can be tested without
//! hardware:
//!
//! - **`domain`** – reports, bit positions, bindings, the transition detector
//!   and the calibration differ.
//!
//! - **`keymap`** – the letter → scan code table and the key-down/key-up
//!   descriptors handed to the OS injection layer.

pub mod domain;
pub mod keymap;

pub use domain::binding::{BindingError, DigitalInput, KeyBinding, KeyMappingTable};
pub use domain::detector::{DetectorError, Edge, Transition, TransitionDetector};
pub use domain::diagnostic::{BitChange, ReportDiffer};
pub use domain::report::{Baseline, BitPosition, Report};
pub use keymap::{KeyDescriptor, KeyDirection, ScanCode};
