//! Domain entities for hidkey.
//!
//! Pure logic with no infrastructure dependencies: nothing in here opens a
//! device, touches the OS input queue, or reads a file.  Everything can be
//! exercised with plain byte slices.
//!
//! - **`report`** – reports, bit coordinates, and the one-step baseline.
//! - **`binding`** – configured inputs and the ordered key mapping table.
//! - **`detector`** – turns consecutive reports into bound-bit transitions.
//! - **`diagnostic`** – byte/bit differ used for wiring calibration.

pub mod binding;
pub mod detector;
pub mod diagnostic;
pub mod report;
