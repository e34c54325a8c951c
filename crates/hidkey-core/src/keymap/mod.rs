//! Key identifiers and keyboard event descriptors.
//!
//! The canonical key representation is the set-1 scan code of a letter key
//! ([`ScanCode`]).  Configuration names keys by letter; the injection
//! boundary consumes [`KeyDescriptor`]s built from scan codes.

pub mod descriptor;
pub mod scan_code;

pub use descriptor::{tap, KeyDescriptor, KeyDirection};
pub use scan_code::{ScanCode, UnknownKey};
