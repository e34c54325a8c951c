//! Digital inputs and the per-device key mapping table.
//!
//! Configuration describes a panel as an ordered list of named digital
//! inputs.  Each input sits at a [`BitPosition`] and may carry a key letter.
//! [`KeyMappingTable`] keeps only the inputs that are actually bound, in their
//! declared order, with the key letter already resolved to a [`ScanCode`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::report::BitPosition;
use crate::keymap::ScanCode;

/// Errors raised while turning configured inputs into bindings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// The key identifier is not in the supported alphabet.
    #[error("input {input:?}: unknown key identifier {key:?}")]
    UnknownKey { input: String, key: String },

    /// The bit index does not address a bit of a byte.
    #[error("input {input:?}: bit index {bit} is out of range 0-7")]
    BitOutOfRange { input: String, bit: u8 },
}

/// A named physical input as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalInput {
    /// Logical name, e.g. `"DI_K1"`.
    pub name: String,
    /// Byte offset inside the report.
    pub byte: usize,
    /// Bit offset inside the byte, counted from the LSB.
    pub bit: u8,
    /// Key letter to tap when the input toggles.  Absent or empty disables
    /// the input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl DigitalInput {
    pub fn position(&self) -> BitPosition {
        BitPosition::new(self.byte, self.bit)
    }

    /// The configured key, or `None` when the input is disabled.
    pub fn bound_key(&self) -> Option<&str> {
        self.key.as_deref().filter(|key| !key.is_empty())
    }
}

/// A resolved (position → key) entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub input: String,
    pub position: BitPosition,
    pub key: ScanCode,
}

/// Ordered bindings for one device.  Immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMappingTable {
    bindings: Vec<KeyBinding>,
}

impl KeyMappingTable {
    /// Resolves `inputs` in order, dropping disabled ones.
    ///
    /// # Errors
    ///
    /// Fails on the first input whose key is not a known letter or whose bit
    /// index is larger than 7.  Disabled inputs are not checked.
    pub fn from_inputs(inputs: &[DigitalInput]) -> Result<Self, BindingError> {
        let mut bindings = Vec::with_capacity(inputs.len());

        for input in inputs {
            let Some(key) = input.bound_key() else {
                continue;
            };
            let position = input.position();
            if !position.has_valid_bit() {
                return Err(BindingError::BitOutOfRange {
                    input: input.name.clone(),
                    bit: input.bit,
                });
            }
            let key = key.parse::<ScanCode>().map_err(|_| BindingError::UnknownKey {
                input: input.name.clone(),
                key: key.to_string(),
            })?;
            bindings.push(KeyBinding {
                input: input.name.clone(),
                position,
                key,
            });
        }

        Ok(Self { bindings })
    }

    /// Builds a table directly from resolved bindings.
    pub fn from_bindings(bindings: Vec<KeyBinding>) -> Self {
        Self { bindings }
    }

    pub fn iter(&self) -> impl Iterator<Item = &KeyBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Highest byte index referenced by any binding.
    pub fn max_byte(&self) -> Option<usize> {
        self.bindings.iter().map(|b| b.position.byte).max()
    }
}

impl<'a> IntoIterator for &'a KeyMappingTable {
    type Item = &'a KeyBinding;
    type IntoIter = std::slice::Iter<'a, KeyBinding>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(name: &str, byte: usize, bit: u8, key: Option<&str>) -> DigitalInput {
        DigitalInput {
            name: name.to_string(),
            byte,
            bit,
            key: key.map(str::to_string),
        }
    }

    #[test]
    fn test_table_keeps_declared_order() {
        // Arrange
        let inputs = vec![
            input("DI_K1", 6, 4, Some("a")),
            input("DI_K2", 6, 5, Some("b")),
            input("DI_K3", 6, 6, Some("c")),
        ];

        // Act
        let table = KeyMappingTable::from_inputs(&inputs).unwrap();

        // Assert
        let names: Vec<&str> = table.iter().map(|b| b.input.as_str()).collect();
        assert_eq!(names, vec!["DI_K1", "DI_K2", "DI_K3"]);
        assert_eq!(table.iter().next().unwrap().key, ScanCode::A);
    }

    #[test]
    fn test_table_skips_absent_and_empty_keys() {
        let inputs = vec![
            input("DI_0", 0, 0, None),
            input("DI_1", 0, 1, Some("")),
            input("DI_2", 0, 2, Some("q")),
        ];

        let table = KeyMappingTable::from_inputs(&inputs).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.iter().next().unwrap().position, BitPosition::new(0, 2));
    }

    #[test]
    fn test_unknown_key_fails_fast() {
        let inputs = vec![input("DI_0", 0, 0, Some("a")), input("DI_1", 0, 1, Some("enter"))];

        let err = KeyMappingTable::from_inputs(&inputs).unwrap_err();

        assert_eq!(
            err,
            BindingError::UnknownKey {
                input: "DI_1".to_string(),
                key: "enter".to_string()
            }
        );
    }

    #[test]
    fn test_bit_out_of_range_is_rejected() {
        let inputs = vec![input("DI_0", 0, 8, Some("a"))];
        let err = KeyMappingTable::from_inputs(&inputs).unwrap_err();
        assert!(matches!(err, BindingError::BitOutOfRange { bit: 8, .. }));
    }

    #[test]
    fn test_disabled_input_with_bad_bit_is_ignored() {
        let inputs = vec![input("DI_0", 0, 12, None)];
        let table = KeyMappingTable::from_inputs(&inputs).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_digital_input_without_key_deserializes_as_disabled() {
        // Arrange
        let text = "name = \"DI_K4\"\nbyte = 6\nbit = 7\n";

        // Act
        let parsed: DigitalInput = toml::from_str(text).expect("deserialize");

        // Assert
        assert_eq!(parsed.key, None);
        assert_eq!(parsed.bound_key(), None);
        assert_eq!(parsed.position(), BitPosition::new(6, 7));
    }

    #[test]
    fn test_max_byte() {
        let inputs = vec![input("DI_0", 2, 0, Some("a")), input("DI_1", 6, 0, Some("b"))];
        let table = KeyMappingTable::from_inputs(&inputs).unwrap();
        assert_eq!(table.max_byte(), Some(6));
        assert_eq!(KeyMappingTable::default().max_byte(), None);
    }
}
