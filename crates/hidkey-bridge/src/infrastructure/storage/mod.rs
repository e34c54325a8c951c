//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module reads the TOML configuration (device list, wired
//! inputs and key bindings), validates it, and writes the starter file used by
//! `hidkey init`.

pub mod config;
