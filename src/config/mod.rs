//! Configuration module for selection-ask.
//!
//! This module is split into several sub-modules:
//! - `types`: Enums, constants and default helpers
//! - `config_struct`: Settings, stored settings and tuning definitions
//! - `defaults`: Default implementations
//! - `io`: Decoding and normalizing stored settings

mod config_struct;
mod defaults;
mod io;
mod types;

// Re-export public types for external use
pub use config_struct::{Settings, StoredSettings, Tuning};
pub use io::{decode_settings, load_settings_json, load_settings_value, normalize_settings};
pub use types::{DisplayMode, ThemeMode};
