//! # chamber-settings
//!
//! Configuration for the Chamber control-plane client.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults** — [`ChamberSettings::default()`]
//! 2. **User file** — `~/.chamber/settings.json` (deep-merged over defaults)
//! 3. **Environment variables** — `CHAMBER_*` overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path, validate};
pub use types::*;
