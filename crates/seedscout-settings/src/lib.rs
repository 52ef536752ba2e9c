//! # seedscout-settings
//!
//! Layered configuration for seedscout.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`SeedscoutSettings::default()`]
//! 2. **User file**: `~/.seedscout/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `SEEDSCOUT_*` overrides (highest priority)

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, deep_merge, expand_home, load_settings, load_settings_from_path,
    settings_path,
};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_exports_work() {
        let settings = SeedscoutSettings::default();
        assert!(settings.validate().is_ok());
        assert!(settings_path().ends_with(".seedscout/settings.json"));
    }
}
