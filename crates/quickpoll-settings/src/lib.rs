//! # quickpoll-settings
//!
//! Layered configuration for the `QuickPoll` server.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`QuickPollSettings::default()`]
//! 2. **Settings file**: `~/.quickpoll/settings.json` or an explicit path,
//!    deep-merged over defaults
//! 3. **Environment variables**: `QUICKPOLL_*` and `CORS_ORIGINS`

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, data_dir, deep_merge, load_settings, load_settings_from_path,
    settings_path, validate,
};
pub use types::*;
