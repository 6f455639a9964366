//! Configuration for the CAS single-sign-out session store.
//!
//! Provides TOML-based configuration with:
//! - `[store]` — backend selection, key namespace, capacity, cleanup and timeouts
//! - `[adapter]` — whether non-CAS sessions get a synthesized assertion
//! - Config file layering (XDG user config + project-local overrides)

pub mod discovery;
pub mod error;
pub mod types;

pub use discovery::{
    LoadedConfig, load_config, load_config_file, load_config_with_options, save_config,
    xdg_config_dir, xdg_config_path,
};
pub use error::{ConfigError, Result};
pub use types::*;
