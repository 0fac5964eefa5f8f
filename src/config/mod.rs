//! Configuration management.

mod settings;
mod xdg;

pub use settings::{
    BridgeConfig, ConfigError, DEFAULT_TIMEOUT_MS, RENDER_DATA_TIMEOUT_ENV, REQUEST_TIMEOUT_ENV,
};
pub use xdg::XdgDirs;
