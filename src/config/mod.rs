//! Dashboard Configuration Module
//!
//! Mesh selection, advisory thresholds and display settings loaded from a
//! TOML file, with the built-in constants as defaults.
//!
//! ## Loading Order
//!
//! 1. `SHAKER_CONFIG` environment variable (path to TOML file)
//! 2. `shaker_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! The config is passed explicitly to the session that owns it:
//!
//! ```ignore
//! let session = DashboardSession::new(DashboardConfig::load());
//! ```

mod dashboard_config;
pub mod defaults;
pub mod validation;

pub use dashboard_config::*;
