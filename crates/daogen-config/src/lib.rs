//! # Daogen Config
//!
//! Generator configuration, loaded from layered TOML files and
//! `DAOGEN__`-prefixed environment variables.

mod app_config;
mod loader;

pub use app_config::*;
pub use loader::*;
