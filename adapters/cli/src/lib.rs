#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter for Arcade Manager: configuration loading, the game
//! screens, and the per-frame session pipeline driven by a rendering backend.

pub mod config;
pub mod screens;
pub mod session;

pub use config::{ArcadeConfig, ConfigError};
pub use session::Session;
