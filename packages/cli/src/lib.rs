// ABOUTME: Library half of the `defects` command line tool
// ABOUTME: Environment configuration and logging setup shared by the binary and its tests

pub mod config;
pub mod logging;

pub use config::{Config, ConfigError};
