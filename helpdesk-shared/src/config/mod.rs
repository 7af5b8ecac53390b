//! Configuration shared by the client library and the CLI.

pub mod client;

pub use client::{ClientConfig, ConfigError};
