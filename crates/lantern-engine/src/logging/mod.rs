//! Logging utilities.
//!
//! The engine only emits through the `log` facade; this module installs an
//! `env_logger` backend for binaries that want one.

mod init;

pub use init::{init_logging, LoggingConfig};
