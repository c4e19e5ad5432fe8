//! Error types for the bridge I/O subsystem.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Internal channel {0} out of range (0-4)")]
    InvalidInternalChannel(u8),

    #[error("External channel {0} out of range (0-15)")]
    InvalidExternalChannel(u8),

    #[error("Link unavailable: {0}")]
    LinkUnavailable(String),

    #[error("Host bus unavailable: {0}")]
    HostBusUnavailable(String),
}

pub type Result<T> = std::result::Result<T, Error>;
