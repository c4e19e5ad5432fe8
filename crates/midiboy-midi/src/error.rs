//! Error types for the MIDI protocol core.

use crate::message::MessageKind;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Empty MIDI message")]
    Empty,

    #[error("Expected a status byte, got data byte {0:#04X}")]
    NotAStatusByte(u8),

    #[error("Undefined status byte {0:#04X}")]
    UndefinedStatus(u8),

    #[error("Data byte out of range: {0:#04X}")]
    InvalidDataByte(u8),

    #[error("{kind:?} takes {expected} bytes, got {actual}")]
    LengthMismatch {
        kind: MessageKind,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
