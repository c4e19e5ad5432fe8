//! Centralized error type for the midiboy umbrella crate.
//!
//! Wraps the subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("MIDI: {0}")]
    Midi(#[from] midiboy_midi::Error),

    #[error(transparent)]
    Transport(#[from] midiboy_io::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("No {0} configured")]
    MissingTransport(&'static str),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
