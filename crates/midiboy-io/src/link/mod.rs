//! Paced output to the synchronous link device.
//!
//! [`LinkPrimitive`] is the contract of the byte-level transmit hardware: a
//! small bounded queue that shifts bytes out on its own clock.
//! [`LinkTransmitter`] sits in front of it and enforces the minimum gap the
//! device needs between bytes. [`ClockedLink`] is a software primitive
//! clocked by a background thread.

mod clocked;
mod transmitter;

pub use clocked::{ClockedLink, DEFAULT_BIT_CLOCK_HZ, LINK_QUEUE_DEPTH};
pub use transmitter::LinkTransmitter;

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound for either link timing value.
const MAX_LINK_DELAY: Duration = Duration::from_millis(100);

/// Byte-level transmit primitive.
///
/// The queue must keep draining on its own: [`LinkTransmitter::send`] waits
/// for space without a timeout, so a primitive that stops shifting bytes
/// out stalls the sender. Use `send_nonblocking` where that is not
/// acceptable.
pub trait LinkPrimitive {
    /// Queue one byte. Returns `false` without blocking if the queue is full.
    fn try_put(&mut self, byte: u8) -> bool;

    /// Bytes queued or still shifting out.
    fn pending(&self) -> usize;

    fn has_space(&self) -> bool;

    /// Bytes fully shifted out since construction.
    fn bytes_transmitted(&self) -> u64;
}

impl<P: LinkPrimitive + ?Sized> LinkPrimitive for Box<P> {
    #[inline]
    fn try_put(&mut self, byte: u8) -> bool {
        (**self).try_put(byte)
    }

    #[inline]
    fn pending(&self) -> usize {
        (**self).pending()
    }

    #[inline]
    fn has_space(&self) -> bool {
        (**self).has_space()
    }

    #[inline]
    fn bytes_transmitted(&self) -> u64 {
        (**self).bytes_transmitted()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Minimum spacing between bytes handed to the primitive.
    pub min_byte_gap: Duration,
    /// Extra wait after the queue drains in `flush`.
    pub flush_settle: Duration,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            min_byte_gap: Duration::from_micros(500),
            flush_settle: Duration::from_millis(2),
        }
    }
}

impl LinkConfig {
    pub fn validate(&self) -> Result<()> {
        if self.min_byte_gap > MAX_LINK_DELAY {
            return Err(Error::InvalidConfig(format!(
                "min_byte_gap must be at most {:?}, got {:?}",
                MAX_LINK_DELAY, self.min_byte_gap
            )));
        }
        if self.flush_settle > MAX_LINK_DELAY {
            return Err(Error::InvalidConfig(format!(
                "flush_settle must be at most {:?}, got {:?}",
                MAX_LINK_DELAY, self.flush_settle
            )));
        }
        Ok(())
    }
}
