use super::{LinkConfig, LinkPrimitive};
use crate::routing::ByteSink;
use std::thread;
use std::time::{Duration, Instant};

/// Queue polling interval while `flush` waits for the primitive to drain.
const FLUSH_POLL: Duration = Duration::from_micros(100);

/// Paces bytes into a [`LinkPrimitive`].
///
/// `send` blocks the calling thread until `min_byte_gap` has passed since
/// the previous byte went into the primitive, then waits for queue space.
/// No byte is ever dropped; the first byte after construction goes out
/// without delay.
pub struct LinkTransmitter<P> {
    primitive: P,
    config: LinkConfig,
    last_send: Option<Instant>,
    bytes_sent: u64,
}

impl<P: LinkPrimitive> LinkTransmitter<P> {
    pub fn new(primitive: P, config: LinkConfig) -> Self {
        tracing::debug!(
            "Link transmitter ready (gap {:?}, settle {:?})",
            config.min_byte_gap,
            config.flush_settle
        );
        Self {
            primitive,
            config,
            last_send: None,
            bytes_sent: 0,
        }
    }

    /// Blocks for the remaining gap, then until the primitive has space.
    /// Never returns if the primitive stops draining.
    pub fn send(&mut self, byte: u8) {
        if let Some(wait) = self.remaining_gap() {
            thread::sleep(wait);
        }
        while !self.primitive.try_put(byte) {
            thread::yield_now();
        }
        self.mark_sent();
    }

    /// Sends only if the gap has elapsed and the queue has room.
    pub fn send_nonblocking(&mut self, byte: u8) -> bool {
        if self.remaining_gap().is_some() || !self.primitive.has_space() {
            return false;
        }
        if !self.primitive.try_put(byte) {
            return false;
        }
        self.mark_sent();
        true
    }

    /// Blocks until the primitive's queue is empty, then for `flush_settle`.
    pub fn flush(&mut self) {
        while self.primitive.pending() > 0 {
            thread::sleep(FLUSH_POLL);
        }
        thread::sleep(self.config.flush_settle);
    }

    #[inline]
    fn remaining_gap(&self) -> Option<Duration> {
        let elapsed = self.last_send?.elapsed();
        self.config
            .min_byte_gap
            .checked_sub(elapsed)
            .filter(|wait| !wait.is_zero())
    }

    #[inline]
    fn mark_sent(&mut self) {
        self.last_send = Some(Instant::now());
        self.bytes_sent += 1;
    }

    #[inline]
    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    #[inline]
    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn primitive(&self) -> &P {
        &self.primitive
    }

    pub fn into_primitive(self) -> P {
        self.primitive
    }
}

impl<P: LinkPrimitive> ByteSink for LinkTransmitter<P> {
    #[inline]
    fn send_byte(&mut self, byte: u8) {
        self.send(byte);
    }
}

impl<P> std::fmt::Debug for LinkTransmitter<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinkTransmitter")
            .field("config", &self.config)
            .field("bytes_sent", &self.bytes_sent)
            .finish_non_exhaustive()
    }
}
