//! Lock-free byte queue from the serial receive interrupt to the poll loop.
//!
//! - Producer: receive interrupt (or the thread standing in for it). `push` is
//!   O(1), never blocks, never allocates, never logs.
//! - Consumer: the poll loop, which drains bytes into the parser.
//!
//! A full queue drops the incoming byte and bumps the overflow counter.
//! Accepted bytes keep arrival order; resynchronizing after a gap is the
//! parser's job.

use crate::error::{Error, Result};
use ringbuf::{
    traits::{Consumer, Observer, Producer, Split},
    HeapCons, HeapProd, HeapRb,
};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const DEFAULT_RING_CAPACITY: usize = 256;

#[derive(Debug, Default)]
struct RingCounters {
    received: AtomicU64,
    overflows: AtomicU64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RingStats {
    /// Every byte offered by the producer, accepted or not.
    pub received: u64,
    pub overflows: u64,
}

/// Producer half, owned by the receive interrupt.
pub struct ByteRingProducer {
    producer: HeapProd<u8>,
    counters: Arc<RingCounters>,
}

impl ByteRingProducer {
    /// Returns `false` if the byte was dropped because the ring is full.
    #[inline]
    pub fn push(&mut self, byte: u8) -> bool {
        self.counters.received.fetch_add(1, Ordering::Relaxed);
        if self.producer.try_push(byte).is_ok() {
            true
        } else {
            self.counters.overflows.fetch_add(1, Ordering::Relaxed);
            false
        }
    }
}

impl std::fmt::Debug for ByteRingProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteRingProducer").finish_non_exhaustive()
    }
}

/// Consumer half, owned by the poll loop.
pub struct ByteRingConsumer {
    consumer: HeapCons<u8>,
    counters: Arc<RingCounters>,
    capacity: usize,
}

impl ByteRingConsumer {
    #[inline]
    pub fn pop(&mut self) -> Option<u8> {
        self.consumer.try_pop()
    }

    /// Yields bytes in arrival order until the ring is empty.
    pub fn drain(&mut self) -> impl Iterator<Item = u8> + '_ {
        std::iter::from_fn(move || self.consumer.try_pop())
    }

    #[inline]
    pub fn pending(&self) -> usize {
        self.consumer.occupied_len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    /// Nominal capacity. One slot is reserved, so `capacity() - 1` bytes fit.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn stats(&self) -> RingStats {
        RingStats {
            received: self.counters.received.load(Ordering::Relaxed),
            overflows: self.counters.overflows.load(Ordering::Relaxed),
        }
    }

    pub fn reset_stats(&self) {
        self.counters.received.store(0, Ordering::Relaxed);
        self.counters.overflows.store(0, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for ByteRingConsumer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteRingConsumer")
            .field("capacity", &self.capacity)
            .field("pending", &self.pending())
            .finish()
    }
}

/// Create a byte ring. `capacity` must be a power of two, at least 2.
pub fn byte_ring(capacity: usize) -> Result<(ByteRingProducer, ByteRingConsumer)> {
    if capacity < 2 || !capacity.is_power_of_two() {
        return Err(Error::InvalidConfig(format!(
            "ring capacity {} must be a power of two >= 2",
            capacity
        )));
    }
    let rb = HeapRb::<u8>::new(capacity - 1);
    let (producer, consumer) = rb.split();
    let counters = Arc::new(RingCounters::default());
    Ok((
        ByteRingProducer {
            producer,
            counters: Arc::clone(&counters),
        },
        ByteRingConsumer {
            consumer,
            counters,
            capacity,
        },
    ))
}
