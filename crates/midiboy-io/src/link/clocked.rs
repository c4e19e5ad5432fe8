//! Software transmit primitive clocked by a background thread.
//!
//! Stands in for the shift-register hardware that clocks bytes out to the
//! device MSB-first. Each byte occupies the line for eight bit periods;
//! once shifted out it is delivered on the returned channel.

use super::LinkPrimitive;
use crate::error::{Error, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

pub const DEFAULT_BIT_CLOCK_HZ: u32 = 8_000;

/// Hardware transmit FIFO depth.
pub const LINK_QUEUE_DEPTH: usize = 4;

#[derive(Debug, Default)]
struct Shared {
    queue: Mutex<VecDeque<u8>>,
    transmitted: AtomicU64,
    shutdown: AtomicBool,
}

pub struct ClockedLink {
    shared: Arc<Shared>,
    byte_time: Duration,
    worker: Option<JoinHandle<()>>,
}

impl ClockedLink {
    /// Start the clock thread. Fails if `bit_clock_hz` is zero or the thread
    /// cannot be spawned.
    pub fn spawn(bit_clock_hz: u32) -> Result<(Self, Receiver<u8>)> {
        if bit_clock_hz == 0 {
            return Err(Error::InvalidConfig(
                "bit_clock_hz must be non-zero".to_string(),
            ));
        }

        let byte_time = Duration::from_nanos(8 * 1_000_000_000 / bit_clock_hz as u64);
        let shared = Arc::new(Shared {
            queue: Mutex::new(VecDeque::with_capacity(LINK_QUEUE_DEPTH)),
            ..Shared::default()
        });
        let (tx, rx) = unbounded();

        let worker = thread::Builder::new()
            .name("link-clock".to_string())
            .spawn({
                let shared = Arc::clone(&shared);
                move || clock_loop(&shared, byte_time, tx)
            })
            .map_err(|e| Error::LinkUnavailable(format!("failed to start clock thread: {}", e)))?;

        tracing::debug!(
            "Clocked link started at {} Hz ({:?} per byte)",
            bit_clock_hz,
            byte_time
        );

        Ok((
            Self {
                shared,
                byte_time,
                worker: Some(worker),
            },
            rx,
        ))
    }

    #[inline]
    pub fn byte_time(&self) -> Duration {
        self.byte_time
    }
}

fn clock_loop(shared: &Shared, byte_time: Duration, wire: Sender<u8>) {
    while !shared.shutdown.load(Ordering::Acquire) {
        // The byte stays queued while it shifts out so `pending` covers it
        let front = shared.queue.lock().front().copied();
        let Some(byte) = front else {
            thread::sleep(byte_time / 8);
            continue;
        };

        if !shift_out(shared, byte_time) {
            break;
        }
        shared.queue.lock().pop_front();
        shared.transmitted.fetch_add(1, Ordering::Relaxed);

        // Receiver gone: keep clocking so senders never stall
        let _ = wire.send(byte);
    }
}

/// Hold the line for one byte time in bit-period slices. Returns `false`
/// if shutdown was requested part way.
fn shift_out(shared: &Shared, byte_time: Duration) -> bool {
    let deadline = Instant::now() + byte_time;
    let slice = byte_time / 8;
    loop {
        if shared.shutdown.load(Ordering::Acquire) {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        thread::sleep(slice.min(deadline - now));
    }
}

impl LinkPrimitive for ClockedLink {
    fn try_put(&mut self, byte: u8) -> bool {
        let mut queue = self.shared.queue.lock();
        if queue.len() >= LINK_QUEUE_DEPTH {
            return false;
        }
        queue.push_back(byte);
        true
    }

    fn pending(&self) -> usize {
        self.shared.queue.lock().len()
    }

    fn has_space(&self) -> bool {
        self.shared.queue.lock().len() < LINK_QUEUE_DEPTH
    }

    fn bytes_transmitted(&self) -> u64 {
        self.shared.transmitted.load(Ordering::Relaxed)
    }
}

impl Drop for ClockedLink {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl std::fmt::Debug for ClockedLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockedLink")
            .field("byte_time", &self.byte_time)
            .field("pending", &self.pending())
            .field("transmitted", &self.bytes_transmitted())
            .finish()
    }
}
