//! Activity indicator sink.
//!
//! The router pulses the indicator once per forwarded message. What a pulse
//! looks like (LED blink, display flash) is up to the implementation and
//! must not block.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub trait ActivityIndicator {
    fn pulse(&mut self);
}

/// Discards every pulse.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoIndicator;

impl ActivityIndicator for NoIndicator {
    #[inline]
    fn pulse(&mut self) {}
}

/// Counts pulses. Clones share the count, so a housekeeping thread can
/// poll it and drive an animation.
#[derive(Clone, Debug, Default)]
pub struct PulseCounter {
    count: Arc<AtomicU64>,
}

impl PulseCounter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl ActivityIndicator for PulseCounter {
    #[inline]
    fn pulse(&mut self) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }
}

impl<F: FnMut()> ActivityIndicator for F {
    #[inline]
    fn pulse(&mut self) {
        self()
    }
}
