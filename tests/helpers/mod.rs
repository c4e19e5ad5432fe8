//! Test fixtures for bridge integration tests.
//!
//! `RecordingLink` is a transmit primitive with an unbounded queue that
//! shifts bytes out instantly, so tests see exactly what the transmitter
//! handed over and when.

#![allow(dead_code)]

use midiboy::prelude::*;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Fast pacing so tests that don't measure timing stay quick.
pub const TEST_GAP_MICROS: u64 = 20;

#[derive(Clone, Default)]
pub struct RecordingLink {
    wire: Arc<Mutex<Vec<(Instant, u8)>>>,
}

impl RecordingLink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.wire.lock().unwrap().iter().map(|&(_, b)| b).collect()
    }

    pub fn timestamps(&self) -> Vec<Instant> {
        self.wire.lock().unwrap().iter().map(|&(t, _)| t).collect()
    }
}

impl LinkPrimitive for RecordingLink {
    fn try_put(&mut self, byte: u8) -> bool {
        self.wire.lock().unwrap().push((Instant::now(), byte));
        true
    }

    fn pending(&self) -> usize {
        0
    }

    fn has_space(&self) -> bool {
        true
    }

    fn bytes_transmitted(&self) -> u64 {
        self.wire.lock().unwrap().len() as u64
    }
}

pub struct Rig {
    pub bridge: Bridge,
    pub uart: ByteRingProducer,
    pub link: RecordingLink,
    pub host: HostEndpoint,
}

impl Rig {
    pub fn feed(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.uart.push(b);
        }
    }
}

pub fn fast_link_config() -> LinkConfig {
    LinkConfig {
        min_byte_gap: std::time::Duration::from_micros(TEST_GAP_MICROS),
        flush_settle: std::time::Duration::ZERO,
    }
}

/// Bridge with a recording link and a mounted in-memory host bus.
pub fn test_rig() -> Rig {
    rig_with(Bridge::builder().link_config(fast_link_config()))
}

pub fn rig_with(builder: BridgeBuilder) -> Rig {
    let link = RecordingLink::new();
    let (bus, host) = memory_host_bus(64).expect("Failed to create host bus");
    host.mount();

    let (bridge, uart) = builder
        .link(link.clone())
        .host_bus(bus)
        .build()
        .expect("Failed to build bridge");

    Rig {
        bridge,
        uart,
        link,
        host,
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
