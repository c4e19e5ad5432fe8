//! # MIDIBoy - MIDI to Game Boy Link Bridge
//!
//! Bridges a serial MIDI controller and a USB-MIDI host into the paced byte
//! stream an mGB cartridge reads over the Game Boy link port.
//!
//! ## Architecture
//!
//! MIDIBoy is an umbrella crate that wires:
//! - **midiboy-midi** - Protocol core (messages, stream parser, USB-MIDI packets)
//! - **midiboy-io** - Transports (interrupt ring, channel router, link
//!   transmitter, host bus)
//!
//! ```text
//! UART interrupt                       Poll thread
//!     │                                    │
//!     ▼                                    ▼
//! ByteRingProducer ──ring──▶ MessageParser ──▶ ChannelRouter ──▶ LinkTransmitter ──▶ link
//!                                               ▲        │
//!                        host bus ──▶ packet::decode     └──▶ host bus (mirror)
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use midiboy::prelude::*;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::sync::Arc;
//!
//! let (link, _wire) = ClockedLink::spawn(DEFAULT_BIT_CLOCK_HZ)?;
//! let (bus, _host) = memory_host_bus(64)?;
//! let (mut bridge, mut uart) = Bridge::builder().link(link).host_bus(bus).build()?;
//!
//! let running = Arc::new(AtomicBool::new(true));
//! let poller = std::thread::spawn({
//!     let running = Arc::clone(&running);
//!     move || bridge.run(&running)
//! });
//!
//! uart.push(0xF8);
//! running.store(false, Ordering::Release);
//! poller.join().unwrap();
//! # Ok::<(), midiboy::Error>(())
//! ```

mod error;
pub use error::{Error, Result};

mod config;
pub use config::BridgeConfig;

mod bridge;
pub use bridge::{Bridge, BridgeStats, ByteTap, PollSummary, Tap};

mod builder;
pub use builder::BridgeBuilder;

/// Re-export of midiboy-midi for direct access
pub use midiboy_midi as midi;

/// Re-export of midiboy-io for direct access
pub use midiboy_io as io;

pub use midiboy_io::routing::{NOISE, POLY, PULSE_1, PULSE_2, WAVE};
pub use midiboy_io::{ByteRingProducer, ChannelMap, ChannelMapHandle, LinkConfig};
pub use midiboy_midi::{Message, MessageKind};

/// Convenience prelude for common imports
pub mod prelude {
    // Bridge
    pub use crate::{Bridge, BridgeBuilder, BridgeConfig, BridgeStats, PollSummary};

    // Protocol
    pub use crate::midi::{packet, Message, MessageKind, MessageParser};

    // Routing
    pub use crate::io::routing::{NOISE, POLY, PULSE_1, PULSE_2, WAVE};
    pub use crate::io::{ChannelMap, ChannelMapHandle};

    // Transports
    pub use crate::io::link::DEFAULT_BIT_CLOCK_HZ;
    pub use crate::io::{
        memory_host_bus, ActivityIndicator, ByteRingProducer, ClockedLink, HostBus, HostEndpoint,
        LinkConfig, LinkPrimitive, MemoryHostBus, PulseCounter,
    };
}
