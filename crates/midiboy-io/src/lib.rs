//! Transport side of the MIDIBoy bridge.
//!
//! # Primary API
//!
//! - [`byte_ring`]: lock-free byte queue from the serial receive interrupt
//!   to the poll loop
//! - [`ChannelRouter`] / [`ChannelMap`] / [`ChannelMapHandle`]: external to
//!   internal channel remapping and forwarding
//! - [`LinkTransmitter`] / [`LinkPrimitive`] / [`ClockedLink`]: paced output
//!   to the synchronous link device
//! - [`HostBus`] / [`HostBusPort`] / [`memory_host_bus`]: USB-MIDI packet side
//! - [`ActivityIndicator`]: forward-activity pulses
//!
//! # Example
//!
//! ```
//! use midiboy_io::{byte_ring, ChannelMapHandle, ChannelRouter, NoIndicator, RouteOutcome};
//! use midiboy_midi::MessageParser;
//!
//! let (mut producer, mut consumer) = byte_ring(16)?;
//! for byte in [0x94, 0x3C, 0x64] {
//!     producer.push(byte);
//! }
//!
//! let mut parser = MessageParser::new();
//! let mut router = ChannelRouter::new(ChannelMapHandle::default());
//! let mut link: Vec<u8> = Vec::new();
//! let mut mirror: Vec<midiboy_midi::Message> = Vec::new();
//!
//! for byte in consumer.drain() {
//!     if let Some(message) = parser.parse_byte(byte) {
//!         let outcome = router.route_controller(&message, &mut link, &mut mirror, &mut NoIndicator);
//!         assert_eq!(outcome, RouteOutcome::Forwarded { internal: 4 });
//!     }
//! }
//! assert_eq!(link, vec![0x94, 0x3C, 0x64]);
//! # Ok::<(), midiboy_io::Error>(())
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod ring;
pub use ring::{byte_ring, ByteRingConsumer, ByteRingProducer, RingStats, DEFAULT_RING_CAPACITY};

pub mod routing;
pub use routing::{
    ByteSink, ChannelMap, ChannelMapHandle, ChannelRouter, DropReason, MirrorSink, RouteOutcome,
    RouterStats,
};

pub mod link;
pub use link::{ClockedLink, LinkConfig, LinkPrimitive, LinkTransmitter};

pub mod host_bus;
pub use host_bus::{memory_host_bus, HostBus, HostBusPort, HostBusStats, HostEndpoint, MemoryHostBus};

pub mod indicator;
pub use indicator::{ActivityIndicator, NoIndicator, PulseCounter};
