//! Builder for configuring and constructing a `Bridge`.

use crate::bridge::{BoxedHostBus, BoxedIndicator, BoxedLink, Bridge, ByteTap, Tap};
use crate::config::BridgeConfig;
use crate::{Error, Result};
use midiboy_io::{
    byte_ring, ActivityIndicator, ByteRingProducer, ChannelMap, ChannelMapHandle, ChannelRouter,
    HostBus, HostBusPort, LinkConfig, LinkPrimitive, LinkTransmitter, NoIndicator,
};
use midiboy_midi::{Message, MessageParser};

/// The link and host bus are required; building without either fails with
/// [`Error::MissingTransport`] so the data path never runs half-wired.
///
/// `build` returns the bridge together with the ring producer, which
/// belongs to the serial receive interrupt (or the thread standing in for
/// it).
///
/// # Example
///
/// ```
/// use midiboy::prelude::*;
///
/// let (link, wire) = ClockedLink::spawn(64_000)?;
/// let (bus, host) = memory_host_bus(32)?;
///
/// let (mut bridge, mut uart) = Bridge::builder()
///     .link(link)
///     .host_bus(bus)
///     .build()?;
///
/// for byte in [0x91, 0x48, 0x60] {
///     uart.push(byte);
/// }
/// bridge.poll();
/// bridge.flush();
///
/// assert_eq!(wire.try_iter().collect::<Vec<u8>>(), vec![0x91, 0x48, 0x60]);
/// # drop(host);
/// # Ok::<(), midiboy::Error>(())
/// ```
#[derive(Default)]
pub struct BridgeBuilder {
    config: BridgeConfig,
    link: Option<BoxedLink>,
    host_bus: Option<BoxedHostBus>,
    indicator: Option<BoxedIndicator>,
    tap: Option<Tap>,
    byte_tap: Option<ByteTap>,
}

impl BridgeBuilder {
    /// Replaces the whole configuration.
    pub fn config(mut self, config: BridgeConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 256
    pub fn ring_capacity(mut self, capacity: usize) -> Self {
        self.config.ring_capacity = capacity;
        self
    }

    pub fn link_config(mut self, link: LinkConfig) -> Self {
        self.config.link = link;
        self
    }

    pub fn channel_map(mut self, map: ChannelMap) -> Self {
        self.config.channel_map = map;
        self
    }

    pub fn link<P: LinkPrimitive + Send + 'static>(mut self, primitive: P) -> Self {
        self.link = Some(Box::new(primitive));
        self
    }

    pub fn host_bus<B: HostBus + Send + 'static>(mut self, bus: B) -> Self {
        self.host_bus = Some(Box::new(bus));
        self
    }

    /// Default: no indicator.
    pub fn indicator<I: ActivityIndicator + Send + 'static>(mut self, indicator: I) -> Self {
        self.indicator = Some(Box::new(indicator));
        self
    }

    /// Called with every message parsed from the serial stream, before
    /// routing.
    pub fn tap<F: FnMut(&Message) + Send + 'static>(mut self, tap: F) -> Self {
        self.tap = Some(Box::new(tap));
        self
    }

    /// Called with every raw byte drained from the serial ring, including
    /// SysEx payload and stray bytes that never form a message. Runs on the
    /// poll thread, never in the receive interrupt.
    pub fn byte_tap<F: FnMut(u8) + Send + 'static>(mut self, tap: F) -> Self {
        self.byte_tap = Some(Box::new(tap));
        self
    }

    pub fn build(self) -> Result<(Bridge, ByteRingProducer)> {
        self.config.validate()?;

        let link = self.link.ok_or(Error::MissingTransport("link"))?;
        let host_bus = self.host_bus.ok_or(Error::MissingTransport("host bus"))?;

        let (producer, consumer) = byte_ring(self.config.ring_capacity)?;
        let map = ChannelMapHandle::new(self.config.channel_map.clone())?;
        let tap = self
            .tap
            .unwrap_or_else(|| Box::new(|_: &Message| {}) as Tap);
        let indicator = self
            .indicator
            .unwrap_or_else(|| Box::new(NoIndicator) as BoxedIndicator);

        tracing::debug!(
            "Bridge built (ring {} bytes, link gap {:?})",
            self.config.ring_capacity,
            self.config.link.min_byte_gap
        );

        let bridge = Bridge::from_parts(
            self.config.clone(),
            consumer,
            MessageParser::with_listener(tap),
            self.byte_tap,
            ChannelRouter::new(map),
            LinkTransmitter::new(link, self.config.link),
            HostBusPort::new(host_bus),
            indicator,
        );
        Ok((bridge, producer))
    }
}

impl std::fmt::Debug for BridgeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeBuilder")
            .field("config", &self.config)
            .field("link", &self.link.is_some())
            .field("host_bus", &self.host_bus.is_some())
            .field("indicator", &self.indicator.is_some())
            .field("tap", &self.tap.is_some())
            .field("byte_tap", &self.byte_tap.is_some())
            .finish()
    }
}
