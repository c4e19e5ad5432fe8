//! The polled data path.
//!
//! One `poll` drains the serial ring through the parser, then drains the
//! host bus through the packet codec, routing every completed message.
//! Link pacing blocks inside `poll`; nothing else shares this context, so
//! the only effect is that later bytes wait in the ring.

use crate::builder::BridgeBuilder;
use crate::config::BridgeConfig;
use midiboy_io::{
    ActivityIndicator, ByteRingConsumer, ChannelMapHandle, ChannelRouter, HostBus, HostBusPort,
    HostBusStats, LinkPrimitive, LinkTransmitter, RingStats, RouteOutcome, RouterStats,
};
use midiboy_midi::{Message, MessageParser, ParserStats};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

pub(crate) type BoxedLink = Box<dyn LinkPrimitive + Send>;
pub(crate) type BoxedHostBus = Box<dyn HostBus + Send>;
pub(crate) type BoxedIndicator = Box<dyn ActivityIndicator + Send>;

/// Observer for every message parsed from the serial stream.
pub type Tap = Box<dyn FnMut(&Message) + Send>;

/// Observer for every raw byte taken from the serial ring, called on the
/// poll thread before the byte is parsed.
pub type ByteTap = Box<dyn FnMut(u8) + Send>;

/// What one `poll` did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PollSummary {
    /// Serial bytes taken from the ring.
    pub bytes: usize,
    pub controller_messages: usize,
    pub host_messages: usize,
    /// Messages written to the link, from either source.
    pub forwarded: usize,
}

impl PollSummary {
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.bytes == 0 && self.host_messages == 0
    }
}

/// Snapshot of every counter on the data path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BridgeStats {
    pub ring: RingStats,
    pub parser: ParserStats,
    pub router: RouterStats,
    pub host_bus: HostBusStats,
    pub link_bytes_sent: u64,
}

pub struct Bridge {
    config: BridgeConfig,
    ring: ByteRingConsumer,
    parser: MessageParser<Tap>,
    byte_tap: Option<ByteTap>,
    router: ChannelRouter,
    link: LinkTransmitter<BoxedLink>,
    host: HostBusPort<BoxedHostBus>,
    indicator: BoxedIndicator,
    /// Ring overflow count already reported.
    overflows_seen: u64,
}

impl Bridge {
    pub fn builder() -> BridgeBuilder {
        BridgeBuilder::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        config: BridgeConfig,
        ring: ByteRingConsumer,
        parser: MessageParser<Tap>,
        byte_tap: Option<ByteTap>,
        router: ChannelRouter,
        link: LinkTransmitter<BoxedLink>,
        host: HostBusPort<BoxedHostBus>,
        indicator: BoxedIndicator,
    ) -> Self {
        Self {
            config,
            ring,
            parser,
            byte_tap,
            router,
            link,
            host,
            indicator,
            overflows_seen: 0,
        }
    }

    /// One pass of the data path. Bytes that arrive during the pass wait for
    /// the next one.
    pub fn poll(&mut self) -> PollSummary {
        let mut summary = PollSummary::default();
        self.report_overflows();

        for _ in 0..self.ring.pending() {
            let Some(byte) = self.ring.pop() else {
                break;
            };
            summary.bytes += 1;
            if let Some(tap) = self.byte_tap.as_mut() {
                tap(byte);
            }

            if let Some(message) = self.parser.parse_byte(byte) {
                summary.controller_messages += 1;
                let outcome = self.router.route_controller(
                    &message,
                    &mut self.link,
                    &mut self.host,
                    &mut *self.indicator,
                );
                if matches!(outcome, RouteOutcome::Forwarded { .. }) {
                    summary.forwarded += 1;
                }
            }
        }

        while let Some(message) = self.host.read_message() {
            summary.host_messages += 1;
            let outcome = self
                .router
                .route_host(&message, &mut self.link, &mut *self.indicator);
            if matches!(outcome, RouteOutcome::Forwarded { .. }) {
                summary.forwarded += 1;
            }
        }

        summary
    }

    /// Poll until `running` is cleared, then flush the link.
    pub fn run(&mut self, running: &AtomicBool) {
        tracing::debug!("Bridge running");
        while running.load(Ordering::Acquire) {
            if self.poll().is_idle() {
                thread::yield_now();
            }
        }
        self.link.flush();
        tracing::debug!("Bridge stopped: {:?}", self.stats());
    }

    /// Block until every byte handed to the link has been shifted out.
    pub fn flush(&mut self) {
        self.link.flush();
    }

    fn report_overflows(&mut self) {
        let overflows = self.ring.stats().overflows;
        if overflows > self.overflows_seen {
            tracing::warn!(
                "Serial input overflow: {} bytes dropped ({} total)",
                overflows - self.overflows_seen,
                overflows
            );
            self.overflows_seen = overflows;
        }
    }

    /// Handle for replacing the channel map from another thread.
    pub fn channel_map(&self) -> &ChannelMapHandle {
        self.router.channel_map()
    }

    /// Current configuration. The channel map is the active one, so a
    /// replacement made through [`Bridge::channel_map`] is reflected here.
    pub fn config(&self) -> BridgeConfig {
        BridgeConfig {
            channel_map: (*self.router.channel_map().load()).clone(),
            ..self.config.clone()
        }
    }

    pub fn is_host_mounted(&self) -> bool {
        self.host.is_mounted()
    }

    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            ring: self.ring.stats(),
            parser: self.parser.stats(),
            router: self.router.stats(),
            host_bus: self.host.stats(),
            link_bytes_sent: self.link.bytes_sent(),
        }
    }

    /// Clears every counter except the link byte count.
    pub fn reset_stats(&mut self) {
        self.ring.reset_stats();
        self.parser.reset_stats();
        self.router.reset_stats();
        self.host.reset_stats();
        self.overflows_seen = 0;
    }
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("config", &self.config)
            .field("ring", &self.ring)
            .field("link", &self.link)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}
