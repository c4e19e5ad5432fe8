//! Per-message routing: mirror to the host bus, filter, rewrite, forward.

use super::map::{ChannelMapHandle, DropReason};
use crate::indicator::ActivityIndicator;
use midiboy_midi::Message;
use serde::Serialize;

/// Destination for forwarded link bytes.
pub trait ByteSink {
    fn send_byte(&mut self, byte: u8);
}

impl ByteSink for Vec<u8> {
    fn send_byte(&mut self, byte: u8) {
        self.push(byte);
    }
}

/// Destination for mirrored controller messages.
pub trait MirrorSink {
    /// Returns `false` if the message was dropped.
    fn mirror(&mut self, message: &Message) -> bool;
}

impl MirrorSink for Vec<Message> {
    fn mirror(&mut self, message: &Message) -> bool {
        self.push(*message);
        true
    }
}

/// What happened to a message on the link side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Rewritten to `internal` and handed to the link.
    Forwarded { internal: u8 },
    /// Channel voice message filtered out by the channel map.
    Dropped(DropReason),
    /// System or real-time message; never sent to the link.
    Ignored,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RouterStats {
    pub forwarded: u64,
    /// Policy drops (unmapped or disabled channel).
    pub dropped: u64,
    pub mirrored: u64,
    pub mirror_drops: u64,
}

pub struct ChannelRouter {
    map: ChannelMapHandle,
    stats: RouterStats,
}

impl ChannelRouter {
    pub fn new(map: ChannelMapHandle) -> Self {
        Self {
            map,
            stats: RouterStats::default(),
        }
    }

    /// Route a message parsed from the serial controller stream.
    ///
    /// The message is mirrored before any filtering, so the host bus sees
    /// every controller message including ones the link never gets.
    pub fn route_controller<S, M, I>(
        &mut self,
        message: &Message,
        link: &mut S,
        mirror: &mut M,
        indicator: &mut I,
    ) -> RouteOutcome
    where
        S: ByteSink + ?Sized,
        M: MirrorSink + ?Sized,
        I: ActivityIndicator + ?Sized,
    {
        if mirror.mirror(message) {
            self.stats.mirrored += 1;
        } else {
            self.stats.mirror_drops += 1;
        }
        self.forward(message, link, indicator)
    }

    /// Route a message decoded from the host bus. Never mirrored back.
    pub fn route_host<S, I>(&mut self, message: &Message, link: &mut S, indicator: &mut I) -> RouteOutcome
    where
        S: ByteSink + ?Sized,
        I: ActivityIndicator + ?Sized,
    {
        self.forward(message, link, indicator)
    }

    fn forward<S, I>(&mut self, message: &Message, link: &mut S, indicator: &mut I) -> RouteOutcome
    where
        S: ByteSink + ?Sized,
        I: ActivityIndicator + ?Sized,
    {
        if !message.is_channel_voice() {
            return RouteOutcome::Ignored;
        }

        let internal = match self.map.resolve(message.channel()) {
            Ok(internal) => internal,
            Err(reason) => {
                self.stats.dropped += 1;
                tracing::trace!("Dropped {:02X?}: {:?}", message.bytes(), reason);
                return RouteOutcome::Dropped(reason);
            }
        };

        let rewritten = message.with_channel(internal);
        for &byte in rewritten.bytes() {
            link.send_byte(byte);
        }
        self.stats.forwarded += 1;
        indicator.pulse();
        tracing::trace!("Forwarded {:02X?} -> {:02X?}", message.bytes(), rewritten.bytes());
        RouteOutcome::Forwarded { internal }
    }

    #[inline]
    pub fn channel_map(&self) -> &ChannelMapHandle {
        &self.map
    }

    #[inline]
    pub fn stats(&self) -> RouterStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = RouterStats::default();
    }
}

impl std::fmt::Debug for ChannelRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelRouter")
            .field("map", &self.map)
            .field("stats", &self.stats)
            .finish()
    }
}
