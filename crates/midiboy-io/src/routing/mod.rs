//! Channel remapping and forwarding.
//!
//! Maps the 16 external MIDI channels onto the link device's internal
//! channels, rewrites eligible channel voice messages, and forwards them
//! byte by byte. Messages from the serial input are also mirrored to the
//! host bus, unfiltered.

mod map;
mod router;

pub use map::{
    ChannelMap, ChannelMapHandle, DropReason, EXTERNAL_CHANNEL_COUNT, INTERNAL_CHANNEL_COUNT,
    NOISE, POLY, PULSE_1, PULSE_2, WAVE,
};
pub use router::{ByteSink, ChannelRouter, MirrorSink, RouteOutcome, RouterStats};
