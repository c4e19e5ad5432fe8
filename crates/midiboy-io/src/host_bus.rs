//! Host bus (USB-MIDI) access.
//!
//! [`HostBus`] is the contract of the device-class stack: non-blocking
//! packet reads and writes plus the session state. [`HostBusPort`] wraps a
//! bus with the packet codec and counters. [`memory_host_bus`] builds an
//! in-memory bus whose [`HostEndpoint`] plays the host.

use crate::error::{Error, Result};
use crate::routing::MirrorSink;
use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError};
use midiboy_midi::{packet, Message, UsbMidiPacket};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub trait HostBus {
    /// Whether the host has established a session.
    fn is_mounted(&self) -> bool;

    fn packet_available(&self) -> bool;

    fn read_packet(&mut self) -> Option<UsbMidiPacket>;

    /// Returns `false` if the packet could not be queued.
    fn write_packet(&mut self, packet: UsbMidiPacket) -> bool;
}

impl<B: HostBus + ?Sized> HostBus for Box<B> {
    #[inline]
    fn is_mounted(&self) -> bool {
        (**self).is_mounted()
    }

    #[inline]
    fn packet_available(&self) -> bool {
        (**self).packet_available()
    }

    #[inline]
    fn read_packet(&mut self) -> Option<UsbMidiPacket> {
        (**self).read_packet()
    }

    #[inline]
    fn write_packet(&mut self, packet: UsbMidiPacket) -> bool {
        (**self).write_packet(packet)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct HostBusStats {
    pub rx_packets: u64,
    /// Received packets the codec could not decode.
    pub rx_rejected: u64,
    pub tx_packets: u64,
    /// Sends dropped (no session, full queue, or malformed raw bytes).
    pub tx_drops: u64,
}

pub struct HostBusPort<B> {
    bus: B,
    stats: HostBusStats,
    /// Session state as of the last send, for transition logging.
    session: Option<bool>,
}

impl<B: HostBus> HostBusPort<B> {
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            stats: HostBusStats::default(),
            session: None,
        }
    }

    /// Next decodable message from the host, skipping packets the codec
    /// rejects. `None` once no packet is pending.
    pub fn read_message(&mut self) -> Option<Message> {
        while self.bus.packet_available() {
            let Some(raw) = self.bus.read_packet() else {
                break;
            };
            self.stats.rx_packets += 1;
            match packet::decode(&raw) {
                Some(message) => return Some(message),
                None => self.stats.rx_rejected += 1,
            }
        }
        None
    }

    /// Encode and send on cable 0. Dropped without retry if the host has no
    /// session or the bus refuses the packet.
    pub fn send_message(&mut self, message: &Message) -> bool {
        let mounted = self.bus.is_mounted();
        self.note_session(mounted);

        if mounted && self.bus.write_packet(packet::encode(message)) {
            self.stats.tx_packets += 1;
            true
        } else {
            self.stats.tx_drops += 1;
            false
        }
    }

    /// Send a raw 1-3 byte message.
    pub fn send_raw(&mut self, bytes: &[u8]) -> bool {
        match Message::from_bytes(bytes) {
            Ok(message) => self.send_message(&message),
            Err(e) => {
                tracing::trace!("Not sending {:02X?}: {}", bytes, e);
                self.stats.tx_drops += 1;
                false
            }
        }
    }

    fn note_session(&mut self, mounted: bool) {
        if self.session == Some(mounted) {
            return;
        }
        if mounted {
            tracing::debug!("Host bus session established");
        } else {
            tracing::warn!("Host bus has no session, dropping outgoing messages");
        }
        self.session = Some(mounted);
    }

    #[inline]
    pub fn is_mounted(&self) -> bool {
        self.bus.is_mounted()
    }

    #[inline]
    pub fn stats(&self) -> HostBusStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = HostBusStats::default();
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }
}

impl<B: HostBus> MirrorSink for HostBusPort<B> {
    #[inline]
    fn mirror(&mut self, message: &Message) -> bool {
        self.send_message(message)
    }
}

impl<B> std::fmt::Debug for HostBusPort<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostBusPort")
            .field("stats", &self.stats)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Device side of an in-memory host bus.
#[derive(Debug)]
pub struct MemoryHostBus {
    from_host: Receiver<UsbMidiPacket>,
    to_host: Sender<UsbMidiPacket>,
    mounted: Arc<AtomicBool>,
}

/// Host side of an in-memory host bus.
#[derive(Debug, Clone)]
pub struct HostEndpoint {
    to_device: Sender<UsbMidiPacket>,
    from_device: Receiver<UsbMidiPacket>,
    mounted: Arc<AtomicBool>,
}

/// Build a bus with `depth` packets of buffering per direction. Starts
/// unmounted, like a device waiting for enumeration.
pub fn memory_host_bus(depth: usize) -> Result<(MemoryHostBus, HostEndpoint)> {
    if depth == 0 {
        return Err(Error::HostBusUnavailable(
            "packet buffer depth must be non-zero".to_string(),
        ));
    }

    let (to_device, from_host) = bounded(depth);
    let (to_host, from_device) = bounded(depth);
    let mounted = Arc::new(AtomicBool::new(false));

    tracing::debug!("Created in-memory host bus ({} packets per direction)", depth);

    Ok((
        MemoryHostBus {
            from_host,
            to_host,
            mounted: Arc::clone(&mounted),
        },
        HostEndpoint {
            to_device,
            from_device,
            mounted,
        },
    ))
}

impl HostBus for MemoryHostBus {
    fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    fn packet_available(&self) -> bool {
        !self.from_host.is_empty()
    }

    fn read_packet(&mut self) -> Option<UsbMidiPacket> {
        self.from_host.try_recv().ok()
    }

    fn write_packet(&mut self, packet: UsbMidiPacket) -> bool {
        self.is_mounted() && self.to_host.try_send(packet).is_ok()
    }
}

impl HostEndpoint {
    pub fn mount(&self) {
        self.mounted.store(true, Ordering::Release);
    }

    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::Release);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::Acquire)
    }

    /// Queue a packet for the device. `false` if the buffer is full.
    pub fn send_packet(&self, packet: UsbMidiPacket) -> bool {
        self.to_device.try_send(packet).is_ok()
    }

    pub fn send_message(&self, message: &Message) -> bool {
        self.send_packet(packet::encode(message))
    }

    pub fn recv_packet(&self) -> Option<UsbMidiPacket> {
        match self.from_device.try_recv() {
            Ok(packet) => Some(packet),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Every packet the device has sent so far, decoded.
    pub fn drain_messages(&self) -> Vec<Message> {
        std::iter::from_fn(|| self.recv_packet())
            .filter_map(|raw| packet::decode(&raw))
            .collect()
    }
}
