//! USB-MIDI 1.0 event packet codec.
//!
//! A packet is four bytes: `[cable << 4 | code_index, midi0, midi1, midi2]`.
//! The code index number (CIN) fixes how many of the three payload bytes are
//! meaningful. Unused payload bytes are zero on encode and ignored on decode.

use crate::message::{Message, MessageKind};

pub const PACKET_LEN: usize = 4;

pub type UsbMidiPacket = [u8; PACKET_LEN];

/// Code index numbers used by the bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CodeIndex {
    /// Two-byte system common (MTC quarter frame, song select).
    TwoByteSystemCommon = 0x2,
    /// Three-byte system common (song position).
    ThreeByteSystemCommon = 0x3,
    /// Single-byte system common (tune request, standalone F0/F7).
    SingleByteSystemCommon = 0x5,
    NoteOff = 0x8,
    NoteOn = 0x9,
    PolyPressure = 0xA,
    ControlChange = 0xB,
    ProgramChange = 0xC,
    ChannelPressure = 0xD,
    PitchBend = 0xE,
    /// Single byte (real-time).
    SingleByte = 0xF,
}

impl CodeIndex {
    /// `None` for codes the bridge does not handle (SysEx streaming, reserved).
    pub fn from_nibble(nibble: u8) -> Option<Self> {
        let cin = match nibble & 0x0F {
            0x2 => Self::TwoByteSystemCommon,
            0x3 => Self::ThreeByteSystemCommon,
            0x5 => Self::SingleByteSystemCommon,
            0x8 => Self::NoteOff,
            0x9 => Self::NoteOn,
            0xA => Self::PolyPressure,
            0xB => Self::ControlChange,
            0xC => Self::ProgramChange,
            0xD => Self::ChannelPressure,
            0xE => Self::PitchBend,
            0xF => Self::SingleByte,
            _ => return None,
        };
        Some(cin)
    }

    /// Number of meaningful payload bytes.
    pub fn byte_count(self) -> usize {
        match self {
            Self::SingleByteSystemCommon | Self::SingleByte => 1,
            Self::TwoByteSystemCommon | Self::ProgramChange | Self::ChannelPressure => 2,
            Self::ThreeByteSystemCommon
            | Self::NoteOff
            | Self::NoteOn
            | Self::PolyPressure
            | Self::ControlChange
            | Self::PitchBend => 3,
        }
    }

    pub fn for_kind(kind: MessageKind) -> Self {
        match kind {
            MessageKind::NoteOff => Self::NoteOff,
            MessageKind::NoteOn => Self::NoteOn,
            MessageKind::PolyPressure => Self::PolyPressure,
            MessageKind::ControlChange => Self::ControlChange,
            MessageKind::ProgramChange => Self::ProgramChange,
            MessageKind::ChannelPressure => Self::ChannelPressure,
            MessageKind::PitchBend => Self::PitchBend,
            MessageKind::MtcQuarterFrame | MessageKind::SongSelect => Self::TwoByteSystemCommon,
            MessageKind::SongPosition => Self::ThreeByteSystemCommon,
            MessageKind::SysExStart | MessageKind::SysExEnd | MessageKind::TuneRequest => {
                Self::SingleByteSystemCommon
            }
            MessageKind::Clock
            | MessageKind::Start
            | MessageKind::Continue
            | MessageKind::Stop
            | MessageKind::ActiveSensing
            | MessageKind::SystemReset => Self::SingleByte,
        }
    }
}

#[inline]
pub fn cable_number(packet: &UsbMidiPacket) -> u8 {
    packet[0] >> 4
}

/// Decode a packet. The cable number is ignored.
///
/// Returns `None` for unrecognized code indices and for payloads that are
/// not a well-formed message of the indicated length.
pub fn decode(packet: &UsbMidiPacket) -> Option<Message> {
    let cin = CodeIndex::from_nibble(packet[0])?;
    let payload = &packet[1..1 + cin.byte_count()];
    match Message::from_bytes(payload) {
        Ok(message) => Some(message),
        Err(e) => {
            tracing::trace!("Dropping USB-MIDI packet {:02X?}: {}", packet, e);
            None
        }
    }
}

/// Encode on cable 0.
#[inline]
pub fn encode(message: &Message) -> UsbMidiPacket {
    encode_with_cable(message, 0)
}

pub fn encode_with_cable(message: &Message, cable: u8) -> UsbMidiPacket {
    let cin = CodeIndex::for_kind(message.kind());
    let mut packet = [((cable & 0x0F) << 4) | cin as u8, 0, 0, 0];
    let bytes = message.bytes();
    packet[1..1 + bytes.len()].copy_from_slice(bytes);
    packet
}
