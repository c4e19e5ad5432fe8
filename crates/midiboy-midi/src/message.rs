//! Decoded MIDI message with its raw wire bytes.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Closed set of message kinds understood by the bridge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    // Channel voice (0x8n - 0xEn)
    NoteOff,
    NoteOn,
    PolyPressure,
    ControlChange,
    ProgramChange,
    ChannelPressure,
    PitchBend,

    // System common (0xF0 - 0xF7)
    SysExStart,
    MtcQuarterFrame,
    SongPosition,
    SongSelect,
    TuneRequest,
    SysExEnd,

    // System real-time (0xF8 - 0xFF)
    Clock,
    Start,
    Continue,
    Stop,
    ActiveSensing,
    SystemReset,
}

#[allow(clippy::len_without_is_empty)]
impl MessageKind {
    /// Classify a status byte.
    ///
    /// Returns `None` for data bytes and for the undefined status bytes
    /// (0xF4, 0xF5, 0xF9, 0xFD).
    pub fn from_status(status: u8) -> Option<Self> {
        let kind = match status & 0xF0 {
            0x80 => Self::NoteOff,
            0x90 => Self::NoteOn,
            0xA0 => Self::PolyPressure,
            0xB0 => Self::ControlChange,
            0xC0 => Self::ProgramChange,
            0xD0 => Self::ChannelPressure,
            0xE0 => Self::PitchBend,
            0xF0 => match status {
                0xF0 => Self::SysExStart,
                0xF1 => Self::MtcQuarterFrame,
                0xF2 => Self::SongPosition,
                0xF3 => Self::SongSelect,
                0xF6 => Self::TuneRequest,
                0xF7 => Self::SysExEnd,
                0xF8 => Self::Clock,
                0xFA => Self::Start,
                0xFB => Self::Continue,
                0xFC => Self::Stop,
                0xFE => Self::ActiveSensing,
                0xFF => Self::SystemReset,
                _ => return None,
            },
            _ => return None,
        };
        Some(kind)
    }

    /// Status byte for this kind. Channel voice kinds return the base
    /// status with a zero channel nibble.
    pub fn status(self) -> u8 {
        match self {
            Self::NoteOff => 0x80,
            Self::NoteOn => 0x90,
            Self::PolyPressure => 0xA0,
            Self::ControlChange => 0xB0,
            Self::ProgramChange => 0xC0,
            Self::ChannelPressure => 0xD0,
            Self::PitchBend => 0xE0,
            Self::SysExStart => 0xF0,
            Self::MtcQuarterFrame => 0xF1,
            Self::SongPosition => 0xF2,
            Self::SongSelect => 0xF3,
            Self::TuneRequest => 0xF6,
            Self::SysExEnd => 0xF7,
            Self::Clock => 0xF8,
            Self::Start => 0xFA,
            Self::Continue => 0xFB,
            Self::Stop => 0xFC,
            Self::ActiveSensing => 0xFE,
            Self::SystemReset => 0xFF,
        }
    }

    /// Number of data bytes following the status byte.
    #[inline]
    pub fn data_len(self) -> usize {
        match self {
            Self::NoteOff
            | Self::NoteOn
            | Self::PolyPressure
            | Self::ControlChange
            | Self::PitchBend
            | Self::SongPosition => 2,
            Self::ProgramChange
            | Self::ChannelPressure
            | Self::MtcQuarterFrame
            | Self::SongSelect => 1,
            _ => 0,
        }
    }

    /// Total wire length including the status byte (1-3).
    #[inline]
    pub fn len(self) -> usize {
        1 + self.data_len()
    }

    #[inline]
    pub fn is_channel_voice(self) -> bool {
        matches!(
            self,
            Self::NoteOff
                | Self::NoteOn
                | Self::PolyPressure
                | Self::ControlChange
                | Self::ProgramChange
                | Self::ChannelPressure
                | Self::PitchBend
        )
    }

    #[inline]
    pub fn is_system_common(self) -> bool {
        matches!(
            self,
            Self::SysExStart
                | Self::MtcQuarterFrame
                | Self::SongPosition
                | Self::SongSelect
                | Self::TuneRequest
                | Self::SysExEnd
        )
    }

    #[inline]
    pub fn is_realtime(self) -> bool {
        matches!(
            self,
            Self::Clock
                | Self::Start
                | Self::Continue
                | Self::Stop
                | Self::ActiveSensing
                | Self::SystemReset
        )
    }
}

/// A complete MIDI message.
///
/// `len` is always `kind.len()`; bytes past `len` in `data` are zero.
/// `channel` is meaningful for channel voice kinds only and is 0 otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Message {
    kind: MessageKind,
    channel: u8,
    data: [u8; 3],
    len: u8,
}

#[allow(clippy::len_without_is_empty)]
impl Message {
    /// Out-of-range values saturate: channel to 15, data to 127. Data
    /// bytes past the kind's length are ignored.
    pub(crate) fn from_parts(kind: MessageKind, channel: u8, data1: u8, data2: u8) -> Self {
        let channel = if kind.is_channel_voice() {
            channel.min(0x0F)
        } else {
            0
        };
        let status = if kind.is_channel_voice() {
            kind.status() | channel
        } else {
            kind.status()
        };
        let len = kind.len();
        let mut data = [status, data1.min(0x7F), data2.min(0x7F)];
        for byte in data.iter_mut().skip(len) {
            *byte = 0;
        }
        Self {
            kind,
            channel,
            data,
            len: len as u8,
        }
    }

    /// Single-byte message for a system real-time or zero-data system common kind.
    #[inline]
    pub fn single(kind: MessageKind) -> Self {
        Self::from_parts(kind, 0, 0, 0)
    }

    #[inline]
    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        Self::from_parts(MessageKind::NoteOn, channel, note, velocity)
    }

    #[inline]
    pub fn note_off(channel: u8, note: u8, velocity: u8) -> Self {
        Self::from_parts(MessageKind::NoteOff, channel, note, velocity)
    }

    #[inline]
    pub fn poly_pressure(channel: u8, note: u8, pressure: u8) -> Self {
        Self::from_parts(MessageKind::PolyPressure, channel, note, pressure)
    }

    #[inline]
    pub fn control_change(channel: u8, control: u8, value: u8) -> Self {
        Self::from_parts(MessageKind::ControlChange, channel, control, value)
    }

    #[inline]
    pub fn program_change(channel: u8, program: u8) -> Self {
        Self::from_parts(MessageKind::ProgramChange, channel, program, 0)
    }

    #[inline]
    pub fn channel_pressure(channel: u8, pressure: u8) -> Self {
        Self::from_parts(MessageKind::ChannelPressure, channel, pressure, 0)
    }

    /// `value`: unsigned 14-bit (0 to 16383, 8192 = center).
    #[inline]
    pub fn pitch_bend(channel: u8, value: u16) -> Self {
        let value = value.min(0x3FFF);
        Self::from_parts(
            MessageKind::PitchBend,
            channel,
            (value & 0x7F) as u8,
            ((value >> 7) & 0x7F) as u8,
        )
    }

    /// Whole-message decoder: `bytes` must be exactly one message.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let status = *bytes.first().ok_or(Error::Empty)?;
        if status & 0x80 == 0 {
            return Err(Error::NotAStatusByte(status));
        }
        let kind = MessageKind::from_status(status).ok_or(Error::UndefinedStatus(status))?;
        if bytes.len() != kind.len() {
            return Err(Error::LengthMismatch {
                kind,
                expected: kind.len(),
                actual: bytes.len(),
            });
        }
        if let Some(&bad) = bytes[1..].iter().find(|&&b| b & 0x80 != 0) {
            return Err(Error::InvalidDataByte(bad));
        }
        let data1 = bytes.get(1).copied().unwrap_or(0);
        let data2 = bytes.get(2).copied().unwrap_or(0);
        Ok(Self::from_parts(kind, status & 0x0F, data1, data2))
    }

    #[inline]
    pub fn kind(&self) -> MessageKind {
        self.kind
    }

    #[inline]
    pub fn channel(&self) -> u8 {
        self.channel
    }

    #[inline]
    pub fn status(&self) -> u8 {
        self.data[0]
    }

    /// First data byte, 0 when the kind carries none.
    #[inline]
    pub fn data1(&self) -> u8 {
        self.data[1]
    }

    /// Second data byte, defined only when `len() == 3`.
    #[inline]
    pub fn data2(&self) -> Option<u8> {
        (self.len == 3).then_some(self.data[2])
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// The `len()` valid raw bytes.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    #[inline]
    pub fn is_channel_voice(&self) -> bool {
        self.kind.is_channel_voice()
    }

    #[inline]
    pub fn is_realtime(&self) -> bool {
        self.kind.is_realtime()
    }

    #[inline]
    pub fn note(&self) -> Option<u8> {
        match self.kind {
            MessageKind::NoteOn | MessageKind::NoteOff | MessageKind::PolyPressure => {
                Some(self.data[1])
            }
            _ => None,
        }
    }

    #[inline]
    pub fn velocity(&self) -> Option<u8> {
        match self.kind {
            MessageKind::NoteOn | MessageKind::NoteOff => Some(self.data[2]),
            _ => None,
        }
    }

    /// 14-bit pitch bend value (8192 = center).
    #[inline]
    pub fn bend(&self) -> Option<u16> {
        (self.kind == MessageKind::PitchBend)
            .then(|| u16::from(self.data[1]) | (u16::from(self.data[2]) << 7))
    }

    /// Copy with the status byte's channel nibble rewritten.
    /// Non-channel-voice messages are returned unchanged.
    pub fn with_channel(self, channel: u8) -> Self {
        if !self.kind.is_channel_voice() {
            return self;
        }
        let channel = channel.min(0x0F);
        let mut data = self.data;
        data[0] = self.kind.status() | channel;
        Self {
            channel,
            data,
            ..self
        }
    }

    /// Note-on with zero velocity becomes note-off (same channel and note,
    /// zero velocity). Everything else is returned unchanged.
    pub fn normalized(self) -> Self {
        match self.kind {
            MessageKind::NoteOn if self.data[2] == 0 => {
                Self::from_parts(MessageKind::NoteOff, self.channel, self.data[1], 0)
            }
            _ => self,
        }
    }
}
