//! Byte-at-a-time MIDI stream parser with running status.
//!
//! Feeds on raw bytes from a serial MIDI input and reconstructs complete
//! [`Message`]s:
//!
//! - Real-time bytes (>= 0xF8) are emitted immediately, wherever they appear,
//!   without touching running status or the message being assembled.
//! - Channel voice status bytes set running status; a bare data byte while
//!   idle resumes the running-status message.
//! - System common status bytes clear running status. SysEx blocks are
//!   skipped until 0xF7.
//! - Note-on with zero velocity is emitted as note-off.
//!
//! Completed messages are returned from [`MessageParser::parse_byte`], handed
//! to the listener chosen at construction, and stored in a one-slot mailbox
//! (latest wins) for pollers.

use crate::message::{Message, MessageKind};
use serde::Serialize;

/// Receives every message the parser completes, on the parsing thread.
pub trait MessageListener {
    fn on_message(&mut self, message: &Message);
}

impl<F: FnMut(&Message)> MessageListener for F {
    #[inline]
    fn on_message(&mut self, message: &Message) {
        self(message)
    }
}

/// Listener that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoListener;

impl MessageListener for NoListener {
    #[inline]
    fn on_message(&mut self, _message: &Message) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParserState {
    Idle,
    CollectingData1,
    CollectingData2,
    /// Inside a SysEx block; data bytes are discarded until 0xF7.
    IgnoringSystemBlock,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ParserStats {
    pub bytes_parsed: u64,
    pub messages: u64,
    /// Stray data bytes and SysEx payload.
    pub discarded: u64,
}

/// The message being assembled.
#[derive(Clone, Copy, Debug)]
struct Partial {
    kind: MessageKind,
    status: u8,
    data1: u8,
    expected: usize,
}

pub struct MessageParser<L = NoListener> {
    state: ParserState,
    running_status: Option<u8>,
    partial: Option<Partial>,
    mailbox: Option<Message>,
    listener: L,
    stats: ParserStats,
}

impl MessageParser<NoListener> {
    pub fn new() -> Self {
        Self::with_listener(NoListener)
    }
}

impl Default for MessageParser<NoListener> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: MessageListener> MessageParser<L> {
    pub fn with_listener(listener: L) -> Self {
        Self {
            state: ParserState::Idle,
            running_status: None,
            partial: None,
            mailbox: None,
            listener,
            stats: ParserStats::default(),
        }
    }

    /// Feed one byte. Returns the message it completes, if any.
    pub fn parse_byte(&mut self, byte: u8) -> Option<Message> {
        self.stats.bytes_parsed += 1;

        if byte >= 0xF8 {
            return match MessageKind::from_status(byte) {
                Some(kind) => {
                    let message = Message::single(kind);
                    self.stats.messages += 1;
                    self.listener.on_message(&message);
                    Some(message)
                }
                None => {
                    self.stats.discarded += 1;
                    None
                }
            };
        }

        if byte & 0x80 != 0 {
            self.parse_status(byte)
        } else {
            self.parse_data(byte)
        }
    }

    /// Feed a slice, appending completed messages to `out`.
    pub fn parse_into(&mut self, bytes: &[u8], out: &mut Vec<Message>) {
        out.extend(bytes.iter().filter_map(|&b| self.parse_byte(b)));
    }

    fn parse_status(&mut self, status: u8) -> Option<Message> {
        if status < 0xF0 {
            self.running_status = Some(status);
            return self.begin(status);
        }

        self.running_status = None;
        self.partial = None;
        match status {
            0xF0 => {
                self.state = ParserState::IgnoringSystemBlock;
                None
            }
            0xF7 => {
                self.state = ParserState::Idle;
                None
            }
            0xF1..=0xF3 | 0xF6 => self.begin(status),
            _ => {
                self.state = ParserState::Idle;
                self.stats.discarded += 1;
                None
            }
        }
    }

    fn parse_data(&mut self, byte: u8) -> Option<Message> {
        if self.state == ParserState::Idle {
            if let Some(status) = self.running_status {
                // Running status: bare data byte resumes the last voice message.
                self.begin(status);
            }
        }

        match (self.state, self.partial) {
            (ParserState::CollectingData1, Some(mut partial)) => {
                if partial.expected == 1 {
                    Some(self.complete(partial, byte, 0))
                } else {
                    partial.data1 = byte;
                    self.partial = Some(partial);
                    self.state = ParserState::CollectingData2;
                    None
                }
            }
            (ParserState::CollectingData2, Some(partial)) => {
                Some(self.complete(partial, partial.data1, byte))
            }
            _ => {
                self.stats.discarded += 1;
                None
            }
        }
    }

    /// Start a message for `status`; completes immediately if it carries no data.
    fn begin(&mut self, status: u8) -> Option<Message> {
        let kind = MessageKind::from_status(status)?;
        let partial = Partial {
            kind,
            status,
            data1: 0,
            expected: kind.data_len(),
        };
        if partial.expected == 0 {
            return Some(self.complete(partial, 0, 0));
        }
        self.partial = Some(partial);
        self.state = ParserState::CollectingData1;
        None
    }

    fn complete(&mut self, partial: Partial, data1: u8, data2: u8) -> Message {
        let message =
            Message::from_parts(partial.kind, partial.status & 0x0F, data1, data2).normalized();
        self.partial = None;
        self.state = ParserState::Idle;
        self.stats.messages += 1;
        self.listener.on_message(&message);
        self.mailbox = Some(message);
        message
    }

    /// True if the mailbox holds an unread message.
    #[inline]
    pub fn message_available(&self) -> bool {
        self.mailbox.is_some()
    }

    /// Take the most recent completed (non real-time) message.
    #[inline]
    pub fn take_message(&mut self) -> Option<Message> {
        self.mailbox.take()
    }

    #[inline]
    pub fn state(&self) -> ParserState {
        self.state
    }

    #[inline]
    pub fn running_status(&self) -> Option<u8> {
        self.running_status
    }

    #[inline]
    pub fn stats(&self) -> ParserStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = ParserStats::default();
    }

    /// Back to idle: no running status, nothing in flight, empty mailbox.
    pub fn reset(&mut self) {
        self.state = ParserState::Idle;
        self.running_status = None;
        self.partial = None;
        self.mailbox = None;
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }
}

impl<L> std::fmt::Debug for MessageParser<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageParser")
            .field("state", &self.state)
            .field("running_status", &self.running_status)
            .field("stats", &self.stats)
            .finish()
    }
}
