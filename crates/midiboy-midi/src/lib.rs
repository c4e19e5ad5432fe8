//! MIDI protocol core for the MIDIBoy bridge.
//!
//! Pure types and state machines, no I/O:
//!
//! - [`Message`] / [`MessageKind`]: decoded message with its raw 1-3 wire bytes
//! - [`MessageParser`]: byte-at-a-time stream parser (running status,
//!   real-time interleaving, SysEx skipping)
//! - [`packet`]: USB-MIDI 4-byte event packet codec
//!
//! # Example
//!
//! ```
//! use midiboy_midi::{packet, Message, MessageParser};
//!
//! let mut parser = MessageParser::new();
//! let mut messages = Vec::new();
//! parser.parse_into(&[0x90, 0x40, 0x7F, 0x40, 0x00], &mut messages);
//! assert_eq!(messages[1], Message::note_off(0, 0x40, 0));
//!
//! let usb = packet::encode(&messages[0]);
//! assert_eq!(packet::decode(&usb), Some(messages[0]));
//! ```

pub mod error;
pub use error::{Error, Result};

pub(crate) mod message;
pub use message::{Message, MessageKind};

pub mod parser;
pub use parser::{MessageListener, MessageParser, NoListener, ParserState, ParserStats};

pub mod packet;
pub use packet::{CodeIndex, UsbMidiPacket};
