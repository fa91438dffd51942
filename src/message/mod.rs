//! Typed telemetry records and the dispatcher that produces them.
//!
//! Only two messages are understood: `HEARTBEAT` and `GLOBAL_POSITION_INT`.
//! Everything else, including known messages whose payload is too short,
//! dispatches to `None`.

mod global_position;
mod heartbeat;

use std::fmt;

pub use global_position::GlobalPosition;
pub use heartbeat::Heartbeat;
use serde::Serialize;

use crate::frame::Frame;

/// A message type that can be decoded from a frame payload.
///
/// Implementors describe where they live in the message catalogue; the
/// provided [`TelemetryMessage::from_frame`] performs the identifier and
/// length checks shared by every decoder.
pub trait TelemetryMessage: Sized {
    /// Message identifier carried in the frame header.
    const MESSAGE_ID: u32;
    /// Name used by the MAVLink common dialect.
    const NAME: &'static str;
    /// Shortest payload this decoder accepts.
    const MIN_PAYLOAD_LEN: usize;

    /// Decode the payload, assuming the identifier already matched.
    ///
    /// Returns `None` if a field cannot be read from `payload`.
    fn decode_payload(payload: &[u8]) -> Option<Self>;

    /// Decode `frame` if it carries this message with a long enough payload.
    fn from_frame(frame: &Frame<'_>) -> Option<Self> {
        if frame.message_id != Self::MESSAGE_ID || frame.payload.len() < Self::MIN_PAYLOAD_LEN {
            return None;
        }
        Self::decode_payload(frame.payload)
    }
}

/// A decoded telemetry record.
///
/// Serialises with a `msg` tag naming the MAVLink message.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "msg")]
pub enum Record {
    /// Vehicle heartbeat.
    #[serde(rename = "HEARTBEAT")]
    Heartbeat(Heartbeat),
    /// Fused global position.
    #[serde(rename = "GLOBAL_POSITION_INT")]
    GlobalPosition(GlobalPosition),
}

impl Record {
    /// MAVLink name of the message this record came from.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Heartbeat(_) => Heartbeat::NAME,
            Self::GlobalPosition(_) => GlobalPosition::NAME,
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heartbeat(heartbeat) => write!(f, "{} {heartbeat}", self.name()),
            Self::GlobalPosition(position) => write!(f, "{} {position}", self.name()),
        }
    }
}

/// Turn a validated frame into at most one record.
///
/// # Examples
///
/// ```
/// use mavsniff::{
///     frame::decode_frame,
///     message::{Record, dispatch},
/// };
///
/// let mut datagram = vec![0xFD, 9, 0, 0, 0, 1, 1, 0, 0, 0];
/// datagram.extend_from_slice(&[0, 0, 0, 0, 2, 3, 0x80, 4, 3]);
/// datagram.extend_from_slice(&[0, 0]);
///
/// let frame = decode_frame(&datagram).expect("valid frame");
/// let Some(Record::Heartbeat(heartbeat)) = dispatch(&frame) else {
///     panic!("expected a heartbeat");
/// };
/// assert!(heartbeat.armed);
/// ```
#[must_use]
pub fn dispatch(frame: &Frame<'_>) -> Option<Record> {
    Heartbeat::from_frame(frame)
        .map(Record::Heartbeat)
        .or_else(|| GlobalPosition::from_frame(frame).map(Record::GlobalPosition))
}
