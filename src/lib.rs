#![doc(html_root_url = "https://docs.rs/mavsniff/latest")]
//! Public API for the `mavsniff` library.
//!
//! This crate listens for MAVLink v2 telemetry on a UDP link, decodes
//! heartbeat and global position messages, and shuts its blocking receive
//! loop down cleanly on request.

pub mod byte_order;
pub mod frame;
pub mod message;
pub mod metrics;
pub mod session;
pub mod sink;

pub use frame::{Frame, FrameRejection, decode_frame};
pub use message::{GlobalPosition, Heartbeat, Record, TelemetryMessage, dispatch};
pub use session::{
    ListenerSession,
    ReceiveStats,
    ReceiverHandle,
    SessionConfig,
    SessionError,
    SessionState,
};
pub use sink::RecordSink;
