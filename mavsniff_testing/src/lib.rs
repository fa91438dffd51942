//! Test support for `mavsniff`.
//!
//! Builds MAVLink v2 datagrams, scripts datagram sources for driving the
//! receive loop without a network, plays the vehicle side of a UDP link,
//! and captures log output.
//!
//! ```rust
//! use mavsniff::{Record, decode_frame, dispatch};
//! use mavsniff_testing::heartbeat_frame;
//!
//! let datagram = heartbeat_frame(0x0102_0304, 0x80);
//! let frame = decode_frame(&datagram).expect("valid frame");
//! assert!(matches!(dispatch(&frame), Some(Record::Heartbeat(hb)) if hb.armed));
//! ```

pub mod frames;
pub mod logging;
pub mod source;
pub mod vehicle;

pub use frames::{
    FrameBuilder,
    HeartbeatFields,
    global_position_frame,
    global_position_payload,
    heartbeat_frame,
    heartbeat_payload,
};
pub use logging::{LoggerHandle, logger};
pub use source::{ScriptedSource, Step};
pub use vehicle::{FakeVehicle, fake_vehicle, loopback_addr};
