//! MAVLink v2 frame decoding.
//!
//! A datagram is validated structurally and exposed as a borrowed [`Frame`];
//! anything that does not hold a complete v2 frame becomes a
//! [`FrameRejection`] value rather than an error path.

pub mod decode;
pub mod header;

pub use decode::{FrameRejection, decode_frame};
pub use header::{
    CHECKSUM_LEN,
    Frame,
    HEADER_LEN,
    MAGIC_V2,
    MAX_DATAGRAM_LEN,
    MIN_FRAME_LEN,
};
