//! Layout constants and the validated frame view.

/// Start-of-frame marker for MAVLink v2.
pub const MAGIC_V2: u8 = 0xFD;
/// Fixed header length: magic, length, flags, sequence, ids and message id.
pub const HEADER_LEN: usize = 10;
/// Length of the trailing checksum.
pub const CHECKSUM_LEN: usize = 2;
/// Smallest datagram that can hold an empty-payload frame.
pub const MIN_FRAME_LEN: usize = HEADER_LEN + CHECKSUM_LEN;
/// Largest datagram a single receive is expected to deliver.
pub const MAX_DATAGRAM_LEN: usize = 2048;

/// A structurally valid MAVLink v2 frame borrowed from a datagram.
///
/// `payload` always holds exactly `payload_len` bytes and lies entirely
/// within the datagram it was decoded from. The checksum trailer is counted
/// in length validation but never inspected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Frame<'a> {
    /// Declared payload length from header byte 1.
    pub payload_len: u8,
    /// Incompatibility flags (byte 2).
    pub incompat_flags: u8,
    /// Compatibility flags (byte 3).
    pub compat_flags: u8,
    /// Packet sequence counter (byte 4).
    pub sequence: u8,
    /// Sending system (byte 5).
    pub system_id: u8,
    /// Sending component (byte 6).
    pub component_id: u8,
    /// 24-bit message identifier (bytes 7..10, little-endian).
    pub message_id: u32,
    /// Message payload.
    pub payload: &'a [u8],
}

impl Frame<'_> {
    /// Number of datagram bytes covered by this frame, trailer included.
    #[must_use]
    pub fn encoded_len(&self) -> usize { HEADER_LEN + usize::from(self.payload_len) + CHECKSUM_LEN }
}
