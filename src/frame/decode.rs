//! Structural validation of raw datagrams.

use thiserror::Error;

use super::header::{CHECKSUM_LEN, Frame, HEADER_LEN, MAGIC_V2, MIN_FRAME_LEN};
use crate::byte_order::read_le_u24;

/// Reasons a datagram does not hold a decodable v2 frame.
///
/// Rejections are checked in declaration order; the first failing check wins.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FrameRejection {
    /// Fewer bytes than an empty-payload frame needs.
    #[error("datagram too short: {len} < {MIN_FRAME_LEN}")]
    TooShort {
        /// Datagram length.
        len: usize,
    },
    /// First byte is not the v2 start marker.
    #[error("bad start marker: {found:#04x}")]
    BadMagic {
        /// Byte found where the marker was expected.
        found: u8,
    },
    /// Declared payload runs past the end of the datagram.
    #[error("incomplete frame: need {declared} bytes, have {available}")]
    Incomplete {
        /// Header, payload and trailer length implied by the length byte.
        declared: usize,
        /// Datagram length.
        available: usize,
    },
}

impl FrameRejection {
    /// Stable label for logs and metrics.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::TooShort { .. } => "too_short",
            Self::BadMagic { .. } => "bad_magic",
            Self::Incomplete { .. } => "incomplete",
        }
    }
}

/// Validate `datagram` and borrow a [`Frame`] from it.
///
/// Bytes after the end of the frame are ignored.
///
/// # Errors
///
/// Returns a [`FrameRejection`] when the datagram is shorter than a minimal
/// frame, does not start with [`MAGIC_V2`], or declares more payload than it
/// carries.
///
/// # Examples
///
/// ```
/// use mavsniff::frame::{FrameRejection, decode_frame};
///
/// let datagram = [0xFD, 0, 0, 0, 7, 1, 1, 0, 0, 0, 0xAA, 0xBB];
/// let frame = decode_frame(&datagram).expect("empty heartbeat frame");
/// assert_eq!(frame.system_id, 1);
/// assert!(frame.payload.is_empty());
///
/// assert_eq!(
///     decode_frame(&datagram[..4]),
///     Err(FrameRejection::TooShort { len: 4 })
/// );
/// ```
pub fn decode_frame(datagram: &[u8]) -> Result<Frame<'_>, FrameRejection> {
    let len = datagram.len();
    let Some((header, rest)) = datagram.split_first_chunk::<HEADER_LEN>() else {
        return Err(FrameRejection::TooShort { len });
    };
    if len < MIN_FRAME_LEN {
        return Err(FrameRejection::TooShort { len });
    }

    let [
        magic,
        payload_len,
        incompat_flags,
        compat_flags,
        sequence,
        system_id,
        component_id,
        id_low,
        id_mid,
        id_high,
    ] = *header;
    if magic != MAGIC_V2 {
        return Err(FrameRejection::BadMagic { found: magic });
    }

    let declared = HEADER_LEN + usize::from(payload_len) + CHECKSUM_LEN;
    if declared > len {
        return Err(FrameRejection::Incomplete {
            declared,
            available: len,
        });
    }
    let Some(payload) = rest.get(..usize::from(payload_len)) else {
        return Err(FrameRejection::Incomplete {
            declared,
            available: len,
        });
    };

    Ok(Frame {
        payload_len,
        incompat_flags,
        compat_flags,
        sequence,
        system_id,
        component_id,
        message_id: read_le_u24([id_low, id_mid, id_high]),
        payload,
    })
}
