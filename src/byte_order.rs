//! Helpers for explicit little-endian conversions.
//!
//! MAVLink encodes every multi-byte field little-endian. These helpers keep
//! Clippy expectations scoped to the conversion points so the decoders can
//! stay explicit about wire endianness without repeating lint annotations.

/// Parse a little-endian `u32` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use mavsniff::byte_order::read_le_u32;
///
/// assert_eq!(read_le_u32([0x04, 0x03, 0x02, 0x01]), 0x0102_0304);
/// ```
#[must_use]
pub fn read_le_u32(bytes: [u8; 4]) -> u32 {
    #[expect(
        clippy::little_endian_bytes,
        reason = "MAVLink fields are little-endian on the wire."
    )]
    u32::from_le_bytes(bytes)
}

/// Parse a little-endian `i32` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use mavsniff::byte_order::read_le_i32;
///
/// assert_eq!(read_le_i32([0x78, 0xec, 0xff, 0xff]), -5000);
/// ```
#[must_use]
pub fn read_le_i32(bytes: [u8; 4]) -> i32 {
    #[expect(
        clippy::little_endian_bytes,
        reason = "MAVLink fields are little-endian on the wire."
    )]
    i32::from_le_bytes(bytes)
}

/// Parse the 24-bit little-endian message identifier of a v2 header.
///
/// # Examples
///
/// ```
/// use mavsniff::byte_order::read_le_u24;
///
/// assert_eq!(read_le_u24([0x21, 0x00, 0x00]), 33);
/// assert_eq!(read_le_u24([0x01, 0x02, 0x03]), 0x0003_0201);
/// ```
#[must_use]
pub fn read_le_u24(bytes: [u8; 3]) -> u32 {
    let [low, mid, high] = bytes;
    u32::from(low) | (u32::from(mid) << 8) | (u32::from(high) << 16)
}

/// Read a little-endian `u32` starting at `offset`, if `bytes` is long enough.
#[must_use]
pub fn le_u32_at(bytes: &[u8], offset: usize) -> Option<u32> {
    array_at(bytes, offset).map(read_le_u32)
}

/// Read a little-endian `i32` starting at `offset`, if `bytes` is long enough.
#[must_use]
pub fn le_i32_at(bytes: &[u8], offset: usize) -> Option<i32> {
    array_at(bytes, offset).map(read_le_i32)
}

fn array_at<const N: usize>(bytes: &[u8], offset: usize) -> Option<[u8; N]> {
    let end = offset.checked_add(N)?;
    bytes.get(offset..end)?.try_into().ok()
}
