//! Builders for MAVLink v2 datagrams.

use bytes::{BufMut, BytesMut};
use mavsniff::frame::{CHECKSUM_LEN, HEADER_LEN, MAGIC_V2};

/// Assembles a single v2 frame.
///
/// The checksum trailer is filled with a fixed pattern; the decoder under
/// test never verifies it.
#[derive(Clone, Debug)]
pub struct FrameBuilder {
    message_id: u32,
    system_id: u8,
    component_id: u8,
    sequence: u8,
    payload: Vec<u8>,
    declared_len: Option<u8>,
}

impl FrameBuilder {
    /// Start a frame for `message_id` from system 1, component 1.
    #[must_use]
    pub fn new(message_id: u32) -> Self {
        Self {
            message_id,
            system_id: 1,
            component_id: 1,
            sequence: 0,
            payload: Vec::new(),
            declared_len: None,
        }
    }

    #[must_use]
    pub fn system_id(mut self, system_id: u8) -> Self {
        self.system_id = system_id;
        self
    }

    #[must_use]
    pub fn component_id(mut self, component_id: u8) -> Self {
        self.component_id = component_id;
        self
    }

    #[must_use]
    pub fn sequence(mut self, sequence: u8) -> Self {
        self.sequence = sequence;
        self
    }

    /// Set the payload. Payloads longer than 255 bytes are truncated.
    #[must_use]
    pub fn payload(mut self, payload: &[u8]) -> Self {
        self.payload = payload.iter().copied().take(usize::from(u8::MAX)).collect();
        self
    }

    /// Override the length byte, e.g. to claim more payload than is present.
    #[must_use]
    pub fn declared_len(mut self, len: u8) -> Self {
        self.declared_len = Some(len);
        self
    }

    /// Encode the frame.
    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let actual_len = u8::try_from(self.payload.len()).unwrap_or(u8::MAX);
        let mut buf = BytesMut::with_capacity(HEADER_LEN + self.payload.len() + CHECKSUM_LEN);
        buf.put_u8(MAGIC_V2);
        buf.put_u8(self.declared_len.unwrap_or(actual_len));
        buf.put_u8(0); // incompat flags
        buf.put_u8(0); // compat flags
        buf.put_u8(self.sequence);
        buf.put_u8(self.system_id);
        buf.put_u8(self.component_id);
        buf.put_uint_le(u64::from(self.message_id & 0x00ff_ffff), 3);
        buf.put_slice(&self.payload);
        buf.put_u16_le(0xA55A);
        buf.to_vec()
    }
}

/// Field values for a `HEARTBEAT` payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HeartbeatFields {
    pub custom_mode: u32,
    pub vehicle_type: u8,
    pub autopilot_type: u8,
    pub base_mode: u8,
    pub system_status: u8,
}

impl Default for HeartbeatFields {
    fn default() -> Self {
        Self {
            custom_mode: 0,
            vehicle_type: 2,
            autopilot_type: 12,
            base_mode: 0,
            system_status: 3,
        }
    }
}

/// Encode a nine-byte `HEARTBEAT` payload (MAVLink version 3).
#[must_use]
pub fn heartbeat_payload(fields: HeartbeatFields) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(9);
    buf.put_u32_le(fields.custom_mode);
    buf.put_u8(fields.vehicle_type);
    buf.put_u8(fields.autopilot_type);
    buf.put_u8(fields.base_mode);
    buf.put_u8(fields.system_status);
    buf.put_u8(3);
    buf.to_vec()
}

/// Encode a 28-byte `GLOBAL_POSITION_INT` payload with zero velocities.
#[must_use]
pub fn global_position_payload(lat: i32, lon: i32, alt_mm: i32) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(28);
    buf.put_u32_le(60_000); // time_boot_ms
    buf.put_i32_le(lat);
    buf.put_i32_le(lon);
    buf.put_i32_le(alt_mm);
    buf.put_i32_le(alt_mm); // relative_alt
    buf.put_i16_le(0);
    buf.put_i16_le(0);
    buf.put_i16_le(0);
    buf.put_u16_le(u16::MAX); // heading unknown
    buf.to_vec()
}

/// A complete `HEARTBEAT` datagram.
#[must_use]
pub fn heartbeat_frame(custom_mode: u32, base_mode: u8) -> Vec<u8> {
    let payload = heartbeat_payload(HeartbeatFields {
        custom_mode,
        base_mode,
        ..HeartbeatFields::default()
    });
    FrameBuilder::new(0).payload(&payload).build()
}

/// A complete `GLOBAL_POSITION_INT` datagram.
#[must_use]
pub fn global_position_frame(lat: i32, lon: i32, alt_mm: i32) -> Vec<u8> {
    FrameBuilder::new(33)
        .payload(&global_position_payload(lat, lon, alt_mm))
        .build()
}
