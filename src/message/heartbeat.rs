//! `HEARTBEAT` (#0).

use std::fmt;

use serde::Serialize;

use super::TelemetryMessage;
use crate::byte_order::le_u32_at;

/// `MAV_MODE_FLAG_SAFETY_ARMED` bit of `base_mode`.
pub const SAFETY_ARMED: u8 = 0x80;

/// Vehicle heartbeat with the derived armed flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Heartbeat {
    /// `MAV_TYPE` of the vehicle.
    #[serde(rename = "type")]
    pub vehicle_type: u8,
    /// `MAV_AUTOPILOT` flavour.
    #[serde(rename = "autopilot")]
    pub autopilot_type: u8,
    /// `MAV_MODE_FLAG` bitfield.
    pub base_mode: u8,
    /// Whether [`SAFETY_ARMED`] is set in `base_mode`.
    pub armed: bool,
    /// Autopilot-specific mode.
    pub custom_mode: u32,
    /// `MAV_STATE` of the system.
    pub system_status: u8,
}

impl Heartbeat {
    /// True when `base_mode` carries the safety-armed bit.
    #[must_use]
    pub const fn is_armed(base_mode: u8) -> bool { base_mode & SAFETY_ARMED != 0 }
}

impl TelemetryMessage for Heartbeat {
    const MESSAGE_ID: u32 = 0;
    const NAME: &'static str = "HEARTBEAT";
    const MIN_PAYLOAD_LEN: usize = 9;

    fn decode_payload(payload: &[u8]) -> Option<Self> {
        let custom_mode = le_u32_at(payload, 0)?;
        let &[vehicle_type, autopilot_type, base_mode, system_status] = payload.get(4..8)? else {
            return None;
        };
        Some(Self {
            vehicle_type,
            autopilot_type,
            base_mode,
            armed: Self::is_armed(base_mode),
            custom_mode,
            system_status,
        })
    }
}

impl fmt::Display for Heartbeat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "type={} autopilot={} base_mode={:#04x} armed={} custom_mode={} system_status={}",
            self.vehicle_type,
            self.autopilot_type,
            self.base_mode,
            self.armed,
            self.custom_mode,
            self.system_status,
        )
    }
}
