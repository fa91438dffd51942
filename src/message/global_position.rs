//! `GLOBAL_POSITION_INT` (#33).

use std::fmt;

use serde::Serialize;

use super::TelemetryMessage;
use crate::byte_order::le_i32_at;

const UNITS_PER_DEGREE: f64 = 1e7;
const MILLIMETRES_PER_METRE: f64 = 1e3;

/// Fused global position. Velocities and heading are not surfaced.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GlobalPosition {
    /// Latitude in degrees.
    #[serde(rename = "lat")]
    pub latitude_deg: f64,
    /// Longitude in degrees.
    #[serde(rename = "lon")]
    pub longitude_deg: f64,
    /// Altitude above mean sea level in metres.
    #[serde(rename = "alt_m")]
    pub altitude_m: f64,
}

impl TelemetryMessage for GlobalPosition {
    const MESSAGE_ID: u32 = 33;
    const NAME: &'static str = "GLOBAL_POSITION_INT";
    const MIN_PAYLOAD_LEN: usize = 28;

    // Bytes 0..4 hold `time_boot_ms`.
    fn decode_payload(payload: &[u8]) -> Option<Self> {
        let lat = le_i32_at(payload, 4)?;
        let lon = le_i32_at(payload, 8)?;
        let alt = le_i32_at(payload, 12)?;
        Some(Self {
            latitude_deg: f64::from(lat) / UNITS_PER_DEGREE,
            longitude_deg: f64::from(lon) / UNITS_PER_DEGREE,
            altitude_m: f64::from(alt) / MILLIMETRES_PER_METRE,
        })
    }
}

impl fmt::Display for GlobalPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lat={:.7} lon={:.7} alt_m={:.3}",
            self.latitude_deg, self.longitude_deg, self.altitude_m
        )
    }
}
