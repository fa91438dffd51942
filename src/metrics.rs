//! Metric helpers for `mavsniff`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to nothing.

#[cfg(feature = "metrics")]
use metrics::counter;

/// Name of the counter tracking datagrams read from the socket.
pub const DATAGRAMS_RECEIVED: &str = "mavsniff_datagrams_received_total";
/// Name of the counter tracking datagrams that held no valid frame.
pub const FRAMES_REJECTED: &str = "mavsniff_frames_rejected_total";
/// Name of the counter tracking decoded records.
pub const RECORDS_DECODED: &str = "mavsniff_records_decoded_total";
/// Name of the counter tracking receive errors other than deadline expiry.
pub const RECEIVE_ERRORS: &str = "mavsniff_receive_errors_total";

/// Record one datagram read from the socket.
pub fn inc_datagrams() {
    #[cfg(feature = "metrics")]
    counter!(DATAGRAMS_RECEIVED).increment(1);
}

/// Record a frame rejection, labelled with its reason.
pub fn inc_rejected(reason: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(FRAMES_REJECTED, "reason" => reason).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = reason;
}

/// Record a decoded record, labelled with the MAVLink message name.
pub fn inc_records(message: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(RECORDS_DECODED, "message" => message).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = message;
}

/// Record a receive error.
pub fn inc_receive_errors() {
    #[cfg(feature = "metrics")]
    counter!(RECEIVE_ERRORS).increment(1);
}
