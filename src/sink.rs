//! Destinations for decoded records.

use crate::message::Record;

/// Receives every record the listener decodes.
///
/// The sink runs on the receive task, so it should hand records off rather
/// than block. Any `FnMut(Record)` closure is a sink, which covers channels:
///
/// ```
/// use mavsniff::{RecordSink, message::Record};
/// use tokio::sync::mpsc;
///
/// let (tx, _rx) = mpsc::unbounded_channel::<Record>();
/// let sink = move |record: Record| {
///     let _ = tx.send(record);
/// };
/// fn assert_sink(_: &impl RecordSink) {}
/// assert_sink(&sink);
/// ```
pub trait RecordSink: Send + 'static {
    /// Accept one decoded record.
    fn emit(&mut self, record: Record);
}

impl<F> RecordSink for F
where
    F: FnMut(Record) + Send + 'static,
{
    fn emit(&mut self, record: Record) { self(record) }
}
