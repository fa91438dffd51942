//! The receive loop driven by a listener session.

use std::{ops::ControlFlow, time::Duration};

use log::{debug, trace, warn};
use tokio::{select, time::timeout};
use tokio_util::sync::CancellationToken;

use super::{BackoffConfig, DatagramSource, SessionConfig};
use crate::{frame::decode_frame, message::dispatch, metrics, sink::RecordSink};

/// Parameters for [`receive_loop`].
#[derive(Clone, Debug)]
pub struct ReceiveOptions {
    /// Cancellation observed after deadline expiry and receive errors.
    pub shutdown: CancellationToken,
    /// Upper bound on one blocking receive.
    pub read_deadline: Duration,
    /// Size of the reusable receive buffer.
    pub buffer_len: usize,
    /// Retry pacing after receive errors.
    pub backoff: BackoffConfig,
}

impl ReceiveOptions {
    /// Build options from a session configuration.
    #[must_use]
    pub fn from_config(config: &SessionConfig, shutdown: CancellationToken) -> Self {
        let config = config.normalized();
        Self {
            shutdown,
            read_deadline: config.read_deadline,
            buffer_len: config.recv_buffer_len,
            backoff: config.backoff,
        }
    }
}

/// Counters describing one run of the receive loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReceiveStats {
    /// Datagrams read from the source.
    pub datagrams: u64,
    /// Datagrams that held no valid frame.
    pub rejected: u64,
    /// Valid frames that produced no record.
    pub ignored: u64,
    /// Records handed to the sink.
    pub records: u64,
    /// Receive errors other than deadline expiry.
    pub receive_errors: u64,
    /// Read deadlines that expired with nothing received.
    pub idle_polls: u64,
}

struct LoopState<K> {
    sink: K,
    buf: Vec<u8>,
    delay: Duration,
    stats: ReceiveStats,
}

/// Receive datagrams from `source` and feed decoded records to `sink` until
/// cancellation is observed.
///
/// Every receive is bounded by the read deadline. When it expires, or when
/// the receive fails, the loop checks `shutdown` and returns if it has been
/// cancelled. Receive errors seen before cancellation are logged and retried
/// after an exponential back-off that cancellation also interrupts. Datagrams
/// that fail to decode are counted and dropped.
///
/// Cancelling alone stops the loop within one read deadline. Closing the
/// source as well makes the pending receive fail at once.
pub async fn receive_loop<D, K>(source: &D, sink: K, options: ReceiveOptions) -> ReceiveStats
where
    D: DatagramSource + ?Sized,
    K: RecordSink,
{
    let ReceiveOptions {
        shutdown,
        read_deadline,
        buffer_len,
        backoff,
    } = options;
    let backoff = backoff.normalized();
    let mut state = LoopState {
        sink,
        buf: vec![0; buffer_len],
        delay: backoff.initial_delay,
        stats: ReceiveStats::default(),
    };
    while receive_iteration(source, &mut state, &shutdown, read_deadline, &backoff)
        .await
        .is_continue()
    {}
    state.stats
}

async fn receive_iteration<D, K>(
    source: &D,
    state: &mut LoopState<K>,
    shutdown: &CancellationToken,
    read_deadline: Duration,
    backoff: &BackoffConfig,
) -> ControlFlow<()>
where
    D: DatagramSource + ?Sized,
    K: RecordSink,
{
    match timeout(read_deadline, source.recv(&mut state.buf)).await {
        Err(_elapsed) => {
            state.stats.idle_polls += 1;
            state.delay = backoff.initial_delay;
            if shutdown.is_cancelled() {
                debug!("receive loop stopping after idle read deadline");
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        }
        Ok(Err(e)) => {
            if shutdown.is_cancelled() {
                debug!("receive loop stopping: error={e}");
                return ControlFlow::Break(());
            }
            state.stats.receive_errors += 1;
            metrics::inc_receive_errors();
            warn!("read error: error={e}, retry_in={:?}", state.delay);
            if pause(shutdown, state.delay).await.is_break() {
                debug!("receive loop stopping during back-off");
                return ControlFlow::Break(());
            }
            state.delay = backoff.next_delay(state.delay);
            ControlFlow::Continue(())
        }
        Ok(Ok(len)) => {
            state.delay = backoff.initial_delay;
            let LoopState {
                sink, buf, stats, ..
            } = state;
            handle_datagram(buf.get(..len).unwrap_or(buf.as_slice()), sink, stats);
            ControlFlow::Continue(())
        }
    }
}

async fn pause(shutdown: &CancellationToken, delay: Duration) -> ControlFlow<()> {
    select! {
        biased;

        () = shutdown.cancelled() => ControlFlow::Break(()),
        () = tokio::time::sleep(delay) => ControlFlow::Continue(()),
    }
}

fn handle_datagram<K: RecordSink>(datagram: &[u8], sink: &mut K, stats: &mut ReceiveStats) {
    stats.datagrams += 1;
    metrics::inc_datagrams();

    let frame = match decode_frame(datagram) {
        Ok(frame) => frame,
        Err(rejection) => {
            stats.rejected += 1;
            metrics::inc_rejected(rejection.reason());
            debug!("dropping datagram: reason={rejection}, len={}", datagram.len());
            return;
        }
    };

    match dispatch(&frame) {
        Some(record) => {
            stats.records += 1;
            metrics::inc_records(record.name());
            sink.emit(record);
        }
        None => {
            stats.ignored += 1;
            trace!(
                "ignoring message: message_id={}, system_id={}, component_id={}, payload_len={}",
                frame.message_id, frame.system_id, frame.component_id, frame.payload_len
            );
        }
    }
}
