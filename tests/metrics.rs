#![cfg(feature = "metrics")]
//! Tests for `mavsniff` metrics helpers.
//!
//! Counters are captured with `metrics_util::debugging::DebuggingRecorder`.
use std::io;

use mavsniff::{
    Record,
    metrics,
    session::{ReceiveOptions, SessionConfig, receive_loop},
};
use mavsniff_testing::{FrameBuilder, ScriptedSource, Step, global_position_frame, heartbeat_frame};
use metrics_util::{
    CompositeKey,
    debugging::{DebugValue, DebuggingRecorder, Snapshotter},
};
use rstest::rstest;
use tokio_util::sync::CancellationToken;

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

type Snapshot = [(
    CompositeKey,
    Option<::metrics::Unit>,
    Option<::metrics::SharedString>,
    DebugValue,
)];

/// Sum of the counters called `name` in one snapshot, optionally narrowed to
/// one label. Snapshots drain the recorder, so take one per test.
fn counter_value(snapshot: &Snapshot, name: &str, label: Option<(&str, &str)>) -> u64 {
    snapshot
        .iter()
        .filter(|(key, _, _, _)| {
            key.key().name() == name
                && label.is_none_or(|(k, v)| {
                    key.key().labels().any(|l| l.key() == k && l.value() == v)
                })
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(c) => *c,
            _ => 0,
        })
        .sum()
}

#[test]
fn datagram_metric_increments() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    ::metrics::with_local_recorder(&recorder, metrics::inc_datagrams);

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_value(&snapshot, metrics::DATAGRAMS_RECEIVED, None), 1);
}

#[rstest]
#[case("too_short")]
#[case("bad_magic")]
#[case("incomplete")]
fn rejection_metric_is_labelled(#[case] reason: &'static str) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    ::metrics::with_local_recorder(&recorder, || metrics::inc_rejected(reason));

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_value(&snapshot, metrics::FRAMES_REJECTED, Some(("reason", reason))),
        1
    );
}

#[rstest]
#[case(1)]
#[case(3)]
fn receive_error_metric_counts(#[case] expected: u64) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    ::metrics::with_local_recorder(&recorder, || {
        (0..expected).for_each(|_| metrics::inc_receive_errors());
    });

    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(
        counter_value(&snapshot, metrics::RECEIVE_ERRORS, None),
        expected
    );
}

#[test]
fn receive_loop_reports_counters() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .expect("failed to build runtime");

    let stats = ::metrics::with_local_recorder(&recorder, || {
        runtime.block_on(async {
            let shutdown = CancellationToken::new();
            let source = ScriptedSource::new([
                Step::Datagram(heartbeat_frame(0, 0x80)),
                Step::Datagram(vec![0x00; 4]),
                Step::Error(io::ErrorKind::ConnectionReset),
                Step::Datagram(FrameBuilder::new(77).payload(&[1, 2, 3]).build()),
                Step::Datagram(global_position_frame(0, 0, 0)),
            ]);
            let token = shutdown.clone();
            let mut seen = 0;
            let sink = move |_: Record| {
                seen += 1;
                if seen == 2 {
                    token.cancel();
                }
            };
            let options = ReceiveOptions::from_config(&SessionConfig::default(), shutdown);
            receive_loop(&source, sink, options).await
        })
    });

    assert_eq!(stats.records, 2);
    let snapshot = snapshotter.snapshot().into_vec();
    assert_eq!(counter_value(&snapshot, metrics::DATAGRAMS_RECEIVED, None), 4);
    assert_eq!(
        counter_value(&snapshot, metrics::FRAMES_REJECTED, Some(("reason", "too_short"))),
        1
    );
    assert_eq!(
        counter_value(&snapshot, metrics::RECORDS_DECODED, Some(("message", "HEARTBEAT"))),
        1
    );
    assert_eq!(
        counter_value(
            &snapshot,
            metrics::RECORDS_DECODED,
            Some(("message", "GLOBAL_POSITION_INT"))
        ),
        1
    );
    assert_eq!(counter_value(&snapshot, metrics::RECEIVE_ERRORS, None), 1);
}
