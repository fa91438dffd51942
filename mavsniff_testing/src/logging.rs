//! Log capture for tests that assert on receive-loop diagnostics.

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use log::Level;
use logtest::{Logger, Record};
use rstest::fixture;

static CAPTURE: OnceLock<Mutex<Logger>> = OnceLock::new();

/// Exclusive access to the process-wide log capture.
///
/// Only one handle exists at a time, and acquiring it discards records left
/// over from earlier tests, so each holder sees only what it caused. Tests
/// that hold a handle should also be `#[serial]`: other tests may still log
/// while it is held.
pub struct LoggerHandle {
    capture: MutexGuard<'static, Logger>,
}

impl LoggerHandle {
    /// Acquire the capture, starting it on first use.
    #[must_use]
    pub fn new() -> Self {
        let capture = CAPTURE
            .get_or_init(|| Mutex::new(Logger::start()))
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut handle = Self { capture };
        handle.clear();
        handle
    }

    /// Drain everything captured so far.
    pub fn drain(&mut self) -> Vec<Record> {
        std::iter::from_fn(|| self.capture.pop()).collect()
    }

    /// Drain captured records, reporting whether any at `level` contains
    /// `needle`.
    pub fn contains(&mut self, level: Level, needle: &str) -> bool {
        self.drain()
            .iter()
            .any(|record| record.level() == level && record.args().contains(needle))
    }

    /// Discard everything captured so far.
    pub fn clear(&mut self) { self.drain(); }
}

impl Default for LoggerHandle {
    fn default() -> Self { Self::new() }
}

/// Fixture yielding a drained [`LoggerHandle`].
#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
pub fn logger() -> LoggerHandle { LoggerHandle::new() }
