//! A datagram source that replays a script instead of reading a socket.

use std::{
    collections::VecDeque,
    io,
    sync::{
        Mutex,
        PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use mavsniff::session::DatagramSource;

/// One scripted receive outcome.
#[derive(Clone, Debug)]
pub enum Step {
    /// Deliver these bytes, truncated to the receive buffer.
    Datagram(Vec<u8>),
    /// Fail with an error of this kind.
    Error(io::ErrorKind),
    /// Never complete; only the read deadline ends the receive.
    Stall,
}

/// Replays [`Step`]s in order, then stalls forever.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    steps: Mutex<VecDeque<Step>>,
    calls: AtomicUsize,
}

impl ScriptedSource {
    #[must_use]
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: Mutex::new(steps.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of receives attempted so far.
    #[must_use]
    pub fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }

    /// Steps not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn next_step(&self) -> Step {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.steps
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or(Step::Stall)
    }
}

#[async_trait]
impl DatagramSource for ScriptedSource {
    async fn recv(&self, buf: &mut [u8]) -> io::Result<usize> {
        match self.next_step() {
            Step::Datagram(bytes) => {
                let len = bytes.len().min(buf.len());
                buf[..len].copy_from_slice(&bytes[..len]);
                Ok(len)
            }
            Step::Error(kind) => Err(io::Error::new(kind, "scripted receive failure")),
            Step::Stall => std::future::pending().await,
        }
    }
}
