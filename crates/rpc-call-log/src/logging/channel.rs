//! Fire-and-forget sink backed by a bounded channel.
//!
//! Call hooks must never wait on log output. [`ChannelSink`] hands each
//! record to a bounded `tokio` channel with `try_send`; a background
//! [`LogDrain`] task forwards them to the real sink. When the channel is full
//! or the drain is gone the record is dropped and counted. Dropped records
//! are never retried.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::constants::DEFAULT_CHANNEL_CAPACITY;
use super::sink::LogSink;
use super::types::{LogLevel, LogRecord};

type Envelope = (LogRecord, LogLevel);

/// Sink that queues records for a background [`LogDrain`].
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<Envelope>,
    dropped: Arc<AtomicU64>,
}

/// Receiving half of a [`ChannelSink`].
#[derive(Debug)]
pub struct LogDrain {
    receiver: mpsc::Receiver<Envelope>,
}

impl ChannelSink {
    /// Creates a sink buffering up to `capacity` records, and its drain.
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> (Self, LogDrain) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (
            Self {
                sender,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            LogDrain { receiver },
        )
    }

    /// Creates a sink with [`DEFAULT_CHANNEL_CAPACITY`] and spawns its drain
    /// on the current `tokio` runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a `tokio` runtime.
    pub fn spawn<S>(inner: S) -> (Self, tokio::task::JoinHandle<()>)
    where
        S: LogSink + 'static,
    {
        let (sink, drain) = Self::new(DEFAULT_CHANNEL_CAPACITY);
        let handle = tokio::spawn(drain.run(inner));
        (sink, handle)
    }

    /// Number of records dropped because the channel was full or closed.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl LogSink for ChannelSink {
    fn emit(&self, record: &LogRecord, level: LogLevel) {
        match self.sender.try_send((record.clone(), level)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(path = %record.info.path, "Call log channel full, record dropped");
            }
            Err(TrySendError::Closed(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(path = %record.info.path, "Call log drain closed, record dropped");
            }
        }
    }
}

impl LogDrain {
    /// Forwards records to `sink` until every [`ChannelSink`] is dropped.
    pub async fn run<S: LogSink>(mut self, sink: S) {
        while let Some((record, level)) = self.receiver.recv().await {
            sink.emit(&record, level);
        }
    }

    /// Forwards the records already queued, without waiting for more.
    ///
    /// Returns how many records were forwarded.
    pub fn flush_into<S: LogSink>(&mut self, sink: &S) -> usize {
        let mut forwarded = 0;
        while let Ok((record, level)) = self.receiver.try_recv() {
            sink.emit(&record, level);
            forwarded += 1;
        }
        forwarded
    }
}
