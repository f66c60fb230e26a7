//! Reading hand-off from the I/O thread to the tick loop.
//!
//! ```text
//! I/O thread                  channel                 tick loop
//!   |                            |                        |
//!   |-- blocking_send(r) ------->|                        |
//!   |                            |<-- try_recv() ---------| (once per frame, drained)
//! ```
//!
//! Bounded, so a stalled render loop applies back-pressure to the reader
//! instead of growing memory.

use crate::error::EnvError;
use crate::types::RawReading;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::{TryRecvError, TrySendError};

/// Creates a bounded reading channel.
pub fn reading_channel(capacity: usize) -> (ReadingSender, ReadingReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ReadingSender { tx }, ReadingReceiver { rx })
}

/// Producer half, owned by the I/O collaborator.
#[derive(Debug, Clone)]
pub struct ReadingSender {
    tx: mpsc::Sender<RawReading>,
}

impl ReadingSender {
    /// Sends from a plain thread, waiting for space.
    ///
    /// Must not be called from inside an async runtime.
    pub fn blocking_send(&self, reading: RawReading) -> Result<(), EnvError> {
        self.tx
            .blocking_send(reading)
            .map_err(|_| EnvError::ChannelClosed)
    }

    /// Sends without waiting.
    pub fn try_send(&self, reading: RawReading) -> Result<(), EnvError> {
        self.tx.try_send(reading).map_err(|e| match e {
            TrySendError::Full(_) => EnvError::ChannelFull,
            TrySendError::Closed(_) => EnvError::ChannelClosed,
        })
    }

    /// Sends from async code, waiting for space.
    pub async fn send(&self, reading: RawReading) -> Result<(), EnvError> {
        self.tx.send(reading).await.map_err(|_| EnvError::ChannelClosed)
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half, owned by the tick loop.
#[derive(Debug)]
pub struct ReadingReceiver {
    rx: mpsc::Receiver<RawReading>,
}

impl ReadingReceiver {
    /// Next queued reading, if any.
    ///
    /// Returns `Ok(None)` when the queue is empty and
    /// `Err(EnvError::ChannelClosed)` once every sender is gone and the
    /// queue is drained.
    pub fn try_recv(&mut self) -> Result<Option<RawReading>, EnvError> {
        match self.rx.try_recv() {
            Ok(reading) => Ok(Some(reading)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(EnvError::ChannelClosed),
        }
    }

    /// Drains up to `max` queued readings without waiting.
    ///
    /// The flag is `true` once the channel is closed and empty.
    pub fn drain(&mut self, max: usize) -> (Vec<RawReading>, bool) {
        let mut readings = Vec::new();
        while readings.len() < max {
            match self.try_recv() {
                Ok(Some(reading)) => readings.push(reading),
                Ok(None) => return (readings, false),
                Err(_) => return (readings, true),
            }
        }
        (readings, false)
    }

    /// Waits for the next reading from a plain thread. `None` when closed.
    pub fn blocking_recv(&mut self) -> Option<RawReading> {
        self.rx.blocking_recv()
    }

    /// Waits for the next reading from async code. `None` when closed.
    pub async fn recv(&mut self) -> Option<RawReading> {
        self.rx.recv().await
    }
}
