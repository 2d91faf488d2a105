//! Serial -> response-sink routing table for in-flight calls.

use bytes::Bytes;
use dashmap::DashMap;
use tokio::sync::mpsc;

use crate::packet::Status;

/// Channel depth for a single call's response sink. A unary call only ever
/// needs room for one message; a streaming call may have several `Stream`
/// packets in flight ahead of the consumer, so a small buffer avoids the
/// reader loop dropping them under ordinary scheduling jitter while still
/// bounding memory if the consumer truly stalls.
const CALL_CHANNEL_CAPACITY: usize = 16;

/// One packet's worth of response handed from the reader loop to the
/// request engine.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: Status,
    pub payload: Bytes,
}

/// Routes reply/stream packets to the call that is waiting for them.
///
/// A given serial is bound to exactly one sink for the lifetime of a call;
/// [`CallRegistry::deliver`] never blocks the reader loop, and never panics
/// if the owning call has already dropped its receiver.
#[derive(Debug, Default)]
pub struct CallRegistry {
    calls: DashMap<i32, mpsc::Sender<Response>>,
}

impl CallRegistry {
    pub fn new() -> Self {
        Self {
            calls: DashMap::new(),
        }
    }

    /// Register a new call, returning the receiver half the caller should
    /// drain. MUST be called before the corresponding `Call` packet is
    /// written, so a reply racing the registration can never be dropped.
    pub fn register(&self, serial: i32) -> mpsc::Receiver<Response> {
        let (tx, rx) = mpsc::channel(CALL_CHANNEL_CAPACITY);
        self.calls.insert(serial, tx);
        rx
    }

    /// Hand a response to the call registered for `serial`, if any.
    /// Non-blocking: a full or closed channel results in the message being
    /// dropped rather than stalling the reader loop.
    pub fn deliver(&self, serial: i32, response: Response) {
        if let Some(tx) = self.calls.get(&serial) {
            if tx.try_send(response).is_err() {
                tracing::warn!(serial, "dropping response: call sink full or closed");
            }
        } else {
            tracing::trace!(serial, "dropping response: no registered call");
        }
    }

    /// Remove the binding for `serial`. Dropping the sender closes the
    /// receiver so any lingering `recv().await` resolves to `None`.
    pub fn deregister(&self, serial: i32) {
        self.calls.remove(&serial);
    }

    /// Number of calls currently registered. Exposed for tests.
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Drop every registered sink, closing every pending call's receiver.
    /// Called once when the reader loop exits so no caller hangs forever.
    pub fn close_all(&self) {
        self.calls.clear();
    }
}
