//! Callback-id -> event-sink routing table for async `Message` packets.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tokio::sync::Notify;

use crate::event::DomainEvent;

/// Channel depth for one subscription's event sink. Deliberately small:
/// a full queue evicts its oldest entry to make room for the newest (see
/// [`EventQueue::push`]), so a slow subscriber never backs up the reader
/// loop and never stalls delivery of the most recent events.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A bounded, single-consumer event queue with a drop-oldest-on-full
/// policy. A plain `mpsc` channel can only drop the value being sent (the
/// newest); reaching the oldest buffered entry to evict it requires owning
/// the queue on both ends, hence this small ring buffer guarded by a
/// synchronous lock plus a [`Notify`] for the waiting consumer.
#[derive(Debug)]
struct EventQueue {
    capacity: usize,
    buffer: Mutex<VecDeque<DomainEvent>>,
    notify: Notify,
    closed: AtomicBool,
}

impl EventQueue {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            buffer: Mutex::new(VecDeque::with_capacity(capacity)),
            notify: Notify::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Push `event`, evicting the oldest buffered event first if the queue
    /// is already at capacity.
    fn push(&self, event: DomainEvent) {
        let mut buffer = self.buffer.lock().unwrap();
        if buffer.len() >= self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(event);
        drop(buffer);
        self.notify.notify_one();
    }

    fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }
}

/// Receiving half of an event subscription, handed out by
/// [`EventRegistry::subscribe`].
#[derive(Debug)]
pub struct EventReceiver {
    queue: Arc<EventQueue>,
}

impl EventReceiver {
    /// Wait for the next event, or return `None` once the subscription has
    /// been closed (by [`EventRegistry::unsubscribe`] or
    /// [`EventRegistry::close_all`]) and no buffered events remain.
    pub async fn recv(&mut self) -> Option<DomainEvent> {
        loop {
            {
                let mut buffer = self.queue.buffer.lock().unwrap();
                if let Some(event) = buffer.pop_front() {
                    return Some(event);
                }
                if self.queue.closed.load(Ordering::SeqCst) {
                    return None;
                }
            }
            self.queue.notify.notified().await;
        }
    }
}

/// Routes `Message` packets to the subscriber registered for their
/// callback-id.
#[derive(Debug, Default)]
pub struct EventRegistry {
    subscriptions: DashMap<i32, Arc<EventQueue>>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self {
            subscriptions: DashMap::new(),
        }
    }

    /// Subscribe `callback_id` to a newly created sink, returning the
    /// receiver half for the caller to drain.
    pub fn subscribe(&self, callback_id: i32) -> EventReceiver {
        let queue = Arc::new(EventQueue::new(EVENT_CHANNEL_CAPACITY));
        self.subscriptions.insert(callback_id, queue.clone());
        EventReceiver { queue }
    }

    /// Remove the subscription for `callback_id`. After this returns no
    /// further events for that id are delivered, and its receiver's
    /// `recv()` resolves to `None` once already-buffered events are drained.
    pub fn unsubscribe(&self, callback_id: i32) {
        if let Some((_, queue)) = self.subscriptions.remove(&callback_id) {
            queue.close();
        }
    }

    /// Deliver an event to the subscriber for its callback-id, if any.
    /// Unknown callback-ids are silently dropped. A full queue (a
    /// subscriber that isn't keeping up) evicts its oldest buffered event
    /// rather than dropping the new one or blocking the reader loop --
    /// subscribers see the most recent events, not the stalest.
    pub fn deliver(&self, event: DomainEvent) {
        let callback_id = event.callback_id;
        if let Some(queue) = self.subscriptions.get(&callback_id) {
            queue.push(event);
        } else {
            tracing::trace!(callback_id, "dropping event: no subscriber registered");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Close and drop every subscription. Called once when the reader loop
    /// exits, so every receiver's `recv()` resolves instead of hanging.
    pub fn close_all(&self) {
        for entry in self.subscriptions.iter() {
            entry.value().close();
        }
        self.subscriptions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[tokio::test]
    async fn fan_out_by_callback_id() {
        let registry = EventRegistry::new();
        let mut rx7 = registry.subscribe(7);
        let mut rx8 = registry.subscribe(8);

        registry.deliver(DomainEvent {
            callback_id: 7,
            body: Bytes::from_static(b"a"),
        });
        registry.deliver(DomainEvent {
            callback_id: 8,
            body: Bytes::from_static(b"b"),
        });
        registry.deliver(DomainEvent {
            callback_id: 7,
            body: Bytes::from_static(b"c"),
        });

        assert_eq!(rx7.recv().await.unwrap().body, Bytes::from_static(b"a"));
        assert_eq!(rx7.recv().await.unwrap().body, Bytes::from_static(b"c"));
        assert_eq!(rx8.recv().await.unwrap().body, Bytes::from_static(b"b"));
    }

    #[tokio::test]
    async fn dropped_after_unsubscribe() {
        let registry = EventRegistry::new();
        let mut rx = registry.subscribe(7);
        assert!(!registry.is_empty());
        registry.unsubscribe(7);
        assert!(registry.is_empty());

        registry.deliver(DomainEvent {
            callback_id: 7,
            body: Bytes::new(),
        });

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn full_queue_evicts_oldest_not_newest() {
        let registry = EventRegistry::new();
        let mut rx = registry.subscribe(1);

        for i in 0..(EVENT_CHANNEL_CAPACITY + 5) {
            registry.deliver(DomainEvent {
                callback_id: 1,
                body: Bytes::from(i.to_string()),
            });
        }

        // The oldest 5 (0..5) were evicted to make room; the newest
        // EVENT_CHANNEL_CAPACITY entries (5..capacity+5) survive, in order.
        for i in 5..(EVENT_CHANNEL_CAPACITY + 5) {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.body, Bytes::from(i.to_string()));
        }
    }

    #[tokio::test]
    async fn close_all_unblocks_pending_receivers() {
        let registry = EventRegistry::new();
        let mut rx = registry.subscribe(1);

        let wait = tokio::spawn(async move { rx.recv().await });
        // Give the spawned task a chance to start waiting on the queue's
        // Notify before we close it.
        tokio::task::yield_now().await;

        registry.close_all();

        assert!(wait.await.unwrap().is_none());
    }
}
