//! Push-based change feed for live store reads.
//!
//! # Responsibility
//! - Fan out full snapshots to every live subscriber.
//! - Drop subscribers whose receiving side went away.
//!
//! # Invariants
//! - A new subscription receives the current snapshot before any later one.
//! - Dropping a `Subscription` is the only way to cancel it.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard};

/// Broadcast point shared by every repository handle over one database.
///
/// Cloning is cheap and yields a handle to the same subscriber list.
pub struct ChangeFeed<T> {
    subscribers: Arc<Mutex<Vec<Sender<T>>>>,
}

impl<T> Clone for ChangeFeed<T> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<T> Default for ChangeFeed<T> {
    fn default() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<T: Clone> ChangeFeed<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a subscriber seeded with `initial`.
    pub fn subscribe(&self, initial: T) -> Subscription<T> {
        let (tx, rx) = mpsc::channel();
        // Receiver is alive right here, so the seed send cannot fail.
        let _ = tx.send(initial);
        self.lock().push(tx);
        Subscription { rx }
    }

    /// Sends `snapshot` to every live subscriber and returns how many
    /// received it.
    pub fn publish(&self, snapshot: &T) -> usize {
        let mut subscribers = self.lock();
        subscribers.retain(|tx| tx.send(snapshot.clone()).is_ok());
        subscribers.len()
    }

    /// Registered subscribers, including ones dropped since the last
    /// publish.
    pub fn subscriber_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Sender<T>>> {
        // A panic while holding the lock cannot leave the list half-updated.
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Receiving end of a [`ChangeFeed`].
pub struct Subscription<T> {
    rx: Receiver<T>,
}

impl<T> Subscription<T> {
    /// Next pending snapshot, if any, without blocking.
    pub fn try_next(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(value) => Some(value),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Drains every pending snapshot and keeps only the newest.
    pub fn latest(&self) -> Option<T> {
        let mut newest = None;
        while let Some(value) = self.try_next() {
            newest = Some(value);
        }
        newest
    }
}
