//! Append-only observable list
//!
//! The result type of a streaming glob: a producer appends items as the
//! remote stream delivers them and finally marks the list completed or
//! failed, while any number of consumers read snapshots and subscribe to
//! live events over a tokio broadcast channel. Appends are serialized by
//! an internal lock, so an event's index always matches the item's final
//! position.

use std::sync::RwLock;

use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

/// Default event channel capacity, matching the config default.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Where a list is in its lifecycle. Terminal states are permanent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListState {
    Open,
    Completed,
    Failed(String),
}

impl ListState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ListState::Open)
    }
}

/// One change notification from an [`ObservableList`].
#[derive(Debug, Clone)]
pub enum ListEvent<T> {
    /// `item` was appended at `index`.
    Append { index: usize, item: T },
    /// The producer finished; the list will never change again.
    End,
    /// The producer failed; items appended so far remain readable.
    Error(String),
}

#[derive(Debug)]
struct Inner<T> {
    items: Vec<T>,
    state: ListState,
}

#[derive(Debug)]
pub struct ObservableList<T> {
    inner: RwLock<Inner<T>>,
    events: broadcast::Sender<ListEvent<T>>,
}

impl<T: Clone> ObservableList<T> {
    /// New open list whose event channel buffers up to `capacity` events
    /// per lagging subscriber.
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: RwLock::new(Inner {
                items: Vec::new(),
                state: ListState::Open,
            }),
            events,
        }
    }

    /// Append `item` and notify subscribers. Returns false (and appends
    /// nothing) once the list is terminal.
    pub fn push(&self, item: T) -> bool {
        let mut inner = self.write_inner();
        if inner.state.is_terminal() {
            return false;
        }
        let index = inner.items.len();
        inner.items.push(item.clone());
        // Sent under the lock so event order matches append order.
        self.events.send(ListEvent::Append { index, item }).ok();
        true
    }

    /// Mark the list completed. Returns false if it was already terminal.
    pub fn complete(&self) -> bool {
        let mut inner = self.write_inner();
        if inner.state.is_terminal() {
            return false;
        }
        inner.state = ListState::Completed;
        self.events.send(ListEvent::End).ok();
        true
    }

    /// Mark the list failed. Items appended so far stay readable. Returns
    /// false if the list was already terminal.
    pub fn fail(&self, message: impl Into<String>) -> bool {
        let mut inner = self.write_inner();
        if inner.state.is_terminal() {
            return false;
        }
        let message = message.into();
        inner.state = ListState::Failed(message.clone());
        self.events.send(ListEvent::Error(message)).ok();
        true
    }

    pub fn state(&self) -> ListState {
        self.read_inner().state.clone()
    }

    /// Copy of the items appended so far, in append order.
    pub fn snapshot(&self) -> Vec<T> {
        self.read_inner().items.clone()
    }

    pub fn len(&self) -> usize {
        self.read_inner().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_inner().items.is_empty()
    }

    /// Subscribe to future events. Items already present are not replayed;
    /// read `snapshot()` after subscribing to avoid a gap.
    pub fn subscribe(&self) -> broadcast::Receiver<ListEvent<T>> {
        self.events.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    /// Future events as a stream, for consumers that prefer combinators
    /// over a raw receiver. Same gap semantics as [`subscribe`]: pair with
    /// `snapshot()` for the items already present.
    ///
    /// [`subscribe`]: ObservableList::subscribe
    pub fn stream(&self) -> BroadcastStream<ListEvent<T>>
    where
        T: Send + 'static,
    {
        BroadcastStream::new(self.events.subscribe())
    }

    /// Wait until the list reaches a terminal state and return it.
    pub async fn wait_terminal(&self) -> ListState {
        // Subscribe before checking so a terminal event between the check
        // and the first recv cannot be missed.
        let mut events = self.subscribe();
        let state = self.state();
        if state.is_terminal() {
            return state;
        }
        loop {
            match events.recv().await {
                Ok(ListEvent::End) | Ok(ListEvent::Error(_)) => return self.state(),
                Ok(ListEvent::Append { .. }) => {}
                // Lagged: terminal events are never overwritten once sent,
                // so keep draining. Closed cannot happen while self lives.
                Err(broadcast::error::RecvError::Lagged(_)) => {}
                Err(broadcast::error::RecvError::Closed) => return self.state(),
            }
        }
    }

    fn read_inner(&self) -> std::sync::RwLockReadGuard<'_, Inner<T>> {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_inner(&self) -> std::sync::RwLockWriteGuard<'_, Inner<T>> {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T: Clone> Default for ObservableList<T> {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
