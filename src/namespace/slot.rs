//! Request identity for UI slots
//!
//! The transport cannot cancel an in-flight glob, so superseded requests
//! are neutralized on the consumer side instead: every load of a visual
//! slot gets a fresh token, and results are applied to the slot's visible
//! state only while their token is still the current one. A result
//! arriving for a superseded request is dropped on arrival.

use std::sync::RwLock;

use tokio::sync::broadcast;
use uuid::Uuid;

use crate::collection::{ListEvent, ObservableList};

/// Identity of one logical request against a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestToken(Uuid);

/// Issues request tokens for one visual slot and remembers which one is
/// current.
pub struct RequestSlot {
    current: RwLock<RequestToken>,
}

impl RequestSlot {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(RequestToken(Uuid::new_v4())),
        }
    }

    /// Mint a fresh token and make it the current one, superseding any
    /// request still running under the previous token.
    pub fn issue(&self) -> RequestToken {
        let token = RequestToken(Uuid::new_v4());
        *self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = token;
        token
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        *self
            .current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            == token
    }
}

impl Default for RequestSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// The visible state of one UI slot: the items of whichever load is
/// current. Loading again clears the slot and supersedes the running
/// load; the superseded load's remaining items are discarded as they
/// arrive.
pub struct ViewSlot<T> {
    slot: RequestSlot,
    items: RwLock<Vec<T>>,
}

impl<T: Clone> ViewSlot<T> {
    pub fn new() -> Self {
        Self {
            slot: RequestSlot::new(),
            items: RwLock::new(Vec::new()),
        }
    }

    /// Mirror `list` into this slot until it turns terminal or the load
    /// is superseded. Returns this load's token either way.
    pub async fn load(&self, list: &ObservableList<T>) -> RequestToken {
        let token = self.begin();
        // Subscribe before reading the snapshot so nothing appended in
        // between can be missed; duplicates are skipped by index.
        let mut events = list.subscribe();
        let mut applied = 0usize;

        for item in list.snapshot() {
            if !self.apply(token, item) {
                return token;
            }
            applied += 1;
        }
        if list.state().is_terminal() {
            // Terminal lists never mutate again, so one more snapshot
            // picks up anything appended between the first one and now.
            self.resync(list, token, &mut applied);
            return token;
        }

        loop {
            match events.recv().await {
                Ok(ListEvent::Append { index, item }) => {
                    if index < applied {
                        continue;
                    }
                    if !self.apply(token, item) {
                        return token;
                    }
                    applied += 1;
                }
                Ok(ListEvent::End) | Ok(ListEvent::Error(_)) => return token,
                Err(broadcast::error::RecvError::Lagged(_)) => {
                    if !self.resync(list, token, &mut applied) {
                        return token;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => return token,
            }
        }
    }

    /// Items of the current load, in arrival order.
    pub fn items(&self) -> Vec<T> {
        self.items
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Start a new load: supersede the previous token and clear the
    /// visible items, atomically with respect to `apply`.
    fn begin(&self) -> RequestToken {
        let mut items = self
            .items
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let token = self.slot.issue();
        items.clear();
        token
    }

    /// Append one item if `token` is still current. The token check and
    /// the append happen under the items lock so a concurrent `begin`
    /// cannot land between them.
    fn apply(&self, token: RequestToken, item: T) -> bool {
        let mut items = self
            .items
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if !self.slot.is_current(token) {
            return false;
        }
        items.push(item);
        true
    }

    /// Catch up with `list` from position `applied`. False once stale.
    fn resync(&self, list: &ObservableList<T>, token: RequestToken, applied: &mut usize) -> bool {
        for item in list.snapshot().into_iter().skip(*applied) {
            if !self.apply(token, item) {
                return false;
            }
            *applied += 1;
        }
        true
    }
}

impl<T: Clone> Default for ViewSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}
