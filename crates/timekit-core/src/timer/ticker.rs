//! Tick fan-out and registration bookkeeping.
//!
//! The engine owns a `Ticker`: an observer list notified with a snapshot on
//! every live tick, plus the single outstanding scheduler registration.
//! Registrations carry a generation counter; `start()` issues a fresh one
//! and pause/reset invalidate it, so a callback that fires after a logical
//! stop delivers nothing.

use super::engine::TimerSnapshot;

/// Callback invoked with a snapshot on every delivered tick.
pub type SubscriberFn = Box<dyn FnMut(&TimerSnapshot)>;

/// Handle for one scheduler registration. Copies taken before the
/// registration was invalidated are rejected by [`Ticker::accepts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRegistration {
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

#[derive(Default)]
pub struct Ticker {
    generation: u64,
    armed: bool,
    next_subscriber: u64,
    subscribers: Vec<(SubscriberId, SubscriberFn)>,
}

impl Ticker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the single current registration, invalidating any prior one.
    pub fn register(&mut self) -> TickRegistration {
        self.generation += 1;
        self.armed = true;
        TickRegistration {
            generation: self.generation,
        }
    }

    /// Cancel the outstanding registration, if any.
    pub fn cancel(&mut self) {
        self.armed = false;
    }

    /// The current registration, if one is armed.
    pub fn current(&self) -> Option<TickRegistration> {
        self.armed.then_some(TickRegistration {
            generation: self.generation,
        })
    }

    /// Whether a tick delivered under `registration` should be honored.
    pub fn accepts(&self, registration: TickRegistration) -> bool {
        self.armed && registration.generation == self.generation
    }

    pub fn subscribe(&mut self, callback: SubscriberFn) -> SubscriberId {
        self.next_subscriber += 1;
        let id = SubscriberId(self.next_subscriber);
        self.subscribers.push((id, callback));
        id
    }

    /// Returns false if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn broadcast(&mut self, snapshot: &TimerSnapshot) {
        for (_, callback) in &mut self.subscribers {
            callback(snapshot);
        }
    }
}
