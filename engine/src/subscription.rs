//! Handler registration and bulk cancellation.
//!
//! A [`Registry`] is the single source of truth for which handlers are live.
//! Dispatchers ask it which handlers to call, in registration order, and check
//! [`Registry::is_live`] again right before each call so that a handler
//! cancelled earlier in the same dispatch is never invoked.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription<H> {
    pub id: SubscriptionId,
    pub handler: H,
}

#[derive(Debug, Clone)]
pub struct Registry<H> {
    next_id: u64,
    live: Vec<Subscription<H>>,
}

impl<H> Default for Registry<H> {
    fn default() -> Self {
        Self {
            next_id: 0,
            live: Vec::new(),
        }
    }
}

impl<H: Copy + PartialEq> Registry<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: H) -> Subscription<H> {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let sub = Subscription { id, handler };
        self.live.push(sub);
        sub
    }

    /// Returns `false` if `id` was not live.
    pub fn cancel(&mut self, id: SubscriptionId) -> bool {
        let before = self.live.len();
        self.live.retain(|s| s.id != id);
        self.live.len() != before
    }

    pub fn is_live(&self, id: SubscriptionId) -> bool {
        self.live.iter().any(|s| s.id == id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn has_handler(&self, handler: H) -> bool {
        self.live.iter().any(|s| s.handler == handler)
    }

    /// Snapshot of live subscriptions accepted by `filter`, in registration order.
    pub fn live(&self, filter: impl Fn(H) -> bool) -> Vec<Subscription<H>> {
        self.live
            .iter()
            .copied()
            .filter(|s| filter(s.handler))
            .collect()
    }
}

/// A bag of subscriptions that is cancelled as a unit.
#[derive(Debug, Clone)]
pub struct SubscriptionSet<H> {
    label: &'static str,
    members: Vec<Subscription<H>>,
}

impl<H: Copy + PartialEq> SubscriptionSet<H> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            members: Vec::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn add(&mut self, sub: Subscription<H>) {
        self.members.push(sub);
    }

    pub fn subscribe(&mut self, registry: &mut Registry<H>, handler: H) -> SubscriptionId {
        let sub = registry.subscribe(handler);
        self.add(sub);
        sub.id
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = SubscriptionId> + '_ {
        self.members.iter().map(|s| s.id)
    }

    /// Cancels every member and empties the set. Returns how many were still live.
    pub fn dispose(&mut self, registry: &mut Registry<H>) -> usize {
        let cancelled = self
            .members
            .drain(..)
            .filter(|s| registry.cancel(s.id))
            .count();
        if cancelled > 0 {
            tracing::debug!(set = self.label, cancelled, "subscription set disposed");
        }
        cancelled
    }
}
