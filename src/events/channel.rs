use std::fmt;

/// An event that can be routed by kind.
pub trait Event {
    /// Discriminant used to select subscribers.
    type Kind: Copy + Eq + fmt::Debug;

    /// Return the routing kind of this event.
    fn kind(&self) -> Self::Kind;
}

/// Handle returned by [`EventChannel::subscribe`], used to unsubscribe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Subscriber<E: Event> {
    id: SubscriptionId,
    kind: E::Kind,
    callback: Box<dyn FnMut(&E)>,
}

/// Registry of callbacks keyed by event kind.
///
/// Callbacks run synchronously inside [`EventChannel::publish`], in subscription order. The
/// channel is single-threaded: it lives on the render thread together with its subscribers.
pub struct EventChannel<E: Event> {
    next_id: u64,
    subscribers: Vec<Subscriber<E>>,
}

impl<E: Event> Default for EventChannel<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Event> fmt::Debug for EventChannel<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl<E: Event> EventChannel<E> {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self {
            next_id: 0,
            subscribers: Vec::new(),
        }
    }

    /// Register `callback` for events of `kind`.
    pub fn subscribe(
        &mut self,
        kind: E::Kind,
        callback: impl FnMut(&E) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            kind,
            callback: Box::new(callback),
        });
        id
    }

    /// Remove a subscription. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Invoke every callback registered for `event.kind()`.
    ///
    /// Returns the number of callbacks invoked.
    pub fn publish(&mut self, event: &E) -> usize {
        let kind = event.kind();
        let mut fired = 0;
        for sub in self.subscribers.iter_mut().filter(|s| s.kind == kind) {
            (sub.callback)(event);
            fired += 1;
        }
        fired
    }

    /// Number of callbacks registered for `kind`.
    pub fn subscriber_count(&self, kind: E::Kind) -> usize {
        self.subscribers.iter().filter(|s| s.kind == kind).count()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/events/channel.rs"]
mod tests;
