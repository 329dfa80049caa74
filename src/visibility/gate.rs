use std::cell::Cell;
use std::rc::Rc;

use crate::events::channel::{EventChannel, SubscriptionId};
use crate::tracking::adapter::VisibilityEvent;

/// Shared visibility flag of the overlay subtree.
///
/// Cloning yields another handle to the same flag. Render-thread only.
#[derive(Clone, Debug, Default)]
pub struct OverlayRoot {
    visible: Rc<Cell<bool>>,
}

impl OverlayRoot {
    /// A hidden overlay root.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the overlay is drawn.
    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    /// Show or hide the overlay.
    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }
}

/// Applies tracking visibility transitions to an [`OverlayRoot`], without debouncing.
#[derive(Debug)]
pub struct VisibilityGate {
    root: OverlayRoot,
    subscriptions: [SubscriptionId; 2],
}

impl VisibilityGate {
    /// Subscribe `root` to both visibility events on `events`.
    pub fn bind(events: &mut EventChannel<VisibilityEvent>, root: OverlayRoot) -> Self {
        let r = root.clone();
        let on_visible = events.subscribe(VisibilityEvent::BecameVisible, move |e| {
            apply(&r, *e);
        });
        let r = root.clone();
        let on_hidden = events.subscribe(VisibilityEvent::BecameNotVisible, move |e| {
            apply(&r, *e);
        });
        Self {
            root,
            subscriptions: [on_visible, on_hidden],
        }
    }

    /// The gated overlay root.
    pub fn root(&self) -> &OverlayRoot {
        &self.root
    }

    /// Remove both subscriptions; the root keeps its last value.
    pub fn unbind(self, events: &mut EventChannel<VisibilityEvent>) {
        for id in self.subscriptions {
            events.unsubscribe(id);
        }
    }
}

fn apply(root: &OverlayRoot, event: VisibilityEvent) {
    let visible = event == VisibilityEvent::BecameVisible;
    tracing::debug!(visible, "overlay visibility");
    root.set_visible(visible);
}

#[cfg(test)]
#[path = "../../tests/unit/visibility/gate.rs"]
mod tests;
