use super::*;

#[test]
fn transitions_apply_immediately() {
    let mut events = EventChannel::new();
    let gate = VisibilityGate::bind(&mut events, OverlayRoot::new());
    assert!(!gate.root().is_visible());

    events.publish(&VisibilityEvent::BecameVisible);
    assert!(gate.root().is_visible());
    events.publish(&VisibilityEvent::BecameNotVisible);
    assert!(!gate.root().is_visible());
}

#[test]
fn lost_then_found_leaves_overlay_visible() {
    let mut events = EventChannel::new();
    let root = OverlayRoot::new();
    let _gate = VisibilityGate::bind(&mut events, root.clone());
    events.publish(&VisibilityEvent::BecameNotVisible);
    events.publish(&VisibilityEvent::BecameVisible);
    assert!(root.is_visible());
}

#[test]
fn unbind_stops_updates() {
    let mut events = EventChannel::new();
    let root = OverlayRoot::new();
    let gate = VisibilityGate::bind(&mut events, root.clone());
    gate.unbind(&mut events);
    assert_eq!(events.subscriber_count(VisibilityEvent::BecameVisible), 0);
    events.publish(&VisibilityEvent::BecameVisible);
    assert!(!root.is_visible());
}
