use std::cell::RefCell;
use std::rc::Rc;

use super::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Ping {
    A(u32),
    B,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PingKind {
    A,
    B,
}

impl Event for Ping {
    type Kind = PingKind;

    fn kind(&self) -> PingKind {
        match self {
            Ping::A(_) => PingKind::A,
            Ping::B => PingKind::B,
        }
    }
}

#[test]
fn publish_routes_by_kind_in_subscription_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut ch = EventChannel::<Ping>::new();

    let l1 = log.clone();
    ch.subscribe(PingKind::A, move |e| l1.borrow_mut().push(format!("first {e:?}")));
    let l2 = log.clone();
    ch.subscribe(PingKind::B, move |e| l2.borrow_mut().push(format!("b {e:?}")));
    let l3 = log.clone();
    ch.subscribe(PingKind::A, move |e| l3.borrow_mut().push(format!("second {e:?}")));

    assert_eq!(ch.publish(&Ping::A(7)), 2);
    assert_eq!(
        *log.borrow(),
        vec!["first A(7)".to_string(), "second A(7)".to_string()]
    );
    assert_eq!(ch.subscriber_count(PingKind::B), 1);
}

#[test]
fn unsubscribe_stops_delivery() {
    let hits = Rc::new(RefCell::new(0u32));
    let mut ch = EventChannel::<Ping>::new();
    let h = hits.clone();
    let id = ch.subscribe(PingKind::B, move |_| *h.borrow_mut() += 1);

    ch.publish(&Ping::B);
    assert!(ch.unsubscribe(id));
    assert!(!ch.unsubscribe(id));
    assert_eq!(ch.publish(&Ping::B), 0);
    assert_eq!(*hits.borrow(), 1);
}
