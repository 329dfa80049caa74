use std::cell::RefCell;
use std::rc::Rc;

use super::*;
use crate::foundation::core::{TickIndex, Vec3};
use crate::tracking::state::{TrackPublisher, TrackSample, TrackingStatus, track_channel};

struct NoCamera {
    updates: u32,
    fail: bool,
}

impl TrackingProvider for NoCamera {
    fn update_frame(&mut self, _tick: &FrameTick) -> FaceliftResult<()> {
        self.updates += 1;
        if self.fail {
            return Err(crate::FaceliftError::render("camera hiccup"));
        }
        Ok(())
    }

    fn background(&self) -> Option<&CameraFrame> {
        None
    }
}

fn tick(i: u64) -> FrameTick {
    FrameTick {
        index: TickIndex(i),
        elapsed: std::time::Duration::ZERO,
        refresh_interval: None,
        dropped: 0,
    }
}

fn tracked(count: usize, v: f32) -> TrackSample {
    TrackSample {
        status: TrackingStatus::Tracking,
        pose: PoseTransform::IDENTITY,
        landmarks: LandmarkSet::new(vec![Vec3::new(v, 0.0, 0.0); count]),
    }
}

type Events = Rc<RefCell<Vec<VisibilityEvent>>>;

fn adapter(grace: u32) -> (TrackingAdapter<NoCamera>, TrackPublisher, Events) {
    let (tx, rx) = track_channel(2);
    let mut a = TrackingAdapter::new(
        NoCamera {
            updates: 0,
            fail: false,
        },
        rx,
        TrackingOpts {
            loss_grace_ticks: grace,
        },
    );
    let log = Rc::new(RefCell::new(Vec::new()));
    let l = log.clone();
    a.on_visible(move |e| l.borrow_mut().push(*e));
    let l = log.clone();
    a.on_not_visible(move |e| l.borrow_mut().push(*e));
    (a, tx, log)
}

#[test]
fn snapshot_is_fixed_per_tick() {
    let (mut a, tx, _log) = adapter(0);
    tx.publish(tracked(2, 1.0)).unwrap();
    a.advance(&tick(0)).unwrap();
    tx.publish(tracked(2, 2.0)).unwrap();
    // Not advanced yet: the tick still sees the first sample.
    assert_eq!(a.current_landmarks().get(0), Some(Vec3::new(1.0, 0.0, 0.0)));
    a.advance(&tick(1)).unwrap();
    assert_eq!(a.current_landmarks().get(0), Some(Vec3::new(2.0, 0.0, 0.0)));
    assert_eq!(a.provider().updates, 2);
}

#[test]
fn visibility_events_fire_once_per_transition() {
    let (mut a, tx, log) = adapter(0);
    a.advance(&tick(0)).unwrap();
    assert!(log.borrow().is_empty(), "initial lost state is not a transition");

    tx.publish(tracked(2, 1.0)).unwrap();
    a.advance(&tick(1)).unwrap();
    tx.publish(tracked(2, 1.5)).unwrap();
    a.advance(&tick(2)).unwrap();
    a.advance(&tick(3)).unwrap();
    assert_eq!(*log.borrow(), vec![VisibilityEvent::BecameVisible]);
    assert_eq!(a.visibility(), FaceVisibility::Visible);

    tx.publish_lost();
    a.advance(&tick(4)).unwrap();
    a.advance(&tick(5)).unwrap();
    assert_eq!(
        *log.borrow(),
        vec![
            VisibilityEvent::BecameVisible,
            VisibilityEvent::BecameNotVisible
        ]
    );
    // Landmarks survive the loss.
    assert_eq!(a.current_landmarks().get(1), Some(Vec3::new(1.5, 0.0, 0.0)));
}

#[test]
fn loss_grace_suppresses_short_dropouts() {
    let (mut a, tx, log) = adapter(2);
    tx.publish(tracked(2, 1.0)).unwrap();
    a.advance(&tick(0)).unwrap();

    tx.publish_lost();
    a.advance(&tick(1)).unwrap();
    a.advance(&tick(2)).unwrap();
    tx.publish(tracked(2, 1.0)).unwrap();
    a.advance(&tick(3)).unwrap();
    assert_eq!(*log.borrow(), vec![VisibilityEvent::BecameVisible]);

    tx.publish_lost();
    for i in 4..7 {
        a.advance(&tick(i)).unwrap();
    }
    assert_eq!(
        log.borrow().last().copied(),
        Some(VisibilityEvent::BecameNotVisible)
    );
}

#[test]
fn provider_error_still_fixes_snapshot() {
    let (mut a, tx, _log) = adapter(0);
    a.provider_mut().fail = true;
    tx.publish(tracked(2, 3.0)).unwrap();
    assert!(a.advance(&tick(0)).is_err());
    assert_eq!(a.snapshot().seq, 1);
    assert_eq!(a.visibility(), FaceVisibility::Visible);
}
