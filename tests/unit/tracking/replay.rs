use std::time::Duration;

use super::*;
use crate::foundation::core::TickIndex;
use crate::tracking::state::track_channel;

fn tick(i: u64) -> FrameTick {
    FrameTick {
        index: TickIndex(i),
        elapsed: Duration::ZERO,
        refresh_interval: None,
        dropped: 0,
    }
}

#[test]
fn parses_json_lines() {
    let trace = r#"{"tick":0,"landmarks":[[0,0,0],[1,2,3]]}

{"tick":2,"tracking":false}
{"tick":2,"tracking":true,"pose":[1,0,0,0, 0,1,0,0, 0,0,1,0, 0,0,-1,1],"landmarks":[[0,0,0],[0,0,0]]}
"#;
    let recs = parse_trace(trace.as_bytes()).unwrap();
    assert_eq!(recs.len(), 3);
    assert!(recs[0].tracking);
    assert_eq!(recs[0].landmarks.as_ref().unwrap()[1], Vec3::new(1.0, 2.0, 3.0));
    assert!(!recs[1].tracking);
    assert_eq!(recs[2].pose.unwrap().to_cols_array()[14], -1.0);
}

#[test]
fn rejects_backwards_ticks_and_missing_landmarks() {
    let back = "{\"tick\":3,\"tracking\":false}\n{\"tick\":1,\"tracking\":false}\n";
    assert!(parse_trace(back.as_bytes()).unwrap_err().to_string().contains("backwards"));
    let bare = "{\"tick\":0}\n";
    assert!(parse_trace(bare.as_bytes()).is_err());
}

#[test]
fn publishes_records_when_their_tick_arrives() {
    let (tx, rx) = track_channel(1);
    let mut p = ReplayProvider::new(tx).with_records([
        TraceRecord::tracked(1, PoseTransform::IDENTITY, vec![Vec3::new(1.0, 0.0, 0.0)]),
        TraceRecord::lost(3),
    ]);

    p.update_frame(&tick(0)).unwrap();
    assert_eq!(rx.latest().seq, 0);
    p.update_frame(&tick(1)).unwrap();
    assert!(rx.latest().is_tracking());
    // Tick 2 was skipped by the display; tick 3 still publishes the loss.
    p.update_frame(&tick(3)).unwrap();
    let s = rx.latest();
    assert!(!s.is_tracking());
    assert_eq!(s.landmarks.get(0), Some(Vec3::new(1.0, 0.0, 0.0)));
    assert_eq!(p.remaining(), 0);
    assert_eq!(p.published(), 2);
}

#[test]
fn bad_samples_surface_as_errors() {
    let (tx, rx) = track_channel(2);
    let mut p = ReplayProvider::new(tx)
        .with_records([TraceRecord::tracked(0, PoseTransform::IDENTITY, vec![Vec3::ZERO])]);
    assert!(p.update_frame(&tick(0)).is_err());
    assert_eq!(rx.latest().seq, 0);
}

#[test]
fn denied_camera_fails_open() {
    let (tx, _rx) = track_channel(1);
    let mut p = ReplayProvider::new(tx).deny_camera();
    let err = p.open().unwrap_err();
    assert!(err.is_environment_fatal());
}
