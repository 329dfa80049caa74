use super::*;

fn canvas() -> Canvas {
    Canvas {
        width: 2,
        height: 2,
    }
}

#[test]
fn draws_are_invisible_until_presented() {
    let mut s = CompositeSurface::new(canvas()).unwrap();
    let before = s.fingerprint();
    s.begin_draw().data.fill(200);
    assert_eq!(s.fingerprint(), before);
    assert!(s.front_tick().is_none());

    s.present(TickIndex(0));
    assert!(s.read().data.iter().all(|&b| b == 200));
    assert_eq!(s.front_tick(), Some(TickIndex(0)));
    assert_eq!(s.presented(), 1);
}

#[test]
fn held_snapshots_are_never_overwritten() {
    let mut s = CompositeSurface::new(canvas()).unwrap();
    s.begin_draw().data.fill(1);
    s.present(TickIndex(0));
    let held = s.snapshot();

    s.begin_draw().data.fill(2);
    s.present(TickIndex(1));
    s.begin_draw().data.fill(3);
    s.present(TickIndex(2));

    assert!(held.data.iter().all(|&b| b == 1));
    assert!(s.read().data.iter().all(|&b| b == 3));
    assert_eq!(s.reallocated(), 1);
}

#[test]
fn buffers_are_recycled_without_readers() {
    let mut s = CompositeSurface::new(canvas()).unwrap();
    for i in 0..5 {
        s.begin_draw().data.fill(i);
        s.present(TickIndex(u64::from(i)));
    }
    assert_eq!(s.reallocated(), 0);
    assert_eq!(s.begin_draw().data.len(), canvas().rgba8_len());
}

#[test]
fn empty_canvas_is_rejected() {
    assert!(
        CompositeSurface::new(Canvas {
            width: 0,
            height: 4
        })
        .is_err()
    );
}
