use super::*;

#[test]
fn manual_link_emits_scripted_ticks_then_stops() {
    let mut link = ManualDisplayLink::with_drops([0, 2, 0]);
    let a = link.next_refresh().unwrap();
    let b = link.next_refresh().unwrap();
    let c = link.next_refresh().unwrap();
    assert_eq!(
        (a.index, b.index, c.index),
        (TickIndex(0), TickIndex(1), TickIndex(2))
    );
    assert_eq!(b.dropped, 2);
    assert!(link.next_refresh().is_none());

    link.push_ticks(1);
    assert_eq!(link.remaining(), 1);
    assert_eq!(link.next_refresh().unwrap().index, TickIndex(3));
}

#[test]
fn interval_link_honors_limit_and_paces() {
    let fps = Fps::new(200, 1).unwrap();
    let mut link = IntervalDisplayLink::new(fps).with_limit(3);
    let t0 = Instant::now();
    let mut ticks = Vec::new();
    while let Some(t) = link.next_refresh() {
        ticks.push(t);
    }
    assert_eq!(ticks.len(), 3);
    assert_eq!(ticks[2].index, TickIndex(2));
    // Slots 0, 1 and 2 are 5ms apart, so the third tick cannot arrive before 10ms.
    assert!(t0.elapsed() >= Duration::from_millis(9));
}

#[test]
fn interval_link_reports_missed_slots_as_dropped() {
    let fps = Fps::new(1000, 1).unwrap();
    let mut link = IntervalDisplayLink::new(fps).with_limit(2);
    link.next_refresh().unwrap();
    std::thread::sleep(Duration::from_millis(20));
    let late = link.next_refresh().unwrap();
    assert!(late.dropped >= 1, "a 20ms stall at 1kHz must drop slots");
}

#[test]
fn huge_manual_tick_count_is_a_counter() {
    let mut link = ManualDisplayLink::ticks(u64::MAX);
    assert_eq!(link.remaining(), u64::MAX);
    assert_eq!(link.next_refresh().unwrap().index, TickIndex(0));
    assert_eq!(link.next_refresh().unwrap().index, TickIndex(1));
    assert_eq!(link.remaining(), u64::MAX - 2);
    link.push_ticks(10);
    assert_eq!(link.remaining(), u64::MAX);
}

#[test]
fn scripted_drops_come_before_pushed_ticks() {
    let mut link = ManualDisplayLink::with_drops([3]);
    link.push_ticks(1);
    assert_eq!(link.next_refresh().unwrap().dropped, 3);
    assert_eq!(link.next_refresh().unwrap().dropped, 0);
    assert!(link.next_refresh().is_none());
}
