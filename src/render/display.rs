//! Display refresh notifications.
//!
//! A [`DisplayLink`] stands in for the platform's "next repaint" callback: the render loop
//! suspends in [`DisplayLink::next_refresh`] between ticks and resumes once per refresh.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::foundation::core::{Fps, TickIndex};

/// A frame opportunity delivered by the display link.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTick {
    /// Monotonically increasing tick counter.
    pub index: TickIndex,
    /// Time since the link started.
    pub elapsed: Duration,
    /// Nominal refresh interval, if known.
    pub refresh_interval: Option<Duration>,
    /// Refreshes missed since the previous tick.
    pub dropped: u32,
}

/// Source of display refresh notifications.
pub trait DisplayLink {
    /// Suspend until the next refresh.
    ///
    /// Returns `None` once the display goes away, which ends the render loop.
    fn next_refresh(&mut self) -> Option<FrameTick>;
}

/// Paced display link that sleeps until each refresh slot.
///
/// When a tick arrives late (the previous one overran), the missed slots are skipped and
/// reported through [`FrameTick::dropped`] rather than replayed.
#[derive(Debug)]
pub struct IntervalDisplayLink {
    interval: Duration,
    start: Option<Instant>,
    next_slot: u64,
    emitted: u64,
    limit: Option<u64>,
}

impl IntervalDisplayLink {
    /// Refresh at `fps`, forever.
    pub fn new(fps: Fps) -> Self {
        Self {
            interval: fps.frame_duration(),
            start: None,
            next_slot: 0,
            emitted: 0,
            limit: None,
        }
    }

    /// Stop after `ticks` refreshes.
    pub fn with_limit(mut self, ticks: u64) -> Self {
        self.limit = Some(ticks);
        self
    }
}

impl DisplayLink for IntervalDisplayLink {
    fn next_refresh(&mut self) -> Option<FrameTick> {
        if self.limit.is_some_and(|l| self.emitted >= l) {
            return None;
        }
        let start = *self.start.get_or_insert_with(Instant::now);

        let target = start + self.interval.mul_f64(self.next_slot as f64);
        let now = Instant::now();
        if now < target {
            std::thread::sleep(target - now);
        }

        let now = Instant::now();
        let elapsed = now.saturating_duration_since(start);
        let mut dropped = 0u32;
        if !self.interval.is_zero() {
            let due = (elapsed.as_nanos() / self.interval.as_nanos()) as u64;
            if due > self.next_slot {
                dropped = u32::try_from(due - self.next_slot).unwrap_or(u32::MAX);
                self.next_slot = due;
            }
        }

        let tick = FrameTick {
            index: TickIndex(self.emitted),
            elapsed,
            refresh_interval: Some(self.interval),
            dropped,
        };
        self.next_slot += 1;
        self.emitted += 1;
        Some(tick)
    }
}

/// Scripted display link for headless runs and tests.
///
/// Refreshes with an explicit drop count are served first, then plain refreshes.
#[derive(Debug, Default)]
pub struct ManualDisplayLink {
    scripted: VecDeque<u32>,
    plain: u64,
    emitted: u64,
    interval: Option<Duration>,
}

impl ManualDisplayLink {
    /// `ticks` evenly spaced refreshes with no drops.
    pub fn ticks(ticks: u64) -> Self {
        Self {
            plain: ticks,
            ..Self::default()
        }
    }

    /// Refreshes with an explicit drop count before each one.
    pub fn with_drops(drops: impl IntoIterator<Item = u32>) -> Self {
        Self {
            scripted: drops.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Report `interval` as the nominal refresh interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Queue `n` more refreshes.
    pub fn push_ticks(&mut self, n: u64) {
        self.plain = self.plain.saturating_add(n);
    }

    /// Refreshes still queued.
    pub fn remaining(&self) -> u64 {
        self.plain.saturating_add(self.scripted.len() as u64)
    }
}

impl DisplayLink for ManualDisplayLink {
    fn next_refresh(&mut self) -> Option<FrameTick> {
        let dropped = match self.scripted.pop_front() {
            Some(d) => d,
            None if self.plain > 0 => {
                self.plain -= 1;
                0
            }
            None => return None,
        };
        let interval = self.interval.unwrap_or(Duration::from_micros(16_667));
        let tick = FrameTick {
            index: TickIndex(self.emitted),
            elapsed: interval.mul_f64(self.emitted as f64),
            refresh_interval: self.interval,
            dropped,
        };
        self.emitted += 1;
        Some(tick)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/display.rs"]
mod tests;
