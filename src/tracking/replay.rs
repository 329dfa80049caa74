use std::collections::VecDeque;
use std::io::BufRead;

use anyhow::Context;

use crate::foundation::core::Vec3;
use crate::foundation::error::{FaceliftError, FaceliftResult};
use crate::render::backend::CameraFrame;
use crate::render::display::FrameTick;
use crate::tracking::adapter::TrackingProvider;
use crate::tracking::state::{
    LandmarkSet, PoseTransform, TrackPublisher, TrackSample, TrackingStatus,
};

/// One line of a tracking trace.
///
/// `{"tick": 3, "tracking": true, "pose": [16 floats], "landmarks": [[x, y, z], ..]}`
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TraceRecord {
    /// Tick at which the record is published.
    pub tick: u64,
    /// `false` signals tracking loss; pose and landmarks are then ignored.
    #[serde(default = "default_tracking")]
    pub tracking: bool,
    /// Face pose; identity when omitted.
    #[serde(default)]
    pub pose: Option<PoseTransform>,
    /// Landmarks; required when `tracking` is true.
    #[serde(default)]
    pub landmarks: Option<Vec<Vec3>>,
}

fn default_tracking() -> bool {
    true
}

impl TraceRecord {
    /// A tracked record.
    pub fn tracked(tick: u64, pose: PoseTransform, landmarks: Vec<Vec3>) -> Self {
        Self {
            tick,
            tracking: true,
            pose: Some(pose),
            landmarks: Some(landmarks),
        }
    }

    /// A tracking-loss record.
    pub fn lost(tick: u64) -> Self {
        Self {
            tick,
            tracking: false,
            pose: None,
            landmarks: None,
        }
    }
}

/// Parse a JSON-lines trace. Blank lines are skipped; ticks must not decrease.
pub fn parse_trace(reader: impl BufRead) -> FaceliftResult<Vec<TraceRecord>> {
    let mut out: Vec<TraceRecord> = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read trace line {}", i + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let rec: TraceRecord = serde_json::from_str(&line)
            .map_err(|e| FaceliftError::validation(format!("trace line {}: {e}", i + 1)))?;
        if let Some(prev) = out.last()
            && rec.tick < prev.tick
        {
            return Err(FaceliftError::validation(format!(
                "trace line {}: tick {} goes backwards (previous {})",
                i + 1,
                rec.tick,
                prev.tick
            )));
        }
        if rec.tracking && rec.landmarks.is_none() {
            return Err(FaceliftError::validation(format!(
                "trace line {}: tracked record needs landmarks",
                i + 1
            )));
        }
        out.push(rec);
    }
    Ok(out)
}

/// Scripted provider: a fixed camera background plus a trace of tracking samples.
///
/// Records are published when their tick arrives, from inside
/// [`TrackingProvider::update_frame`].
#[derive(Debug)]
pub struct ReplayProvider {
    publisher: TrackPublisher,
    background: Option<CameraFrame>,
    pending: VecDeque<TraceRecord>,
    camera_denied: bool,
    published: u64,
}

impl ReplayProvider {
    /// Provider with no background and an empty trace.
    pub fn new(publisher: TrackPublisher) -> Self {
        Self {
            publisher,
            background: None,
            pending: VecDeque::new(),
            camera_denied: false,
            published: 0,
        }
    }

    /// Serve `frame` as the camera image on every tick.
    pub fn with_background(mut self, frame: CameraFrame) -> Self {
        self.background = Some(frame);
        self
    }

    /// Append trace records.
    pub fn with_records(mut self, records: impl IntoIterator<Item = TraceRecord>) -> Self {
        self.pending.extend(records);
        self
    }

    /// Make [`TrackingProvider::open`] fail as if the user declined camera access.
    pub fn deny_camera(mut self) -> Self {
        self.camera_denied = true;
        self
    }

    /// Queue a record; it is published on the first tick at or after `record.tick`.
    pub fn push_record(&mut self, record: TraceRecord) {
        self.pending.push_back(record);
    }

    /// Records not yet published.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Records published so far.
    pub fn published(&self) -> u64 {
        self.published
    }

    fn publish(&mut self, rec: TraceRecord) -> FaceliftResult<()> {
        self.published += 1;
        if !rec.tracking {
            self.publisher.publish_lost();
            return Ok(());
        }
        let landmarks = rec.landmarks.ok_or_else(|| {
            FaceliftError::validation(format!("trace tick {}: missing landmarks", rec.tick))
        })?;
        self.publisher.publish(TrackSample {
            status: TrackingStatus::Tracking,
            pose: rec.pose.unwrap_or_default(),
            landmarks: LandmarkSet::new(landmarks),
        })?;
        Ok(())
    }
}

impl TrackingProvider for ReplayProvider {
    fn open(&mut self) -> FaceliftResult<()> {
        if self.camera_denied {
            return Err(FaceliftError::permission_denied("camera access was declined"));
        }
        Ok(())
    }

    fn update_frame(&mut self, tick: &FrameTick) -> FaceliftResult<()> {
        let mut first_err = None;
        while self.pending.front().is_some_and(|r| r.tick <= tick.index.0) {
            let Some(rec) = self.pending.pop_front() else {
                break;
            };
            if let Err(e) = self.publish(rec) {
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn background(&self) -> Option<&CameraFrame> {
        self.background.as_ref()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tracking/replay.rs"]
mod tests;
