use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::foundation::core::Vec3;
use crate::foundation::error::{FaceliftError, FaceliftResult};

/// Landmark count of the standard dense face mesh.
pub const DEFAULT_LANDMARK_COUNT: usize = 478;

/// Rigid/affine transform of the tracked face in camera space.
///
/// Stored column-major (`m[col * 4 + row]`), translation in elements 12..15.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[f32; 16]", into = "[f32; 16]")]
pub struct PoseTransform {
    m: [f32; 16],
}

impl PoseTransform {
    /// Identity transform.
    pub const IDENTITY: Self = Self {
        m: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// Build from a column-major array.
    pub const fn from_cols_array(m: [f32; 16]) -> Self {
        Self { m }
    }

    /// Pure translation.
    pub fn from_translation(t: Vec3) -> Self {
        let mut m = Self::IDENTITY.m;
        m[12] = t.x;
        m[13] = t.y;
        m[14] = t.z;
        Self { m }
    }

    /// Uniform scale followed by a translation.
    pub fn from_scale_translation(scale: f32, t: Vec3) -> Self {
        let mut out = Self::from_translation(t);
        out.m[0] = scale;
        out.m[5] = scale;
        out.m[10] = scale;
        out
    }

    /// Column-major elements.
    pub fn to_cols_array(&self) -> [f32; 16] {
        self.m
    }

    /// Return `true` when every element is finite.
    pub fn is_finite(&self) -> bool {
        self.m.iter().all(|v| v.is_finite())
    }

    /// Transform a point (w = 1), applying the perspective divide when `w != 1`.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let m = &self.m;
        let x = m[0] * p.x + m[4] * p.y + m[8] * p.z + m[12];
        let y = m[1] * p.x + m[5] * p.y + m[9] * p.z + m[13];
        let z = m[2] * p.x + m[6] * p.y + m[10] * p.z + m[14];
        let w = m[3] * p.x + m[7] * p.y + m[11] * p.z + m[15];
        if w == 1.0 || w == 0.0 {
            Vec3::new(x, y, z)
        } else {
            Vec3::new(x / w, y / w, z / w)
        }
    }
}

impl Default for PoseTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f32; 16]> for PoseTransform {
    fn from(m: [f32; 16]) -> Self {
        Self::from_cols_array(m)
    }
}

impl From<PoseTransform> for [f32; 16] {
    fn from(p: PoseTransform) -> Self {
        p.m
    }
}

/// Ordered, index-stable set of tracked face landmarks.
///
/// Cheap to clone: the points are shared behind an `Arc` and never mutated after creation.
#[derive(Clone, Debug, PartialEq)]
pub struct LandmarkSet {
    points: Arc<[Vec3]>,
}

impl LandmarkSet {
    /// Build a set from owned points.
    pub fn new(points: Vec<Vec3>) -> Self {
        Self {
            points: points.into(),
        }
    }

    /// `count` landmarks at the origin.
    pub fn zeros(count: usize) -> Self {
        Self::new(vec![Vec3::ZERO; count])
    }

    /// Number of landmarks.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Return `true` when the set has no landmarks.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Landmark `i`, if in range.
    pub fn get(&self, i: usize) -> Option<Vec3> {
        self.points.get(i).copied()
    }

    /// Borrow all landmarks in index order.
    pub fn as_slice(&self) -> &[Vec3] {
        &self.points
    }
}

/// Whether the provider currently has a lock on a face.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingStatus {
    /// A face is being tracked; pose and landmarks are current.
    Tracking,
    /// No face; pose and landmarks are the last known values.
    #[default]
    Lost,
}

/// A complete provider sample: pose, landmarks and tracking status.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackSample {
    /// Tracking status for this sample.
    pub status: TrackingStatus,
    /// Face pose in camera space.
    pub pose: PoseTransform,
    /// Landmarks in face space.
    pub landmarks: LandmarkSet,
}

/// Latest published tracking state.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceTrackState {
    /// Publication sequence number; `0` is the initial state before any publish.
    pub seq: u64,
    /// Tracking status.
    pub status: TrackingStatus,
    /// Face pose in camera space.
    pub pose: PoseTransform,
    /// Landmarks in face space.
    pub landmarks: LandmarkSet,
}

impl FaceTrackState {
    /// State before the provider has published anything: lost, identity pose, zeroed landmarks.
    pub fn initial(landmark_count: usize) -> Self {
        Self {
            seq: 0,
            status: TrackingStatus::Lost,
            pose: PoseTransform::IDENTITY,
            landmarks: LandmarkSet::zeros(landmark_count),
        }
    }

    /// Return `true` when the provider reported a tracked face.
    pub fn is_tracking(&self) -> bool {
        self.status == TrackingStatus::Tracking
    }
}

struct TrackShared {
    latest: parking_lot::Mutex<Arc<FaceTrackState>>,
    landmark_count: usize,
    published: AtomicU64,
}

/// Create a single-writer/single-reader latest-value slot for tracking state.
///
/// Each publish replaces the whole [`FaceTrackState`] behind one pointer swap, so a reader
/// always sees one complete sample, never a mix of old and new fields.
pub fn track_channel(landmark_count: usize) -> (TrackPublisher, TrackReader) {
    let shared = Arc::new(TrackShared {
        latest: parking_lot::Mutex::new(Arc::new(FaceTrackState::initial(landmark_count))),
        landmark_count,
        published: AtomicU64::new(0),
    });
    (
        TrackPublisher {
            shared: shared.clone(),
        },
        TrackReader { shared },
    )
}

/// Write half of the tracking slot; may live on the provider's own thread.
pub struct TrackPublisher {
    shared: Arc<TrackShared>,
}

impl std::fmt::Debug for TrackPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackPublisher")
            .field("landmark_count", &self.shared.landmark_count)
            .field("published", &self.shared.published.load(Ordering::Relaxed))
            .finish()
    }
}

impl TrackPublisher {
    /// Landmark count every sample must carry.
    pub fn landmark_count(&self) -> usize {
        self.shared.landmark_count
    }

    /// Publish a complete sample, returning its sequence number.
    ///
    /// Samples with the wrong landmark count or non-finite values are rejected and never
    /// become visible to readers.
    pub fn publish(&self, sample: TrackSample) -> FaceliftResult<u64> {
        if sample.landmarks.len() != self.shared.landmark_count {
            return Err(FaceliftError::validation(format!(
                "tracking sample has {} landmarks, expected {}",
                sample.landmarks.len(),
                self.shared.landmark_count
            )));
        }
        if !sample.pose.is_finite() {
            return Err(FaceliftError::validation(
                "tracking sample pose must be finite",
            ));
        }
        if sample.landmarks.as_slice().iter().any(|p| !p.is_finite()) {
            return Err(FaceliftError::validation(
                "tracking sample landmarks must be finite",
            ));
        }

        let (seq, prev) = {
            let mut latest = self.shared.latest.lock();
            let seq = self.shared.published.fetch_add(1, Ordering::AcqRel) + 1;
            let next = Arc::new(FaceTrackState {
                seq,
                status: sample.status,
                pose: sample.pose,
                landmarks: sample.landmarks,
            });
            (seq, std::mem::replace(&mut *latest, next))
        };
        // The previous sample is released outside the lock.
        drop(prev);
        Ok(seq)
    }

    /// Signal tracking loss, keeping the last known pose and landmarks.
    pub fn publish_lost(&self) -> u64 {
        let mut latest = self.shared.latest.lock();
        let seq = self.shared.published.fetch_add(1, Ordering::AcqRel) + 1;
        let next = Arc::new(FaceTrackState {
            seq,
            status: TrackingStatus::Lost,
            pose: latest.pose,
            landmarks: latest.landmarks.clone(),
        });
        *latest = next;
        seq
    }
}

/// Read half of the tracking slot, owned by the tracking adapter on the render thread.
pub struct TrackReader {
    shared: Arc<TrackShared>,
}

impl std::fmt::Debug for TrackReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackReader")
            .field("landmark_count", &self.shared.landmark_count)
            .finish()
    }
}

impl TrackReader {
    /// Landmark count every published sample carries.
    pub fn landmark_count(&self) -> usize {
        self.shared.landmark_count
    }

    /// The most recent complete sample.
    pub fn latest(&self) -> Arc<FaceTrackState> {
        self.shared.latest.lock().clone()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tracking/state.rs"]
mod tests;
