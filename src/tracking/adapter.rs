use std::sync::Arc;

use crate::events::channel::{Event, EventChannel, SubscriptionId};
use crate::foundation::error::FaceliftResult;
use crate::render::backend::CameraFrame;
use crate::render::display::FrameTick;
use crate::tracking::state::{FaceTrackState, LandmarkSet, PoseTransform, TrackReader};

/// External camera + face-tracking provider.
///
/// The provider owns the camera feed. Tracking results are published through a
/// [`crate::TrackPublisher`], either from inside [`TrackingProvider::update_frame`] or from
/// the provider's own background thread.
pub trait TrackingProvider {
    /// Acquire the camera. Fails with `PermissionDenied` or `UnsupportedEnvironment`.
    fn open(&mut self) -> FaceliftResult<()> {
        Ok(())
    }

    /// Pull the next camera image for this display refresh.
    ///
    /// Called exactly once per tick, before anything is drawn.
    fn update_frame(&mut self, tick: &FrameTick) -> FaceliftResult<()>;

    /// The current camera image, if one has arrived.
    fn background(&self) -> Option<&CameraFrame>;
}

/// Face visibility as observed by the render loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FaceVisibility {
    /// A face is tracked.
    Visible,
    /// No face is tracked.
    #[default]
    NotVisible,
}

/// Visibility transition events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisibilityEvent {
    /// Tracking acquired a face.
    BecameVisible,
    /// Tracking lost the face.
    BecameNotVisible,
}

impl Event for VisibilityEvent {
    type Kind = Self;

    fn kind(&self) -> Self {
        *self
    }
}

/// Tracking adapter policy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct TrackingOpts {
    /// Consecutive lost ticks tolerated before `BecameNotVisible` fires (0 = immediate).
    pub loss_grace_ticks: u32,
}

/// Wraps a [`TrackingProvider`] and fixes one tracking snapshot per tick.
pub struct TrackingAdapter<P> {
    provider: P,
    reader: TrackReader,
    opts: TrackingOpts,

    current: Arc<FaceTrackState>,
    visibility: FaceVisibility,
    lost_streak: u32,
    events: EventChannel<VisibilityEvent>,
}

impl<P> std::fmt::Debug for TrackingAdapter<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackingAdapter")
            .field("seq", &self.current.seq)
            .field("visibility", &self.visibility)
            .field("lost_streak", &self.lost_streak)
            .finish_non_exhaustive()
    }
}

impl<P: TrackingProvider> TrackingAdapter<P> {
    /// Build an adapter reading tracking results from `reader`.
    pub fn new(provider: P, reader: TrackReader, opts: TrackingOpts) -> Self {
        let current = reader.latest();
        Self {
            provider,
            reader,
            opts,
            current,
            visibility: FaceVisibility::NotVisible,
            lost_streak: 0,
            events: EventChannel::new(),
        }
    }

    /// Acquire the camera through the provider.
    pub fn open(&mut self) -> FaceliftResult<()> {
        self.provider.open()
    }

    /// Advance the provider one frame and fix this tick's tracking snapshot.
    ///
    /// The snapshot is taken even when the provider reports an error, so the rest of the tick
    /// still sees the most recent complete sample. Visibility events fire synchronously here.
    pub fn advance(&mut self, tick: &FrameTick) -> FaceliftResult<()> {
        let res = self.provider.update_frame(tick);
        self.fix_snapshot();
        res
    }

    fn fix_snapshot(&mut self) {
        let latest = self.reader.latest();
        if latest.seq != self.current.seq {
            tracing::trace!(seq = latest.seq, "tracking sample");
        }
        self.current = latest;

        if self.current.is_tracking() {
            self.lost_streak = 0;
            if self.visibility != FaceVisibility::Visible {
                self.visibility = FaceVisibility::Visible;
                tracing::debug!(seq = self.current.seq, "face visible");
                self.events.publish(&VisibilityEvent::BecameVisible);
            }
            return;
        }

        self.lost_streak = self.lost_streak.saturating_add(1);
        if self.visibility == FaceVisibility::Visible
            && self.lost_streak > self.opts.loss_grace_ticks
        {
            self.visibility = FaceVisibility::NotVisible;
            tracing::debug!(
                seq = self.current.seq,
                lost_ticks = self.lost_streak,
                "face not visible"
            );
            self.events.publish(&VisibilityEvent::BecameNotVisible);
        }
    }

    /// Pose from this tick's snapshot.
    pub fn current_pose(&self) -> PoseTransform {
        self.current.pose
    }

    /// Landmarks from this tick's snapshot.
    pub fn current_landmarks(&self) -> LandmarkSet {
        self.current.landmarks.clone()
    }

    /// This tick's full snapshot.
    pub fn snapshot(&self) -> &FaceTrackState {
        &self.current
    }

    /// Current face visibility.
    pub fn visibility(&self) -> FaceVisibility {
        self.visibility
    }

    /// Register a callback for [`VisibilityEvent::BecameVisible`].
    pub fn on_visible(
        &mut self,
        callback: impl FnMut(&VisibilityEvent) + 'static,
    ) -> SubscriptionId {
        self.events.subscribe(VisibilityEvent::BecameVisible, callback)
    }

    /// Register a callback for [`VisibilityEvent::BecameNotVisible`].
    pub fn on_not_visible(
        &mut self,
        callback: impl FnMut(&VisibilityEvent) + 'static,
    ) -> SubscriptionId {
        self.events
            .subscribe(VisibilityEvent::BecameNotVisible, callback)
    }

    /// Visibility event channel, for subscribers that bind both kinds at once.
    pub fn events_mut(&mut self) -> &mut EventChannel<VisibilityEvent> {
        &mut self.events
    }

    /// Borrow the wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Mutably borrow the wrapped provider.
    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// The provider's current camera image.
    pub fn background(&self) -> Option<&CameraFrame> {
        self.provider.background()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tracking/adapter.rs"]
mod tests;
