use std::sync::Arc;

use crate::assets::decode::OverlayTexture;
use crate::assets::loader::{AssetLoad, OverlayAssets};
use crate::events::task::TaskPoll;
use crate::foundation::error::FaceliftResult;
use crate::mesh::deformer::MeshDeformer;
use crate::record::recorder::Recorder;
use crate::render::backend::{OverlayDraw, OverlayScene, SceneRenderer};
use crate::render::display::{DisplayLink, FrameTick};
use crate::render::projection::CameraProjection;
use crate::render::surface::CompositeSurface;
use crate::tracking::adapter::{TrackingAdapter, TrackingProvider};
use crate::visibility::gate::{OverlayRoot, VisibilityGate};

/// Render loop counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Ticks executed.
    pub ticks: u64,
    /// Ticks whose draw failed; the previous frame stayed on screen.
    pub draws_failed: u64,
    /// Display refreshes missed between ticks.
    pub refreshes_dropped: u64,
    /// Ticks on which the provider reported an error.
    pub provider_errors: u64,
}

/// Single-threaded per-tick pipeline: tracking, deformation, draw, recording.
///
/// Each [`RenderLoop::tick`] runs, strictly in order:
///
/// 1. advance the camera/tracking provider and fix the tick's tracking snapshot,
/// 2. deform the overlay mesh from that snapshot,
/// 3. draw the full scene into the surface's back buffer and present it,
/// 4. hand the presented frame to the recorder.
///
/// Deferred work (asset loading, recording completion) is polled on the same thread, so its
/// continuations never interleave with steps 1 to 4.
pub struct RenderLoop<P, R> {
    tracking: TrackingAdapter<P>,
    deformer: MeshDeformer,
    renderer: R,
    projection: CameraProjection,
    surface: CompositeSurface,
    recorder: Recorder,
    gate: VisibilityGate,

    texture: Option<Arc<OverlayTexture>>,
    asset_load: Option<AssetLoad>,
    stats: LoopStats,
    running: bool,
}

impl<P, R> std::fmt::Debug for RenderLoop<P, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderLoop")
            .field("tracking", &self.tracking)
            .field("surface", &self.surface.canvas())
            .field("recorder", &self.recorder)
            .field("overlay", &self.texture.is_some())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<P: TrackingProvider, R: SceneRenderer> RenderLoop<P, R> {
    /// Assemble a loop. The overlay root is bound to the adapter's visibility events here.
    pub fn new(
        mut tracking: TrackingAdapter<P>,
        renderer: R,
        projection: CameraProjection,
        surface: CompositeSurface,
        recorder: Recorder,
    ) -> Self {
        let gate = VisibilityGate::bind(tracking.events_mut(), OverlayRoot::new());
        Self {
            tracking,
            deformer: MeshDeformer::default(),
            renderer,
            projection,
            surface,
            recorder,
            gate,
            texture: None,
            asset_load: None,
            stats: LoopStats::default(),
            running: false,
        }
    }

    /// Attach the overlay once `load` completes.
    pub fn with_asset_load(mut self, load: AssetLoad) -> Self {
        self.asset_load = Some(load);
        self
    }

    /// Attach loaded overlay assets. The topology can only be attached once.
    pub fn attach_assets(&mut self, assets: OverlayAssets) -> FaceliftResult<()> {
        self.deformer.geometry_mut().set_topology(assets.topology)?;
        self.texture = Some(assets.texture);
        tracing::info!("overlay attached");
        Ok(())
    }

    fn poll_assets(&mut self) {
        let Some(load) = self.asset_load.as_mut() else {
            return;
        };
        let outcome = match load.poll() {
            TaskPoll::Pending => return,
            TaskPoll::Ready(outcome) => outcome,
            TaskPoll::Lost => {
                self.asset_load = None;
                tracing::warn!("asset loader exited without a result; overlay disabled");
                return;
            }
        };
        self.asset_load = None;
        match outcome.and_then(|assets| self.attach_assets(assets)) {
            Ok(()) => {}
            Err(e) => tracing::warn!(error = %e, "overlay unavailable"),
        }
    }

    /// Run one tick.
    pub fn tick(&mut self, tick: &FrameTick) {
        self.stats.ticks += 1;
        self.stats.refreshes_dropped += u64::from(tick.dropped);
        self.poll_assets();

        if let Err(e) = self.tracking.advance(tick) {
            self.stats.provider_errors += 1;
            tracing::warn!(tick = tick.index.0, error = %e, "tracking provider error");
        }

        let landmarks = self.tracking.current_landmarks();
        self.deformer.update_from_tracking(&landmarks);

        let overlay = match self.texture.as_deref() {
            Some(texture) if self.gate.root().is_visible() => Some(OverlayDraw {
                geometry: self.deformer.geometry(),
                texture,
                pose: self.tracking.current_pose(),
            }),
            _ => None,
        };
        let scene = OverlayScene {
            background: self.tracking.background(),
            overlay,
        };
        let target = self.surface.begin_draw();
        match self.renderer.render(&scene, &self.projection, target) {
            Ok(()) => self.surface.present(tick.index),
            Err(e) => {
                self.stats.draws_failed += 1;
                tracing::warn!(
                    tick = tick.index.0,
                    error = %e,
                    "draw failed; keeping previous frame"
                );
            }
        }
        tracing::debug!(
            tick = tick.index.0,
            seq = self.tracking.snapshot().seq,
            overlay = scene.overlay.is_some(),
            "tick"
        );

        self.recorder.sample(tick.index, &self.surface);
        self.recorder.poll();
    }

    /// Tick once per display refresh until the link stops or [`RenderLoop::stop`] is called.
    pub fn run(&mut self, link: &mut dyn DisplayLink) -> LoopStats {
        self.running = true;
        tracing::info!("render loop started");
        while self.running {
            let Some(tick) = link.next_refresh() else {
                break;
            };
            self.tick(&tick);
        }
        self.running = false;
        tracing::info!(
            ticks = self.stats.ticks,
            draws_failed = self.stats.draws_failed,
            refreshes_dropped = self.stats.refreshes_dropped,
            "render loop stopped"
        );
        self.stats
    }

    /// Leave [`RenderLoop::run`] after the current tick.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Return `true` while inside [`RenderLoop::run`].
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Counters so far.
    pub fn stats(&self) -> LoopStats {
        self.stats
    }

    /// Return `true` once the overlay assets are attached.
    pub fn has_overlay(&self) -> bool {
        self.texture.is_some()
    }

    /// Return `true` while the overlay assets are still loading.
    pub fn assets_pending(&self) -> bool {
        self.asset_load.is_some()
    }

    /// The tracking adapter.
    pub fn tracking(&self) -> &TrackingAdapter<P> {
        &self.tracking
    }

    /// Mutable tracking adapter, for subscribing to visibility events.
    pub fn tracking_mut(&mut self) -> &mut TrackingAdapter<P> {
        &mut self.tracking
    }

    /// The mesh deformer and its geometry.
    pub fn deformer(&self) -> &MeshDeformer {
        &self.deformer
    }

    /// The composite surface.
    pub fn surface(&self) -> &CompositeSurface {
        &self.surface
    }

    /// The recorder.
    pub fn recorder(&self) -> &Recorder {
        &self.recorder
    }

    /// Mutable recorder, for start/stop and subscriptions.
    pub fn recorder_mut(&mut self) -> &mut Recorder {
        &mut self.recorder
    }

    /// The overlay root driven by the visibility gate.
    pub fn overlay_root(&self) -> &OverlayRoot {
        self.gate.root()
    }

    /// The scene renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Mutable scene renderer.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame_loop.rs"]
mod tests;
