use std::time::Duration;

use crate::assets::loader::spawn_overlay_load;
use crate::config::AppConfig;
use crate::foundation::error::{FaceliftError, FaceliftResult};
use crate::record::recorder::{Recorder, RecordingState};
use crate::render::backend::SceneRenderer;
use crate::render::cpu::{CpuRendererOpts, CpuSceneRenderer};
use crate::render::display::DisplayLink;
use crate::render::frame_loop::{LoopStats, RenderLoop};
use crate::render::surface::CompositeSurface;
use crate::tracking::adapter::{TrackingAdapter, TrackingProvider};
use crate::tracking::state::TrackReader;

/// Process-wide state, built once by [`AppContext::start`].
///
/// Startup either fails with an environment error (nothing runs) or yields a ready render
/// loop. Everything after that point (asset failures, recording failures, draw failures) is
/// absorbed by the loop.
pub struct AppContext<P, R = CpuSceneRenderer> {
    config: AppConfig,
    frame_loop: RenderLoop<P, R>,
}

impl<P, R> std::fmt::Debug for AppContext<P, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("frame_loop", &self.frame_loop)
            .finish()
    }
}

impl<P: TrackingProvider> AppContext<P, CpuSceneRenderer> {
    /// Start with the `vello_cpu` renderer configured from `config`.
    pub fn start(config: AppConfig, provider: P, reader: TrackReader) -> FaceliftResult<Self> {
        let renderer = CpuSceneRenderer::new(
            CpuRendererOpts::default()
                .with_clear_rgba(config.clear_rgba)
                .with_mirror(config.mirror),
        );
        Self::start_with_renderer(config, provider, reader, renderer)
    }
}

impl<P: TrackingProvider, R: SceneRenderer> AppContext<P, R> {
    /// Validate `config`, acquire the camera and assemble the render loop.
    ///
    /// Fails with [`FaceliftError::UnsupportedEnvironment`] or
    /// [`FaceliftError::PermissionDenied`] when the platform cannot run the pipeline, and
    /// with [`FaceliftError::Validation`] for bad configuration. Overlay assets load in the
    /// background and attach on a later tick.
    #[tracing::instrument(
        skip_all,
        fields(
            width = config.canvas.width,
            height = config.canvas.height,
            landmarks = config.landmark_count
        )
    )]
    pub fn start_with_renderer(
        config: AppConfig,
        provider: P,
        reader: TrackReader,
        renderer: R,
    ) -> FaceliftResult<Self> {
        config.validate()?;
        config.recorder.check_environment()?;
        if reader.landmark_count() != config.landmark_count {
            return Err(FaceliftError::validation(format!(
                "tracking slot carries {} landmarks, config expects {}",
                reader.landmark_count(),
                config.landmark_count
            )));
        }

        let mut tracking = TrackingAdapter::new(provider, reader, config.tracking);
        tracking.open()?;

        let surface = CompositeSurface::new(config.canvas)?;
        let recorder = Recorder::new(config.recorder.clone(), config.canvas, config.fps);
        let mut frame_loop =
            RenderLoop::new(tracking, renderer, config.projection, surface, recorder);

        match config.resolved_assets() {
            Some(paths) => match spawn_overlay_load(paths, config.landmark_count) {
                Ok(load) => frame_loop = frame_loop.with_asset_load(load),
                Err(e) => tracing::warn!(error = %e, "overlay unavailable"),
            },
            None => tracing::info!("no overlay assets configured"),
        }

        tracing::info!("context started");
        Ok(Self { config, frame_loop })
    }

    /// Configuration the context was started with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Route a click/tap to the recorder.
    pub fn tap(&mut self) -> FaceliftResult<RecordingState> {
        self.frame_loop.recorder_mut().toggle()
    }

    /// Drive the render loop from `link`.
    pub fn run(&mut self, link: &mut dyn DisplayLink) -> LoopStats {
        self.frame_loop.run(link)
    }

    /// Stop any active recording and wait up to `timeout` for pending completions.
    ///
    /// Returns the number of completions still outstanding.
    pub fn shutdown(&mut self, timeout: Duration) -> usize {
        let recorder = self.frame_loop.recorder_mut();
        recorder.stop();
        recorder.join_pending(timeout);
        let left = recorder.pending_completions();
        if left > 0 {
            tracing::warn!(pending = left, "recordings still encoding at shutdown");
        }
        left
    }

    /// The render loop.
    pub fn frame_loop(&self) -> &RenderLoop<P, R> {
        &self.frame_loop
    }

    /// Mutable render loop.
    pub fn frame_loop_mut(&mut self) -> &mut RenderLoop<P, R> {
        &mut self.frame_loop
    }

    /// The recorder.
    pub fn recorder(&self) -> &Recorder {
        self.frame_loop.recorder()
    }

    /// Mutable recorder, for completion subscriptions.
    pub fn recorder_mut(&mut self) -> &mut Recorder {
        self.frame_loop.recorder_mut()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/app/context.rs"]
mod tests;
