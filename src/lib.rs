//! Facelift composites a textured face-mesh overlay onto a live camera feed.
//!
//! Every display refresh runs one tick on a single render thread:
//!
//! - [`TrackingAdapter`] fixes the latest complete pose/landmark sample for the tick
//! - [`MeshDeformer`] writes the landmarks into the overlay geometry
//! - a [`SceneRenderer`] composites background and overlay into a [`CompositeSurface`]
//! - [`Recorder`] hands the presented frame to an encoder thread while recording
//!
//! [`AppContext`] wires these together at startup; [`VisibilityGate`] hides the overlay while
//! no face is tracked.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Startup wiring.
pub mod app;
/// Overlay asset loading.
pub mod assets;
/// JSON application configuration.
pub mod config;
/// Recording sinks.
pub mod encode;
/// Event channels and deferred tasks.
pub mod events;
/// Overlay mesh and deformation.
pub mod mesh;
/// Recorder state machine.
pub mod record;
/// Display pacing, compositing and the render loop.
pub mod render;
/// Face tracking model and adapter.
pub mod tracking;
/// Overlay visibility gate.
pub mod visibility;

pub use crate::foundation::core::{Affine, Canvas, Fps, Point, TickIndex, Vec2, Vec3};
pub use crate::foundation::error::{FaceliftError, FaceliftResult};

pub use crate::app::context::AppContext;
pub use crate::assets::decode::{OverlayTexture, decode_camera_frame, decode_texture};
pub use crate::assets::loader::{AssetPaths, OverlayAssets, load_overlay_assets};
pub use crate::config::AppConfig;
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{
    FrameSink, InMemorySink, RecordingArtifact, SinkConfig, StillImageSink,
};
pub use crate::events::channel::{Event, EventChannel, SubscriptionId};
pub use crate::events::task::{Deferred, TaskPoll};
pub use crate::mesh::deformer::MeshDeformer;
pub use crate::mesh::geometry::{MeshTopology, OverlayGeometry};
pub use crate::record::recorder::{
    Recorder, RecorderEvent, RecorderOpts, RecordingFormat, RecordingResult, RecordingState,
};
pub use crate::render::backend::{CameraFrame, FrameRGBA, OverlayScene, SceneRenderer};
pub use crate::render::cpu::{CpuRendererOpts, CpuSceneRenderer};
pub use crate::render::display::{DisplayLink, FrameTick, IntervalDisplayLink, ManualDisplayLink};
pub use crate::render::frame_loop::{LoopStats, RenderLoop};
pub use crate::render::projection::CameraProjection;
pub use crate::render::surface::CompositeSurface;
pub use crate::tracking::adapter::{
    FaceVisibility, TrackingAdapter, TrackingOpts, TrackingProvider, VisibilityEvent,
};
pub use crate::tracking::replay::{ReplayProvider, TraceRecord, parse_trace};
pub use crate::tracking::state::{
    FaceTrackState, LandmarkSet, PoseTransform, TrackPublisher, TrackReader, TrackSample,
    TrackingStatus, track_channel,
};
pub use crate::visibility::gate::{OverlayRoot, VisibilityGate};
