use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::assets::loader::AssetPaths;
use crate::foundation::core::{Canvas, Fps};
use crate::foundation::error::{FaceliftError, FaceliftResult};
use crate::record::recorder::RecorderOpts;
use crate::render::projection::CameraProjection;
use crate::tracking::adapter::TrackingOpts;
use crate::tracking::state::DEFAULT_LANDMARK_COUNT;

/// Application configuration, loaded from JSON.
///
/// Every field is optional in the document; omitted fields take their defaults.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Composite surface size.
    pub canvas: Canvas,
    /// Nominal display refresh rate.
    pub fps: Fps,
    /// Landmarks per tracking sample (and vertices per overlay mesh).
    pub landmark_count: usize,
    /// Camera intrinsics used to place the overlay.
    pub projection: CameraProjection,
    /// Mirror the composite horizontally (front camera).
    pub mirror: bool,
    /// Clear color under the camera background (straight-alpha RGBA8).
    pub clear_rgba: Option<[u8; 4]>,
    /// Tracking adapter policy.
    pub tracking: TrackingOpts,
    /// Recorder options.
    pub recorder: RecorderOpts,
    /// Overlay assets; the overlay stays absent when unset.
    pub assets: Option<AssetPaths>,

    /// Directory relative asset paths resolve against (set by the loader).
    #[serde(skip)]
    pub base_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 640,
                height: 480,
            },
            fps: Fps::default(),
            landmark_count: DEFAULT_LANDMARK_COUNT,
            projection: CameraProjection::default(),
            mirror: false,
            clear_rgba: Some([0, 0, 0, 255]),
            tracking: TrackingOpts::default(),
            recorder: RecorderOpts::default(),
            assets: None,
            base_dir: None,
        }
    }
}

impl AppConfig {
    /// Parse a configuration from JSON.
    pub fn from_reader<R: std::io::Read>(r: R) -> FaceliftResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| FaceliftError::validation(format!("parse config JSON: {e}")))
    }

    /// Parse a configuration file. Relative asset paths resolve against its directory.
    pub fn from_path(path: impl AsRef<Path>) -> FaceliftResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FaceliftError::validation(format!("open config JSON '{}': {e}", path.display()))
        })?;
        let mut cfg = Self::from_reader(BufReader::new(f))?;
        cfg.base_dir = path.parent().map(Path::to_path_buf);
        Ok(cfg)
    }

    /// Check every value; environment capabilities are checked at startup instead.
    pub fn validate(&self) -> FaceliftResult<()> {
        self.canvas.validate()?;
        Fps::new(self.fps.num, self.fps.den)?;
        if self.landmark_count == 0 {
            return Err(FaceliftError::validation("landmark_count must be > 0"));
        }
        self.projection.validate()?;
        self.recorder.validate()?;
        Ok(())
    }

    /// Directory relative asset paths resolve against.
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Override the directory relative asset paths resolve against.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    /// Asset paths resolved against [`AppConfig::base_dir`].
    pub fn resolved_assets(&self) -> Option<AssetPaths> {
        let assets = self.assets.as_ref()?;
        Some(match self.base_dir.as_deref() {
            Some(dir) => assets.resolved_against(dir),
            None => assets.clone(),
        })
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
