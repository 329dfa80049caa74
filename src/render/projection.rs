use crate::foundation::core::{Canvas, Point, Vec3};
use crate::foundation::error::{FaceliftError, FaceliftResult};
use crate::tracking::state::PoseTransform;

/// Pinhole camera looking down `-Z`, principal point at the canvas center.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CameraProjection {
    /// Focal length in pixels.
    pub focal_px: f32,
    /// Points closer than this distance in front of the camera are not projected.
    pub near: f32,
}

impl Default for CameraProjection {
    fn default() -> Self {
        Self {
            focal_px: 800.0,
            near: 0.01,
        }
    }
}

impl CameraProjection {
    /// Check that focal length and near distance are positive and finite.
    pub fn validate(&self) -> FaceliftResult<()> {
        if !(self.focal_px.is_finite() && self.focal_px > 0.0) {
            return Err(FaceliftError::validation(
                "projection focal_px must be finite and > 0",
            ));
        }
        if !(self.near.is_finite() && self.near > 0.0) {
            return Err(FaceliftError::validation(
                "projection near must be finite and > 0",
            ));
        }
        Ok(())
    }

    /// Project a camera-space point to canvas pixels (y down).
    ///
    /// Returns `None` for points behind the near plane.
    pub fn project(&self, p: Vec3, canvas: Canvas) -> Option<Point> {
        let depth = -p.z;
        if !(depth >= self.near) || !p.is_finite() {
            return None;
        }
        let cx = f64::from(canvas.width) * 0.5;
        let cy = f64::from(canvas.height) * 0.5;
        let s = f64::from(self.focal_px) / f64::from(depth);
        Some(Point::new(cx + f64::from(p.x) * s, cy - f64::from(p.y) * s))
    }

    /// Place a face-space vertex with `pose`, then project it.
    pub fn project_posed(&self, pose: &PoseTransform, p: Vec3, canvas: Canvas) -> Option<Point> {
        self.project(pose.transform_point(p), canvas)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/projection.rs"]
mod tests;
