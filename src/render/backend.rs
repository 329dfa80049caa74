use crate::assets::decode::OverlayTexture;
use crate::foundation::core::Canvas;
use crate::foundation::error::{FaceliftError, FaceliftResult};
use crate::foundation::math::Fnv1a64;
use crate::mesh::geometry::OverlayGeometry;
use crate::render::projection::CameraProjection;
use crate::tracking::state::PoseTransform;

/// A frame as premultiplied RGBA8 pixels, tightly packed, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes.
    pub data: Vec<u8>,
}

/// A camera image delivered by the tracking provider.
pub type CameraFrame = FrameRGBA;

impl FrameRGBA {
    /// Fully transparent frame covering `canvas`.
    pub fn new_transparent(canvas: Canvas) -> Self {
        Self {
            width: canvas.width,
            height: canvas.height,
            data: vec![0; canvas.rgba8_len()],
        }
    }

    /// Frame filled with one premultiplied color.
    pub fn filled(canvas: Canvas, premul: [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(canvas.rgba8_len());
        for _ in 0..(canvas.width as usize) * (canvas.height as usize) {
            data.extend_from_slice(&premul);
        }
        Self {
            width: canvas.width,
            height: canvas.height,
            data,
        }
    }

    /// Wrap existing premultiplied bytes, checking the length.
    pub fn from_premul(width: u32, height: u32, data: Vec<u8>) -> FaceliftResult<Self> {
        let canvas = Canvas { width, height };
        if data.len() != canvas.rgba8_len() {
            return Err(FaceliftError::validation(format!(
                "frame byte len {} does not match {width}x{height}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub(crate) fn empty() -> Self {
        Self {
            width: 0,
            height: 0,
            data: Vec::new(),
        }
    }

    /// Frame dimensions.
    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    /// Pixel at `(x, y)`, if in bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// FNV-1a hash over dimensions and pixels, for bit-exact comparisons.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        h.write_u32(self.width);
        h.write_u32(self.height);
        h.write_bytes(&self.data);
        h.finish()
    }
}

/// Overlay draw inputs for one tick.
#[derive(Clone, Copy, Debug)]
pub struct OverlayDraw<'a> {
    /// Deformed mesh (positions in face space plus topology).
    pub geometry: &'a OverlayGeometry,
    /// Texture sampled through the mesh UVs.
    pub texture: &'a OverlayTexture,
    /// Face pose used to place the mesh in camera space.
    pub pose: PoseTransform,
}

/// Everything drawn into the composite surface on one tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct OverlayScene<'a> {
    /// Camera background, if a frame has arrived.
    pub background: Option<&'a CameraFrame>,
    /// Overlay mesh, absent while assets load or while the overlay root is hidden.
    pub overlay: Option<OverlayDraw<'a>>,
}

/// Draws a full scene into a frame.
///
/// Implementations must overwrite every pixel of `target`: the buffer handed in holds a
/// stale frame.
pub trait SceneRenderer {
    /// Draw `scene` into `target`.
    fn render(
        &mut self,
        scene: &OverlayScene<'_>,
        projection: &CameraProjection,
        target: &mut FrameRGBA,
    ) -> FaceliftResult<()>;
}

impl<R: SceneRenderer + ?Sized> SceneRenderer for Box<R> {
    fn render(
        &mut self,
        scene: &OverlayScene<'_>,
        projection: &CameraProjection,
        target: &mut FrameRGBA,
    ) -> FaceliftResult<()> {
        (**self).render(scene, projection, target)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/backend.rs"]
mod tests;
