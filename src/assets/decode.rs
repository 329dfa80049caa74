use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::FaceliftResult;
use crate::foundation::math::{Fnv1a64, premultiply_rgba8_in_place};
use crate::render::backend::{CameraFrame, FrameRGBA};

/// Decoded overlay texture, premultiplied RGBA8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OverlayTexture {
    /// Content hash; renderers key their paint caches on it.
    pub id: u64,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 bytes, tightly packed, row-major.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl OverlayTexture {
    /// Build a texture from premultiplied bytes.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> Self {
        let mut h = Fnv1a64::new_default();
        h.write_u32(width);
        h.write_u32(height);
        h.write_bytes(&rgba8_premul);
        Self {
            id: h.finish(),
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        }
    }
}

fn decode_rgba8_premul(bytes: &[u8]) -> FaceliftResult<(u32, u32, Vec<u8>)> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    Ok((width, height, rgba8_premul))
}

/// Decode any format `image` understands into an overlay texture.
pub fn decode_texture(bytes: &[u8]) -> FaceliftResult<OverlayTexture> {
    let (w, h, px) = decode_rgba8_premul(bytes)?;
    Ok(OverlayTexture::from_premul(w, h, px))
}

/// Decode a still image into a camera frame.
pub fn decode_camera_frame(bytes: &[u8]) -> FaceliftResult<CameraFrame> {
    let (w, h, px) = decode_rgba8_premul(bytes)?;
    FrameRGBA::from_premul(w, h, px)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
