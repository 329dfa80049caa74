use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::foundation::core::{Fps, TickIndex};
use crate::foundation::error::{FaceliftError, FaceliftResult};
use crate::render::backend::FrameRGBA;

/// Configuration provided to a [`FrameSink`] when a recording starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Nominal frame rate.
    pub fps: Fps,
}

/// What a finished recording produced.
#[derive(Debug, Clone)]
pub enum RecordingArtifact {
    /// Nothing was captured.
    Empty,
    /// Raw frames in tick order.
    Frames(Vec<(TickIndex, Arc<FrameRGBA>)>),
    /// Encoded bytes, optionally also written to `path`.
    Encoded {
        /// MIME type of `bytes`.
        media_type: &'static str,
        /// Encoded payload.
        bytes: Vec<u8>,
        /// File the payload was written to, if any.
        path: Option<PathBuf>,
    },
    /// Encoded output that lives only on disk.
    File {
        /// MIME type of the file.
        media_type: &'static str,
        /// Output path.
        path: PathBuf,
    },
}

impl RecordingArtifact {
    /// MIME type of the payload returned by [`RecordingArtifact::to_bytes`].
    pub fn media_type(&self) -> &'static str {
        match self {
            Self::Empty => "application/octet-stream",
            Self::Frames(_) => "application/x-rgba8-premul-frames",
            Self::Encoded { media_type, .. } | Self::File { media_type, .. } => media_type,
        }
    }

    /// The encoded payload. Raw frames are concatenated in tick order.
    pub fn to_bytes(&self) -> FaceliftResult<Vec<u8>> {
        match self {
            Self::Empty => Ok(Vec::new()),
            Self::Frames(frames) => {
                let len = frames.iter().map(|(_, f)| f.data.len()).sum();
                let mut out = Vec::with_capacity(len);
                for (_, f) in frames {
                    out.extend_from_slice(&f.data);
                }
                Ok(out)
            }
            Self::Encoded { bytes, .. } => Ok(bytes.clone()),
            Self::File { path, .. } => Ok(std::fs::read(path)
                .with_context(|| format!("read recording '{}'", path.display()))?),
        }
    }
}

/// Sink contract for consuming recorded frames.
///
/// Ordering contract: `push_frame` is called in strictly increasing tick order between one
/// `begin` and one `end`. Ticks may be skipped when the recorder drops frames.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> FaceliftResult<()>;
    /// Push one frame.
    fn push_frame(&mut self, idx: TickIndex, frame: Arc<FrameRGBA>) -> FaceliftResult<()>;
    /// Called once after the last frame; finalizes the output.
    fn end(&mut self) -> FaceliftResult<RecordingArtifact>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(TickIndex, Arc<FrameRGBA>)>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> FaceliftResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: TickIndex, frame: Arc<FrameRGBA>) -> FaceliftResult<()> {
        self.frames.push((idx, frame));
        Ok(())
    }

    fn end(&mut self) -> FaceliftResult<RecordingArtifact> {
        if self.frames.is_empty() {
            return Ok(RecordingArtifact::Empty);
        }
        Ok(RecordingArtifact::Frames(std::mem::take(&mut self.frames)))
    }
}

/// Sink that keeps the last frame and encodes it as a PNG (a "photo" capture).
#[derive(Debug, Default)]
pub struct StillImageSink {
    out_path: Option<PathBuf>,
    last: Option<Arc<FrameRGBA>>,
}

impl StillImageSink {
    /// Encode to memory only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Also write the PNG to `path` on `end`.
    pub fn with_out_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.out_path = Some(path.into());
        self
    }
}

impl FrameSink for StillImageSink {
    fn begin(&mut self, _cfg: SinkConfig) -> FaceliftResult<()> {
        self.last = None;
        Ok(())
    }

    fn push_frame(&mut self, _idx: TickIndex, frame: Arc<FrameRGBA>) -> FaceliftResult<()> {
        self.last = Some(frame);
        Ok(())
    }

    fn end(&mut self) -> FaceliftResult<RecordingArtifact> {
        let Some(frame) = self.last.take() else {
            return Ok(RecordingArtifact::Empty);
        };
        let bytes = encode_png(&frame)?;
        if let Some(path) = self.out_path.as_ref() {
            ensure_parent_dir(path)?;
            std::fs::write(path, &bytes)
                .with_context(|| format!("write png '{}'", path.display()))?;
        }
        Ok(RecordingArtifact::Encoded {
            media_type: "image/png",
            bytes,
            path: self.out_path.clone(),
        })
    }
}

/// Encode a premultiplied frame as a straight-alpha PNG.
pub fn encode_png(frame: &FrameRGBA) -> FaceliftResult<Vec<u8>> {
    let mut straight = frame.data.clone();
    unpremultiply_rgba8_in_place(&mut straight);
    let img = image::RgbaImage::from_raw(frame.width, frame.height, straight)
        .ok_or_else(|| FaceliftError::recording("frame byte len does not match its size"))?;
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .context("encode png")?;
    Ok(buf)
}

fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
