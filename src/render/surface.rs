use std::sync::Arc;

use crate::foundation::core::{Canvas, TickIndex};
use crate::foundation::error::FaceliftResult;
use crate::render::backend::FrameRGBA;

/// The composited frame shown to the user, double-buffered.
///
/// The render loop draws into the back buffer and [`CompositeSurface::present`]s it once the
/// draw completes. Readers (display, recorder, snapshots) only ever see the front buffer, so
/// a half-drawn frame is not observable. Front frames are shared behind an `Arc`: handing
/// one to the recorder is a pointer copy, and the recorded bytes are the displayed bytes.
#[derive(Debug)]
pub struct CompositeSurface {
    canvas: Canvas,
    front: Arc<FrameRGBA>,
    back: FrameRGBA,
    front_tick: Option<TickIndex>,
    presented: u64,
    reallocated: u64,
}

impl CompositeSurface {
    /// Allocate both buffers for `canvas`, initially transparent.
    pub fn new(canvas: Canvas) -> FaceliftResult<Self> {
        canvas.validate()?;
        Ok(Self {
            canvas,
            front: Arc::new(FrameRGBA::new_transparent(canvas)),
            back: FrameRGBA::new_transparent(canvas),
            front_tick: None,
            presented: 0,
            reallocated: 0,
        })
    }

    /// Surface dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Back buffer for this tick's draw. Its previous contents are stale.
    pub(crate) fn begin_draw(&mut self) -> &mut FrameRGBA {
        &mut self.back
    }

    /// Promote the back buffer to the front.
    ///
    /// The old front buffer is recycled as the next back buffer unless a reader still holds
    /// it, in which case a fresh one is allocated.
    pub(crate) fn present(&mut self, tick: TickIndex) {
        let drawn = std::mem::replace(&mut self.back, FrameRGBA::empty());
        let old = std::mem::replace(&mut self.front, Arc::new(drawn));
        self.back = match Arc::try_unwrap(old) {
            Ok(frame) => frame,
            Err(_) => {
                self.reallocated += 1;
                FrameRGBA::new_transparent(self.canvas)
            }
        };
        self.front_tick = Some(tick);
        self.presented += 1;
    }

    /// The last fully composited frame.
    pub fn read(&self) -> &FrameRGBA {
        &self.front
    }

    /// Shared handle to the last fully composited frame.
    pub fn snapshot(&self) -> Arc<FrameRGBA> {
        self.front.clone()
    }

    /// Tick that produced the front buffer; `None` before the first present.
    pub fn front_tick(&self) -> Option<TickIndex> {
        self.front_tick
    }

    /// Number of frames presented so far.
    pub fn presented(&self) -> u64 {
        self.presented
    }

    /// Number of back buffers allocated because a reader still held the old front.
    pub fn reallocated(&self) -> u64 {
        self.reallocated
    }

    /// Fingerprint of the front buffer.
    pub fn fingerprint(&self) -> u64 {
        self.front.fingerprint()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
