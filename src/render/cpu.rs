use std::sync::Arc;

use crate::assets::decode::OverlayTexture;
use crate::foundation::core::{Affine, Canvas, Point};
use crate::foundation::error::{FaceliftError, FaceliftResult};
use crate::render::backend::{FrameRGBA, OverlayDraw, OverlayScene, SceneRenderer};
use crate::render::projection::CameraProjection;

/// Options for [`CpuSceneRenderer`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuRendererOpts {
    /// Clear color (straight-alpha RGBA8) drawn under everything; transparent when unset.
    pub clear_rgba: Option<[u8; 4]>,
    /// Mirror the composite horizontally (selfie view).
    pub mirror: bool,
}

impl CpuRendererOpts {
    /// Return options with a configured clear color.
    pub fn with_clear_rgba(mut self, clear: Option<[u8; 4]>) -> Self {
        self.clear_rgba = clear;
        self
    }

    /// Return options with mirroring toggled.
    pub fn with_mirror(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }
}

/// Converted image paint, keyed by texture id or camera frame fingerprint.
#[derive(Clone)]
struct CachedPaint {
    key: u64,
    paint: vello_cpu::Image,
}

/// Per-triangle draw record, sorted back to front.
#[derive(Clone, Copy, Debug)]
struct ScreenTri {
    depth: f32,
    screen: [Point; 3],
    texel: [Point; 3],
}

/// Scene renderer powered by `vello_cpu`.
///
/// Draws the camera background scaled to cover the canvas, then the overlay mesh as
/// textured triangles, back to front.
pub struct CpuSceneRenderer {
    opts: CpuRendererOpts,
    ctx: Option<vello_cpu::RenderContext>,
    pixmap: Option<vello_cpu::Pixmap>,
    texture: Option<CachedPaint>,
    background: Option<CachedPaint>,
    background_uploads: u64,
    tris: Vec<ScreenTri>,
    skipped_tris: u64,
}

impl std::fmt::Debug for CpuSceneRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSceneRenderer")
            .field("opts", &self.opts)
            .field("texture", &self.texture.as_ref().map(|t| t.key))
            .field("background", &self.background.as_ref().map(|b| b.key))
            .field("skipped_tris", &self.skipped_tris)
            .finish_non_exhaustive()
    }
}

impl CpuSceneRenderer {
    /// Create a renderer; drawing state is allocated on first use.
    pub fn new(opts: CpuRendererOpts) -> Self {
        Self {
            opts,
            ctx: None,
            pixmap: None,
            texture: None,
            background: None,
            background_uploads: 0,
            tris: Vec::new(),
            skipped_tris: 0,
        }
    }

    /// Renderer options.
    pub fn opts(&self) -> CpuRendererOpts {
        self.opts
    }

    /// Triangles skipped so far (behind the camera, degenerate UVs, bad indices).
    pub fn skipped_triangles(&self) -> u64 {
        self.skipped_tris
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut Self, &mut vello_cpu::RenderContext) -> FaceliftResult<R>,
    ) -> FaceliftResult<R> {
        let mut ctx = match self.ctx.take() {
            None => vello_cpu::RenderContext::new(width, height),
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            Some(_) => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(self, &mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }

    fn take_pixmap(&mut self, width: u16, height: u16) -> vello_cpu::Pixmap {
        match self.pixmap.take() {
            Some(p) if p.width() == width && p.height() == height => p,
            _ => vello_cpu::Pixmap::new(width, height),
        }
    }

    fn texture_paint_for(&mut self, tex: &OverlayTexture) -> FaceliftResult<vello_cpu::Image> {
        if let Some(p) = self.texture.as_ref().filter(|p| p.key == tex.id) {
            return Ok(p.paint.clone());
        }
        let paint = rgba_premul_to_image(&tex.rgba8_premul, tex.width, tex.height)?;
        self.texture = Some(CachedPaint {
            key: tex.id,
            paint: paint.clone(),
        });
        Ok(paint)
    }

    /// A still camera (or a paused feed) hands over the same pixels every tick.
    fn background_paint_for(&mut self, bg: &FrameRGBA) -> FaceliftResult<vello_cpu::Image> {
        let key = bg.fingerprint();
        if let Some(p) = self.background.as_ref().filter(|p| p.key == key) {
            return Ok(p.paint.clone());
        }
        let paint = rgba_premul_to_image(&bg.data, bg.width, bg.height)?;
        self.background_uploads += 1;
        self.background = Some(CachedPaint {
            key,
            paint: paint.clone(),
        });
        Ok(paint)
    }

    fn collect_triangles(
        &mut self,
        draw: &OverlayDraw<'_>,
        projection: &CameraProjection,
        canvas: Canvas,
    ) {
        self.tris.clear();
        let Some(topology) = draw.geometry.topology() else {
            return;
        };
        let positions = draw.geometry.positions();
        let uvs = topology.uvs();
        let tw = f64::from(draw.texture.width);
        let th = f64::from(draw.texture.height);

        let mut skipped = 0u64;
        'tris: for tri in topology.indices() {
            let mut screen = [Point::ZERO; 3];
            let mut texel = [Point::ZERO; 3];
            let mut depth = 0.0f32;
            for (k, &vi) in tri.iter().enumerate() {
                let vi = vi as usize;
                // Positions may be shorter than the topology before the first tracked tick.
                let (Some(&p), Some(&uv)) = (positions.get(vi), uvs.get(vi)) else {
                    skipped += 1;
                    continue 'tris;
                };
                let cam = draw.pose.transform_point(p);
                let Some(s) = projection.project(cam, canvas) else {
                    skipped += 1;
                    continue 'tris;
                };
                screen[k] = s;
                texel[k] = Point::new(f64::from(uv[0]) * tw, (1.0 - f64::from(uv[1])) * th);
                depth += cam.z;
            }
            self.tris.push(ScreenTri {
                depth: depth / 3.0,
                screen,
                texel,
            });
        }
        // Painter's order: farthest (most negative z) first.
        self.tris.sort_by(|a, b| a.depth.total_cmp(&b.depth));
        self.skipped_tris += skipped;
    }

    fn draw_scene(
        &mut self,
        scene: &OverlayScene<'_>,
        view: Affine,
        canvas: Canvas,
        ctx: &mut vello_cpu::RenderContext,
    ) -> FaceliftResult<()> {
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

        if let Some([r, g, b, a]) = self.opts.clear_rgba {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(canvas.width),
                f64::from(canvas.height),
            ));
        }

        if let Some(bg) = scene.background
            && bg.width > 0
            && bg.height > 0
        {
            let img = self.background_paint_for(bg)?;
            let fit = cover_transform(bg.width, bg.height, canvas);
            ctx.set_transform(affine_to_cpu(view * fit));
            ctx.set_paint(img);
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(bg.width),
                f64::from(bg.height),
            ));
        }

        let Some(draw) = scene.overlay else {
            return Ok(());
        };
        if self.tris.is_empty() {
            return Ok(());
        }
        let paint = self.texture_paint_for(draw.texture)?;
        ctx.set_transform(affine_to_cpu(view));
        ctx.set_paint(paint);

        let mut degenerate = 0u64;
        for tri in &self.tris {
            let Some(uv_to_screen) = triangle_affine(tri.texel, tri.screen) else {
                degenerate += 1;
                continue;
            };
            ctx.set_paint_transform(affine_to_cpu(uv_to_screen));
            let mut path = vello_cpu::kurbo::BezPath::new();
            path.move_to(point_to_cpu(tri.screen[0]));
            path.line_to(point_to_cpu(tri.screen[1]));
            path.line_to(point_to_cpu(tri.screen[2]));
            path.close_path();
            ctx.fill_path(&path);
        }
        self.skipped_tris += degenerate;
        Ok(())
    }
}

impl Default for CpuSceneRenderer {
    fn default() -> Self {
        Self::new(CpuRendererOpts::default())
    }
}

impl SceneRenderer for CpuSceneRenderer {
    fn render(
        &mut self,
        scene: &OverlayScene<'_>,
        projection: &CameraProjection,
        target: &mut FrameRGBA,
    ) -> FaceliftResult<()> {
        let canvas = target.canvas();
        let w: u16 = canvas
            .width
            .try_into()
            .map_err(|_| FaceliftError::render("target width exceeds u16"))?;
        let h: u16 = canvas
            .height
            .try_into()
            .map_err(|_| FaceliftError::render("target height exceeds u16"))?;
        if target.data.len() != canvas.rgba8_len() {
            return Err(FaceliftError::render("target byte len mismatch"));
        }

        match scene.overlay.as_ref() {
            Some(draw) => self.collect_triangles(draw, projection, canvas),
            None => self.tris.clear(),
        }

        let view = if self.opts.mirror {
            Affine::new([-1.0, 0.0, 0.0, 1.0, f64::from(canvas.width), 0.0])
        } else {
            Affine::IDENTITY
        };

        let mut pixmap = self.take_pixmap(w, h);
        clear_pixmap_to_transparent(&mut pixmap);

        let res = self.with_ctx_mut(w, h, |this, ctx| {
            this.draw_scene(scene, view, canvas, ctx)?;
            ctx.flush();
            ctx.render_to_pixmap(&mut pixmap);
            Ok(())
        });
        if res.is_ok() {
            target.data.copy_from_slice(pixmap.data_as_u8_slice());
        }
        self.pixmap = Some(pixmap);
        res
    }
}

/// Scale `src` to fill `canvas`, preserving aspect ratio and cropping the overflow.
fn cover_transform(src_w: u32, src_h: u32, canvas: Canvas) -> Affine {
    let sw = f64::from(src_w);
    let sh = f64::from(src_h);
    let cw = f64::from(canvas.width);
    let ch = f64::from(canvas.height);
    let s = (cw / sw).max(ch / sh);
    Affine::translate(((cw - sw * s) * 0.5, (ch - sh * s) * 0.5)) * Affine::scale(s)
}

/// Affine map taking the three `from` points onto the three `to` points.
///
/// Returns `None` when `from` is degenerate (zero area).
fn triangle_affine(from: [Point; 3], to: [Point; 3]) -> Option<Affine> {
    let f1 = from[1] - from[0];
    let f2 = from[2] - from[0];
    let det = f1.x * f2.y - f2.x * f1.y;
    if det.abs() < 1e-9 {
        return None;
    }
    let t1 = to[1] - to[0];
    let t2 = to[2] - to[0];

    // Linear part L = T * F^-1 where F = [f1 f2], T = [t1 t2] (columns).
    let inv = 1.0 / det;
    let fi = [f2.y * inv, -f1.y * inv, -f2.x * inv, f1.x * inv];
    let a = t1.x * fi[0] + t2.x * fi[1];
    let b = t1.y * fi[0] + t2.y * fi[1];
    let c = t1.x * fi[2] + t2.x * fi[3];
    let d = t1.y * fi[2] + t2.y * fi[3];
    let linear = Affine::new([a, b, c, d, 0.0, 0.0]);
    let offset = to[0].to_vec2() - (linear * from[0]).to_vec2();
    Some(Affine::translate(offset) * linear)
}

fn clear_pixmap_to_transparent(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn pixmap_from_premul_bytes(
    bytes: &[u8],
    width: u32,
    height: u32,
) -> FaceliftResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| FaceliftError::render("pixmap width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| FaceliftError::render("pixmap height exceeds u16"))?;
    if bytes.len()
        != (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(4)
    {
        return Err(FaceliftError::render("pixmap byte len mismatch"));
    }
    // Pixmap stores PremulRgba8; our bytes are already premultiplied.
    let mut pixels = Vec::<vello_cpu::peniko::color::PremulRgba8>::with_capacity(
        (width as usize) * (height as usize),
    );
    for px in bytes.chunks_exact(4) {
        pixels.push(vello_cpu::peniko::color::PremulRgba8::from_u8_array([
            px[0], px[1], px[2], px[3],
        ]));
    }
    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels, w, h, true,
    ))
}

fn rgba_premul_to_image(
    bytes_premul: &[u8],
    width: u32,
    height: u32,
) -> FaceliftResult<vello_cpu::Image> {
    let pixmap = pixmap_from_premul_bytes(bytes_premul, width, height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
