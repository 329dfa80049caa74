use super::*;
use crate::foundation::core::Vec3;
use crate::mesh::geometry::{MeshTopology, OverlayGeometry};
use crate::tracking::state::PoseTransform;

const CANVAS: Canvas = Canvas {
    width: 8,
    height: 8,
};

fn solid_texture(px: [u8; 4]) -> OverlayTexture {
    OverlayTexture::from_premul(2, 2, px.repeat(4))
}

fn quad_geometry(z: f32) -> OverlayGeometry {
    let topology = MeshTopology::new(
        vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        vec![[0, 1, 2], [0, 2, 3]],
    )
    .unwrap();
    let mut g = OverlayGeometry::with_topology(Arc::new(topology));
    g.rewrite_positions(&[
        Vec3::new(-0.1, -0.1, z),
        Vec3::new(0.1, -0.1, z),
        Vec3::new(0.1, 0.1, z),
        Vec3::new(-0.1, 0.1, z),
    ]);
    g
}

#[test]
fn triangle_affine_maps_vertices() {
    let from = [
        Point::new(0.0, 0.0),
        Point::new(2.0, 0.0),
        Point::new(0.0, 4.0),
    ];
    let to = [
        Point::new(10.0, 10.0),
        Point::new(10.0, 12.0),
        Point::new(6.0, 10.0),
    ];
    let a = triangle_affine(from, to).unwrap();
    for (f, t) in from.iter().zip(to.iter()) {
        let p = a * *f;
        assert!((p - *t).hypot() < 1e-9, "{p:?} != {t:?}");
    }
    assert!(triangle_affine([Point::ZERO; 3], to).is_none());
}

#[test]
fn cover_transform_fills_canvas() {
    let a = cover_transform(2, 1, CANVAS);
    let tl = a * Point::new(0.0, 0.0);
    let br = a * Point::new(2.0, 1.0);
    assert!(tl.x <= 0.0 && tl.y <= 0.0);
    assert!(br.x >= 8.0 && br.y >= 8.0);
    assert!((tl.y - 0.0).abs() < 1e-9);
}

#[test]
fn clear_color_fills_empty_scene() {
    let opts = CpuRendererOpts::default().with_clear_rgba(Some([0, 0, 255, 255]));
    let mut r = CpuSceneRenderer::new(opts);
    let mut target = FrameRGBA::new_transparent(CANVAS);
    r.render(
        &OverlayScene::default(),
        &CameraProjection::default(),
        &mut target,
    )
    .unwrap();
    assert_eq!(target.pixel(0, 0), Some([0, 0, 255, 255]));
    assert_eq!(target.pixel(7, 7), Some([0, 0, 255, 255]));
}

#[test]
fn background_covers_canvas() {
    let mut r = CpuSceneRenderer::default();
    let bg = FrameRGBA::filled(
        Canvas {
            width: 4,
            height: 2,
        },
        [255, 0, 0, 255],
    );
    let mut target = FrameRGBA::new_transparent(CANVAS);
    let scene = OverlayScene {
        background: Some(&bg),
        overlay: None,
    };
    r.render(&scene, &CameraProjection::default(), &mut target)
        .unwrap();
    assert_eq!(target.pixel(4, 4), Some([255, 0, 0, 255]));
    assert_eq!(target.pixel(0, 7), Some([255, 0, 0, 255]));
}

#[test]
fn unchanged_background_is_converted_once() {
    let mut r = CpuSceneRenderer::default();
    let red = FrameRGBA::filled(
        Canvas {
            width: 4,
            height: 2,
        },
        [255, 0, 0, 255],
    );
    let blue = FrameRGBA::filled(
        Canvas {
            width: 4,
            height: 2,
        },
        [0, 0, 255, 255],
    );
    let mut target = FrameRGBA::new_transparent(CANVAS);
    for bg in [&red, &red, &red] {
        let scene = OverlayScene {
            background: Some(bg),
            overlay: None,
        };
        r.render(&scene, &CameraProjection::default(), &mut target)
            .unwrap();
    }
    assert_eq!(r.background_uploads, 1);

    let scene = OverlayScene {
        background: Some(&blue),
        overlay: None,
    };
    r.render(&scene, &CameraProjection::default(), &mut target)
        .unwrap();
    assert_eq!(r.background_uploads, 2);
    assert_eq!(target.pixel(4, 4), Some([0, 0, 255, 255]));
}

#[test]
fn mirror_flips_background() {
    // Left column red, right column blue.
    let bg = FrameRGBA::from_premul(
        2,
        2,
        [[255, 0, 0, 255], [0, 0, 255, 255], [255, 0, 0, 255], [0, 0, 255, 255]].concat(),
    )
    .unwrap();
    let scene = OverlayScene {
        background: Some(&bg),
        overlay: None,
    };

    let mut plain = FrameRGBA::new_transparent(CANVAS);
    CpuSceneRenderer::default()
        .render(&scene, &CameraProjection::default(), &mut plain)
        .unwrap();
    let mut mirrored = FrameRGBA::new_transparent(CANVAS);
    CpuSceneRenderer::new(CpuRendererOpts::default().with_mirror(true))
        .render(&scene, &CameraProjection::default(), &mut mirrored)
        .unwrap();

    assert_eq!(plain.pixel(1, 4), Some([255, 0, 0, 255]));
    assert_eq!(mirrored.pixel(1, 4), Some([0, 0, 255, 255]));
}

#[test]
fn overlay_is_drawn_over_background() {
    let bg = FrameRGBA::filled(CANVAS, [255, 0, 0, 255]);
    let tex = solid_texture([0, 255, 0, 255]);
    let geometry = quad_geometry(-1.0);
    let scene = OverlayScene {
        background: Some(&bg),
        overlay: Some(OverlayDraw {
            geometry: &geometry,
            texture: &tex,
            pose: PoseTransform::IDENTITY,
        }),
    };
    let mut r = CpuSceneRenderer::default();
    let mut target = FrameRGBA::new_transparent(CANVAS);
    r.render(&scene, &CameraProjection::default(), &mut target)
        .unwrap();
    // Away from the diagonal seam between the two triangles.
    assert_eq!(target.pixel(1, 1), Some([0, 255, 0, 255]));
    assert_eq!(target.pixel(6, 6), Some([0, 255, 0, 255]));
    assert_eq!(r.skipped_triangles(), 0);
}

#[test]
fn overlay_behind_camera_is_skipped() {
    let tex = solid_texture([0, 255, 0, 255]);
    let geometry = quad_geometry(1.0);
    let scene = OverlayScene {
        background: None,
        overlay: Some(OverlayDraw {
            geometry: &geometry,
            texture: &tex,
            pose: PoseTransform::IDENTITY,
        }),
    };
    let mut r = CpuSceneRenderer::default();
    let mut target = FrameRGBA::filled(CANVAS, [1, 1, 1, 1]);
    r.render(&scene, &CameraProjection::default(), &mut target)
        .unwrap();
    assert!(target.data.iter().all(|&b| b == 0));
    assert_eq!(r.skipped_triangles(), 2);
}

#[test]
fn geometry_without_positions_draws_nothing() {
    let tex = solid_texture([0, 255, 0, 255]);
    let topology = MeshTopology::new(vec![[0.0, 0.0]; 3], vec![[0, 1, 2]]).unwrap();
    let geometry = OverlayGeometry::with_topology(Arc::new(topology));
    let scene = OverlayScene {
        background: None,
        overlay: Some(OverlayDraw {
            geometry: &geometry,
            texture: &tex,
            pose: PoseTransform::IDENTITY,
        }),
    };
    let mut target = FrameRGBA::new_transparent(CANVAS);
    CpuSceneRenderer::default()
        .render(&scene, &CameraProjection::default(), &mut target)
        .unwrap();
    assert!(target.data.iter().all(|&b| b == 0));
}
