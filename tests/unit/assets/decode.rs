use std::io::Cursor;

use super::*;

fn png(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_texture_premultiplies() {
    let tex = decode_texture(&png(1, 1, [100, 50, 200, 128])).unwrap();
    assert_eq!((tex.width, tex.height), (1, 1));
    assert_eq!(
        tex.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn texture_id_follows_content() {
    let a = decode_texture(&png(2, 2, [1, 2, 3, 255])).unwrap();
    let b = decode_texture(&png(2, 2, [1, 2, 3, 255])).unwrap();
    let c = decode_texture(&png(2, 2, [3, 2, 1, 255])).unwrap();
    assert_eq!(a.id, b.id);
    assert_ne!(a.id, c.id);
}

#[test]
fn decode_camera_frame_dimensions() {
    let f = decode_camera_frame(&png(3, 2, [10, 20, 30, 255])).unwrap();
    assert_eq!((f.width, f.height), (3, 2));
    assert_eq!(f.pixel(2, 1), Some([10, 20, 30, 255]));
}

#[test]
fn garbage_bytes_fail_to_decode() {
    assert!(decode_texture(b"not an image").is_err());
}
