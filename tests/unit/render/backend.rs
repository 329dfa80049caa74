use super::*;

#[test]
fn pixel_reads_are_bounds_checked() {
    let mut f = FrameRGBA::new_transparent(Canvas {
        width: 2,
        height: 2,
    });
    f.data[(1 * 2 + 1) * 4..].copy_from_slice(&[1, 2, 3, 4]);
    assert_eq!(f.pixel(1, 1), Some([1, 2, 3, 4]));
    assert_eq!(f.pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(f.pixel(2, 0), None);
}

#[test]
fn fingerprint_covers_dimensions_and_pixels() {
    let a = FrameRGBA::filled(
        Canvas {
            width: 4,
            height: 1,
        },
        [9, 9, 9, 255],
    );
    let b = FrameRGBA::filled(
        Canvas {
            width: 1,
            height: 4,
        },
        [9, 9, 9, 255],
    );
    assert_eq!(a.data, b.data);
    assert_ne!(a.fingerprint(), b.fingerprint());
    assert_eq!(a.fingerprint(), a.clone().fingerprint());
}

#[test]
fn from_premul_checks_length() {
    assert!(FrameRGBA::from_premul(2, 2, vec![0; 15]).is_err());
    let f = FrameRGBA::from_premul(2, 2, vec![0; 16]).unwrap();
    assert_eq!(f.canvas(), Canvas { width: 2, height: 2 });
}
