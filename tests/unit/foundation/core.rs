use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    let fps = Fps::new(60, 1).unwrap();
    assert!((fps.frame_duration_secs() - 1.0 / 60.0).abs() < 1e-12);
}

#[test]
fn canvas_validate_bounds() {
    assert!(Canvas { width: 0, height: 4 }.validate().is_err());
    assert!(
        Canvas {
            width: 70_000,
            height: 4
        }
        .validate()
        .is_err()
    );
    let c = Canvas {
        width: 4,
        height: 2,
    };
    c.validate().unwrap();
    assert_eq!(c.rgba8_len(), 32);
}

#[test]
fn vec3_json_is_a_plain_triple() {
    let v: Vec3 = serde_json::from_str("[1.0, -2.5, 3.0]").unwrap();
    assert_eq!(v, Vec3::new(1.0, -2.5, 3.0));
    assert_eq!(serde_json::to_string(&v).unwrap(), "[1.0,-2.5,3.0]");
}

#[test]
fn tick_index_next_saturates() {
    assert_eq!(TickIndex(3).next(), TickIndex(4));
    assert_eq!(TickIndex(u64::MAX).next(), TickIndex(u64::MAX));
}
