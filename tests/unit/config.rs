use super::*;
use crate::record::recorder::RecordingFormat;

#[test]
fn empty_document_uses_defaults() {
    let cfg = AppConfig::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(cfg, AppConfig::default());
    assert_eq!(cfg.landmark_count, 478);
    cfg.validate().unwrap();
}

#[test]
fn parses_full_document() {
    let json = r#"{
        "canvas": {"width": 320, "height": 240},
        "fps": {"num": 30, "den": 1},
        "landmark_count": 468,
        "projection": {"focal_px": 500.0},
        "mirror": true,
        "clear_rgba": null,
        "tracking": {"loss_grace_ticks": 3},
        "recorder": {"format": "png", "channel_capacity": 2, "out_path": "out/shot.png"},
        "assets": {"mesh": "mesh.json", "texture": "face.png"}
    }"#;
    let cfg = AppConfig::from_reader(json.as_bytes()).unwrap();
    cfg.validate().unwrap();
    assert_eq!(cfg.canvas.width, 320);
    assert_eq!(cfg.fps.num, 30);
    assert_eq!(cfg.landmark_count, 468);
    assert_eq!(cfg.projection.focal_px, 500.0);
    assert_eq!(cfg.projection.near, CameraProjection::default().near);
    assert!(cfg.mirror);
    assert_eq!(cfg.clear_rgba, None);
    assert_eq!(cfg.tracking.loss_grace_ticks, 3);
    assert_eq!(cfg.recorder.format, RecordingFormat::Png);
    assert_eq!(cfg.recorder.channel_capacity, 2);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = AppConfig::from_reader(r#"{"canvass": {}}"#.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("canvass"));
}

#[test]
fn validate_catches_bad_values() {
    let mut cfg = AppConfig::default();
    cfg.fps.den = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = AppConfig::default();
    cfg.canvas.width = 70_000;
    assert!(cfg.validate().is_err());

    let mut cfg = AppConfig::default();
    cfg.landmark_count = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn asset_paths_resolve_against_config_dir() {
    let dir = std::env::temp_dir().join(format!("facelift-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("app.json");
    std::fs::write(
        &path,
        r#"{"assets": {"mesh": "m.json", "texture": "t.png"}}"#,
    )
    .unwrap();
    let cfg = AppConfig::from_path(&path).unwrap();
    let assets = cfg.resolved_assets().unwrap();
    assert_eq!(assets.mesh, dir.join("m.json"));
    assert_eq!(assets.texture, dir.join("t.png"));
}

#[test]
fn missing_file_is_a_validation_error() {
    let err = AppConfig::from_path("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, FaceliftError::Validation(_)));
}
