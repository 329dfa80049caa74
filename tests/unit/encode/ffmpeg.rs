use super::*;

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn begin_rejects_odd_sizes() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("unused.mp4"));
    let err = sink
        .begin(SinkConfig {
            width: 3,
            height: 2,
            fps: Fps::default(),
        })
        .unwrap_err();
    assert!(err.to_string().contains("even"));
}

#[test]
fn stop_without_frames_never_spawns_ffmpeg() {
    let out = std::env::temp_dir().join(format!("facelift-ffmpeg-{}.mp4", std::process::id()));
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new(&out));
    sink.begin(SinkConfig {
        width: 2,
        height: 2,
        fps: Fps::default(),
    })
    .unwrap();
    assert!(matches!(sink.end().unwrap(), RecordingArtifact::Empty));
    assert!(!out.exists());
}

#[cfg(target_os = "linux")]
#[test]
fn encoder_that_exits_early_is_reaped() {
    use std::os::unix::fs::PermissionsExt as _;

    let dir = std::env::temp_dir().join(format!("facelift-ffmpeg-exit-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let program = dir.join("ffmpeg");
    std::fs::write(&program, "#!/bin/sh\nexit 1\n").unwrap();
    std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755)).unwrap();

    let mut opts = FfmpegSinkOpts::new(dir.join("out.mp4"));
    opts.program = program;
    let mut sink = FfmpegSink::new(opts);
    let cfg = SinkConfig {
        width: 512,
        height: 512,
        fps: Fps::default(),
    };
    sink.begin(cfg).unwrap();
    let frame = Arc::new(FrameRGBA::filled(
        crate::foundation::core::Canvas {
            width: 512,
            height: 512,
        },
        [0, 0, 0, 255],
    ));

    let mut failed = false;
    let mut pid = None;
    for i in 0..8 {
        let res = sink.push_frame(TickIndex(i), frame.clone());
        pid = pid.or(sink.child.as_ref().map(|c| c.id()));
        if res.is_err() {
            failed = true;
            break;
        }
    }
    assert!(failed, "writes to an exited encoder must fail");
    let pid = pid.unwrap();

    drop(sink);
    // A reaped child no longer has a /proc entry; a zombie would.
    assert!(!std::path::Path::new(&format!("/proc/{pid}")).exists());
    let _ = std::fs::remove_dir_all(&dir);
}
