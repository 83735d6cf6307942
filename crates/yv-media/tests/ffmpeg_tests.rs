//! FFmpeg integration tests. Need `ffmpeg` and `ffprobe` on PATH.

use std::path::Path;
use std::process::Stdio;

use yv_media::{FfmpegToolkit, MediaConfig, MediaToolkit};

/// Render a 6 second test pattern, optionally with a sine tone.
async fn render_sample(path: &Path, with_audio: bool) {
    let mut args: Vec<String> = vec![
        "-y".into(),
        "-v".into(),
        "error".into(),
        "-f".into(),
        "lavfi".into(),
        "-i".into(),
        "testsrc=size=321x241:rate=25:duration=6".into(),
    ];
    if with_audio {
        args.extend(
            ["-f", "lavfi", "-i", "sine=frequency=440:duration=6"]
                .iter()
                .map(|s| s.to_string()),
        );
    }
    args.push(path.to_string_lossy().to_string());

    let status = tokio::process::Command::new("ffmpeg")
        .args(&args)
        .stdin(Stdio::null())
        .status()
        .await
        .expect("Failed to run ffmpeg");
    assert!(status.success());
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_full_derivation_chain() {
    let dir = tempfile::tempdir().unwrap();
    let raw = dir.path().join("sample_raw.mkv");
    render_sample(&raw, true).await;

    let toolkit = FfmpegToolkit::new(MediaConfig::default());
    let mp4 = dir.path().join("sample.mp4");
    toolkit.transcode(&raw, &mp4).await.expect("transcode");

    let duration = toolkit.probe_duration(&mp4).await.expect("probe");
    assert!((duration - 6.0).abs() < 0.5, "duration was {duration}");

    let gif = dir.path().join("sample_preview.gif");
    toolkit.preview(&mp4, &gif).await.expect("preview");
    assert!(gif.metadata().unwrap().len() > 0);

    let mp3 = dir.path().join("sample.mp3");
    toolkit.extract_audio(&mp4, &mp3).await.expect("audio");

    let jpg = dir.path().join("sample_thumb.jpg");
    toolkit.thumbnail(&mp4, &jpg).await.expect("thumbnail");
    assert!(jpg.exists());
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_audio_extraction_fails_without_audio() {
    let dir = tempfile::tempdir().unwrap();
    let silent = dir.path().join("silent.mp4");
    render_sample(&silent, false).await;

    let toolkit = FfmpegToolkit::default();
    let mp3 = dir.path().join("silent.mp3");
    assert!(toolkit.extract_audio(&silent, &mp3).await.is_err());
}

#[tokio::test]
#[ignore = "requires ffmpeg"]
async fn test_transcode_rejects_garbage() {
    let dir = tempfile::tempdir().unwrap();
    let junk = dir.path().join("junk.avi");
    tokio::fs::write(&junk, b"not a video at all").await.unwrap();

    let toolkit = FfmpegToolkit::default();
    let err = toolkit
        .transcode(&junk, &dir.path().join("junk.mp4"))
        .await
        .unwrap_err();
    assert!(matches!(err, yv_media::MediaError::Encode { .. }));
}
