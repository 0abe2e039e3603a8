use std::path::PathBuf;

use super::*;
use crate::config::preset::{AspectRatio, OutputPreset, QualityTier};

fn args_of(audio: Option<&str>) -> Vec<String> {
    let cfg = SinkConfig {
        preset: OutputPreset::new(AspectRatio::Landscape, QualityTier::P1080),
        audio: audio.map(PathBuf::from),
        out_path: PathBuf::from("out/song.partial.mp4"),
    };
    ffmpeg_args(&cfg, true)
        .into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

fn value_after(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1).cloned())
}

#[test]
fn args_encode_h264_at_tier_bitrate() {
    let args = args_of(Some("song.mp3"));
    assert_eq!(args.first().map(String::as_str), Some("-y"));
    assert_eq!(value_after(&args, "-s").as_deref(), Some("1920x1080"));
    assert_eq!(value_after(&args, "-r").as_deref(), Some("30/1"));
    assert_eq!(value_after(&args, "-c:v").as_deref(), Some("libx264"));
    assert_eq!(value_after(&args, "-preset").as_deref(), Some("medium"));
    assert_eq!(value_after(&args, "-b:v").as_deref(), Some("8000k"));
    assert_eq!(value_after(&args, "-c:a").as_deref(), Some("aac"));
    assert_eq!(value_after(&args, "-b:a").as_deref(), Some("320k"));
    assert!(args.iter().any(|a| a == "-shortest"));
    assert_eq!(value_after(&args, "-movflags").as_deref(), Some("+faststart"));
    assert_eq!(args.last().map(String::as_str), Some("out/song.partial.mp4"));
}

#[test]
fn args_without_audio_disable_audio_track() {
    let args = args_of(None);
    assert!(args.iter().any(|a| a == "-an"));
    assert!(!args.iter().any(|a| a == "-shortest"));
    assert!(value_after(&args, "-c:a").is_none());
}

#[test]
fn begin_rejects_odd_dimensions() {
    let mut preset = OutputPreset::new(AspectRatio::Landscape, QualityTier::P720);
    preset.resolution = crate::foundation::core::Resolution::new(641, 360);
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::default());
    let err = sink
        .begin(SinkConfig {
            preset,
            audio: None,
            out_path: PathBuf::from("never.mp4"),
        })
        .unwrap_err();
    assert!(matches!(err, LyricError::Render(_)));
}

#[test]
fn push_before_begin_is_an_error() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::default());
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
        premultiplied: true,
    };
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
}
