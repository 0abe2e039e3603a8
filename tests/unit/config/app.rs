use super::*;

#[test]
fn partial_file_fills_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lyricframe.json");
    std::fs::write(
        &path,
        r#"{"quality": "720p", "aspect": "portrait", "style": {"effectName": "shake"}, "render": {"parallel": true}}"#,
    )
    .unwrap();

    let cfg = AppConfig::load(&path).unwrap();
    assert_eq!(cfg.quality, QualityTier::P720);
    assert_eq!(cfg.aspect, AspectRatio::Portrait);
    assert_eq!(cfg.style.effect_name, "shake");
    assert_eq!(cfg.style.font_size_px, 70.0);
    assert!(cfg.render.parallel);
    assert_eq!(cfg.render.chunk_size, RenderThreading::default().chunk_size);
    assert_eq!(cfg.folders.output, PathBuf::from("output"));
    assert_eq!(cfg.logging.level, "info");
    cfg.validate().unwrap();
}

#[test]
fn missing_or_malformed_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    let err = AppConfig::load(&missing).unwrap_err();
    assert!(matches!(err, LyricError::Config(_)));
    assert!(err.to_string().contains("nope.json"));

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "{ not json").unwrap();
    assert!(matches!(AppConfig::load(&bad), Err(LyricError::Config(_))));
}

#[test]
fn validate_reports_missing_audio_folder() {
    let cfg = AppConfig {
        folders: FolderConfig {
            audio: Some(PathBuf::from("/definitely/not/here")),
            ..FolderConfig::default()
        },
        ..AppConfig::default()
    };
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here"));
}
