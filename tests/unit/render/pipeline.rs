use super::*;

#[test]
fn threading_defaults_and_partial_json() {
    let t = RenderThreading::default();
    assert!(t.parallel);
    assert_eq!(t.chunk_size, 64);
    assert!(t.static_frame_elision);

    let t: RenderThreading = serde_json::from_str(r#"{"chunkSize": 8, "threads": 2}"#).unwrap();
    assert_eq!(t.chunk_size, 8);
    assert_eq!(t.threads, Some(2));
    assert!(t.parallel);
}

#[test]
fn staging_path_is_hidden_sibling() {
    let p = staging_path(Path::new("out/song_lyric_video.mp4")).unwrap();
    assert_eq!(p, PathBuf::from("out/.song_lyric_video.mp4.partial"));
    assert!(staging_path(Path::new("/")).is_err());
}

#[test]
fn zero_threads_is_rejected() {
    assert!(matches!(build_thread_pool(Some(0)), Err(LyricError::Config(_))));
    assert!(build_thread_pool(Some(1)).is_ok());
}

#[test]
fn chunk_size_is_at_least_one() {
    assert_eq!(normalized_chunk_size(0), 1);
    assert_eq!(normalized_chunk_size(16), 16);
}

#[test]
fn temp_guard_removes_file_unless_disarmed() {
    let dir = tempfile::tempdir().unwrap();
    let kept = dir.path().join("kept");
    let dropped = dir.path().join("dropped");
    std::fs::write(&kept, b"x").unwrap();
    std::fs::write(&dropped, b"x").unwrap();

    drop(TempFileGuard(Some(dropped.clone())));
    let mut guard = TempFileGuard(Some(kept.clone()));
    guard.0 = None;
    drop(guard);

    assert!(!dropped.exists());
    assert!(kept.exists());
}
