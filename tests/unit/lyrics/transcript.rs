use super::*;

#[test]
fn loads_srt_and_both_json_shapes_keyed_by_stem() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("song1.srt"),
        "1\n00:00:00,500 --> 00:00:02,000\nhello\n\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("song2.json"),
        r#"[{"text": "a", "start": 0.0, "end": 1.0}]"#,
    )
    .unwrap();
    std::fs::write(
        dir.path().join("song3.json"),
        r#"{"language": "id", "segments": [{"id": 0, "text": "b", "start": 1.0, "end": 2.0}]}"#,
    )
    .unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let t = load_transcripts(dir.path()).unwrap();
    assert_eq!(
        t.keys().cloned().collect::<Vec<_>>(),
        vec!["song1", "song2", "song3"]
    );
    assert_eq!(t["song1"], vec![LyricSegment::new("hello", 0.5, 2.0)]);
    assert_eq!(t["song2"][0].text, "a");
    assert_eq!(t["song3"][0], LyricSegment::new("b", 1.0, 2.0));
}

#[test]
fn json_beats_srt_for_the_same_stem() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("track.srt"),
        "1\n00:00:00,000 --> 00:00:01,000\nfrom srt\n\n",
    )
    .unwrap();
    save_transcript_json(
        &[LyricSegment::new("from json", 0.0, 1.0)],
        &dir.path().join("track.json"),
    )
    .unwrap();
    let t = load_transcripts(dir.path()).unwrap();
    assert_eq!(t["track"][0].text, "from json");
}

#[test]
fn unreadable_inputs_name_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("broken.json");
    std::fs::write(&bad, "{oops").unwrap();
    let err = load_transcript(&bad).unwrap_err();
    assert!(matches!(err, LyricError::Asset(_)));
    assert!(err.to_string().contains("broken.json"));

    let err = load_transcripts(&dir.path().join("missing")).unwrap_err();
    assert!(matches!(err, LyricError::Config(_)));
}

#[test]
fn a_broken_file_is_left_out_of_the_folder() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("good.srt"),
        "1\n00:00:01,000 --> 00:00:02,000\nstays\n\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("bad.srt"),
        "1\n00:00:01 -> later\nlost\n\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("worse.json"), "{not json").unwrap();

    let t = load_transcripts(dir.path()).unwrap();
    assert_eq!(t.keys().cloned().collect::<Vec<_>>(), vec!["good"]);
    assert_eq!(t["good"], vec![LyricSegment::new("stays", 1.0, 2.0)]);
}

#[test]
fn a_broken_json_keeps_the_srt_of_the_same_stem() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("track.srt"),
        "1\n00:00:00,000 --> 00:00:01,000\nfrom srt\n\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("track.json"), "[{").unwrap();
    let t = load_transcripts(dir.path()).unwrap();
    assert_eq!(t["track"][0].text, "from srt");
}
