use super::*;

#[test]
fn frame_range_validation_and_len() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(4)).is_err());
    let r = FrameRange::new(FrameIndex(2), FrameIndex(7)).unwrap();
    assert_eq!(r.len_frames(), 5);
    assert!(r.contains(FrameIndex(2)));
    assert!(!r.contains(FrameIndex(7)));
}

#[test]
fn frame_range_chunks_cover_range_in_order() {
    let r = FrameRange::new(FrameIndex(0), FrameIndex(10)).unwrap();
    let chunks: Vec<_> = r.chunks(4).map(|c| (c.start.0, c.end.0)).collect();
    assert_eq!(chunks, vec![(0, 4), (4, 8), (8, 10)]);
}

#[test]
fn fps_rejects_zero_and_floors_seconds() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
    assert_eq!(Fps::LYRIC.secs_to_frames_floor(2.99), 89);
    assert_eq!(Fps::LYRIC.secs_to_frames_floor(-1.0), 0);
    assert!((Fps::LYRIC.frames_to_secs(45) - 1.5).abs() < 1e-12);
}

#[test]
fn resolution_transpose() {
    let r = Resolution::new(1920, 1080);
    assert_eq!(r.transposed(), Resolution::new(1080, 1920));
    assert_eq!(r.to_string(), "1920x1080");
}
