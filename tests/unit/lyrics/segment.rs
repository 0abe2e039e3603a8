use super::*;

#[test]
fn validate_bounds() {
    LyricSegment::new("ok", 0.0, 0.1).validate().unwrap();
    assert!(LyricSegment::new("neg", -0.1, 1.0).validate().is_err());
    assert!(LyricSegment::new("empty", 1.0, 1.0).validate().is_err());
    assert!(LyricSegment::new("nan", f64::NAN, 1.0).validate().is_err());
}

#[test]
fn batch_validation_names_position() {
    let segs = vec![
        LyricSegment::new("a", 0.0, 1.0),
        LyricSegment::new("b", 2.0, 1.5),
    ];
    let err = validate_segments(&segs).unwrap_err();
    assert!(err.to_string().contains("segment #2"));
}
