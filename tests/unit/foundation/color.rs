use super::*;

#[test]
fn parses_hex_and_names() {
    assert_eq!(Rgb8::parse("#FF8000").unwrap(), Rgb8::new(255, 128, 0));
    assert_eq!(Rgb8::parse("ff8000").unwrap(), Rgb8::new(255, 128, 0));
    assert_eq!(Rgb8::parse("#fff").unwrap(), Rgb8::WHITE);
    assert_eq!(Rgb8::parse("White").unwrap(), Rgb8::WHITE);
    assert_eq!(Rgb8::parse("green").unwrap(), Rgb8::new(0, 128, 0));
}

#[test]
fn bad_hex_is_effect_error() {
    for bad in ["#12345", "#GGGGGG", "", "#ff00ff00", "not-a-colour"] {
        let err = Rgb8::parse(bad).unwrap_err();
        assert!(matches!(err, LyricError::Effect(_)), "{bad}: {err}");
    }
}

#[test]
fn complement_is_bitwise() {
    assert_eq!(Rgb8::new(255, 0, 0).complement(), Rgb8::new(0, 255, 255));
    assert_eq!(Rgb8::new(10, 20, 30).complement(), Rgb8::new(245, 235, 225));
}

#[test]
fn hsv_primaries_truncate() {
    assert_eq!(Rgb8::from_hsv(0.0, 1.0, 1.0), Rgb8::new(255, 0, 0));
    assert_eq!(Rgb8::from_hsv(1.0 / 3.0, 1.0, 1.0).g, 255);
    assert_eq!(Rgb8::from_hsv(2.0 / 3.0, 1.0, 1.0).b, 255);
    // h = 0.05 -> f = 0.3, t = 0.3 -> int(76.5) = 76
    assert_eq!(Rgb8::from_hsv(0.05, 1.0, 1.0), Rgb8::new(255, 76, 0));
}

#[test]
fn serde_uses_hex_strings() {
    let c: Rgb8 = serde_json::from_str("\"#00ff00\"").unwrap();
    assert_eq!(c, Rgb8::new(0, 255, 0));
    assert_eq!(serde_json::to_string(&c).unwrap(), "\"#00ff00\"");
    assert!(serde_json::from_str::<Rgb8>("\"#zz\"").is_err());
}
