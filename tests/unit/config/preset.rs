use super::*;

#[test]
fn four_k_maps_to_uhd_and_20000_kbps() {
    let preset = OutputPreset::new(AspectRatio::Landscape, QualityTier::parse_or_default("4K"));
    assert_eq!(preset.resolution, Resolution::new(3840, 2160));
    assert_eq!(preset.video_bitrate_kbps, 20000);
    assert_eq!(preset.audio_bitrate_kbps, 320);
    assert_eq!(preset.fps, Fps::LYRIC);
}

#[test]
fn unknown_tier_falls_back_to_1080p() {
    let tier = QualityTier::parse_or_default("8K-ultra");
    assert_eq!(tier, QualityTier::P1080);
    assert_eq!(tier.resolution(), Resolution::new(1920, 1080));
    assert_eq!(tier.video_bitrate_kbps(), 8000);
}

#[test]
fn tier_table() {
    assert_eq!(
        QualityTier::parse_or_default("720p").resolution(),
        Resolution::new(1280, 720)
    );
    assert_eq!(QualityTier::P720.video_bitrate_kbps(), 4000);
    assert_eq!(QualityTier::parse_or_default("1080p"), QualityTier::P1080);
}

#[test]
fn portrait_transposes_tier_resolution() {
    assert_eq!(
        AspectRatio::Portrait.resolution(QualityTier::P1080),
        Resolution::new(1080, 1920)
    );
    assert_eq!(
        AspectRatio::Portrait.resolution(QualityTier::P720),
        Resolution::new(720, 1280)
    );
}

#[test]
fn tier_serde_round_trips_labels() {
    let t: QualityTier = serde_json::from_str("\"4K\"").unwrap();
    assert_eq!(t, QualityTier::K4);
    assert_eq!(serde_json::to_string(&t).unwrap(), "\"4K\"");
    let fallback: QualityTier = serde_json::from_str("\"bogus\"").unwrap();
    assert_eq!(fallback, QualityTier::P1080);
}

#[test]
fn aspect_parses() {
    assert_eq!(
        "portrait".parse::<AspectRatio>().unwrap(),
        AspectRatio::Portrait
    );
    assert_eq!("16:9".parse::<AspectRatio>().unwrap(), AspectRatio::Landscape);
    assert!("square".parse::<AspectRatio>().is_err());
}
