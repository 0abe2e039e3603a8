use super::*;
use crate::{
    config::style::StyleConfig,
    foundation::{color::Rgb8, core::Resolution},
};

fn style() -> Arc<ClipStyle> {
    Arc::new(ClipStyle {
        base: BaseStyle {
            color: Rgb8::WHITE,
            font_size_px: 40.0,
            canvas: Resolution::new(640, 360),
        },
        position: TextPosition::Center,
    })
}

fn spec(effect: &str) -> EffectSpec {
    EffectSpec::resolve(&StyleConfig {
        effect_name: effect.to_string(),
        ..StyleConfig::default()
    })
    .unwrap()
}

#[test]
fn evaluate_is_none_outside_half_open_interval() {
    let seg = LyricSegment::new("la la", 1.0, 2.0);
    let clip = TimedClip::new(0, &seg, style(), &spec("none"), 10.0).unwrap();
    assert!(clip.evaluate(0.999).is_none());
    assert!(clip.evaluate(1.0).is_some());
    assert!(clip.evaluate(1.999).is_some());
    assert!(clip.evaluate(2.0).is_none());
}

#[test]
fn interval_is_clipped_to_audio() {
    let seg = LyricSegment::new("tail", 8.0, 12.0);
    let clip = TimedClip::new(3, &seg, style(), &spec("fade_in"), 10.0).unwrap();
    assert_eq!(clip.interval(), ClipInterval { start: 8.0, end: 10.0 });
    assert_eq!(clip.index(), 3);

    let past = LyricSegment::new("gone", 11.0, 12.0);
    assert!(TimedClip::new(4, &past, style(), &spec("fade_in"), 10.0).is_none());
}

#[test]
fn typing_reveals_prefix_by_characters() {
    let seg = LyricSegment::new("héllo", 0.0, 5.0);
    let clip = TimedClip::new(0, &seg, style(), &spec("typing"), 10.0).unwrap();
    let at = |t: f64| {
        let tr = clip.evaluate(t).unwrap();
        clip.visible_text(&tr).to_string()
    };
    assert_eq!(at(0.0), "");
    assert_eq!(at(1.5), "hé");
    assert_eq!(at(4.999), "héllo");
}

#[test]
fn empty_typing_text_becomes_single_space() {
    let seg = LyricSegment::new("", 0.0, 2.0);
    let clip = TimedClip::new(0, &seg, style(), &spec("typing"), 10.0).unwrap();
    let tr = clip.evaluate(0.0).unwrap();
    assert_eq!(clip.visible_text(&tr), " ");
}

#[test]
fn fade_uses_clip_local_time() {
    let seg = LyricSegment::new("x", 4.0, 7.0);
    let clip = TimedClip::new(0, &seg, style(), &spec("fade_in"), 10.0).unwrap();
    assert_eq!(clip.evaluate(4.0).unwrap().opacity, 0.0);
    assert!((clip.evaluate(4.5).unwrap().opacity - 0.5).abs() < 1e-9);
    assert_eq!(clip.evaluate(5.0).unwrap().opacity, 1.0);
}

#[test]
fn build_clips_drops_out_of_range_segments() {
    let segs = vec![
        LyricSegment::new("a", 0.0, 1.0),
        LyricSegment::new("b", 5.0, 6.0),
        LyricSegment::new("c", 1.0, 2.0),
    ];
    let clips = build_clips(&segs, style(), &spec("none"), 3.0);
    assert_eq!(
        clips.iter().map(TimedClip::index).collect::<Vec<_>>(),
        vec![0, 2]
    );
}
