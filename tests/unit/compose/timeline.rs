use super::*;
use crate::{
    clip::timed::ClipStyle,
    config::style::StyleConfig,
    effects::{kind::EffectSpec, transform::BaseStyle},
    foundation::color::Rgb8,
    lyrics::segment::LyricSegment,
    text::raster::BlockTextRasterizer,
};

const CANVAS: Resolution = Resolution {
    width: 64,
    height: 36,
};

fn style(color: Rgb8, position: TextPosition) -> Arc<ClipStyle> {
    Arc::new(ClipStyle {
        base: BaseStyle {
            color,
            font_size_px: 10.0,
            canvas: CANVAS,
        },
        position,
    })
}

fn spec(effect: &str) -> EffectSpec {
    EffectSpec::resolve(&StyleConfig {
        effect_name: effect.to_string(),
        ..StyleConfig::default()
    })
    .unwrap()
}

fn clip(index: usize, text: &str, start: f64, end: f64, style: Arc<ClipStyle>, effect: &str) -> TimedClip {
    let seg = LyricSegment::new(text, start, end);
    TimedClip::new(index, &seg, style, &spec(effect), 100.0).unwrap()
}

fn black() -> Arc<Background> {
    Arc::new(Background::solid(CANVAS, Rgb8::new(0, 0, 0)))
}

fn px(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let o = ((y * frame.width + x) * 4) as usize;
    [frame.data[o], frame.data[o + 1], frame.data[o + 2], frame.data[o + 3]]
}

#[test]
fn frame_outside_every_clip_is_the_background() {
    let tl = Timeline::new(
        black(),
        vec![clip(0, "ab", 1.0, 2.0, style(Rgb8::WHITE, TextPosition::Center), "none")],
    )
    .unwrap();
    let mut r = BlockTextRasterizer;
    for t in [0.0, 0.5, 2.0, 3.0] {
        let frame = tl.render_frame(t, &mut r).unwrap();
        assert_eq!(frame.data, *tl.background.rgba8_premul, "t={t}");
    }
}

#[test]
fn centred_text_is_drawn_in_the_middle() {
    let tl = Timeline::new(
        black(),
        vec![clip(0, "ab", 0.0, 2.0, style(Rgb8::WHITE, TextPosition::Center), "none")],
    )
    .unwrap();
    let frame = tl.render_frame(1.0, &mut BlockTextRasterizer).unwrap();
    assert_eq!((frame.width, frame.height), (64, 36));
    assert!(frame.premultiplied);
    // sprite is 12x10, so the top-left lands at (26, 13)
    assert_eq!(px(&frame, 26, 13), [255, 255, 255, 255]);
    assert_eq!(px(&frame, 25, 13), [0, 0, 0, 255]);
    assert_eq!(px(&frame, 26, 12), [0, 0, 0, 255]);
}

#[test]
fn top_position_anchors_the_top_edge() {
    let tl = Timeline::new(
        black(),
        vec![clip(0, "ab", 0.0, 2.0, style(Rgb8::WHITE, TextPosition::Top), "none")],
    )
    .unwrap();
    let frame = tl.render_frame(1.0, &mut BlockTextRasterizer).unwrap();
    assert_eq!(px(&frame, 26, 7), [255, 255, 255, 255]);
    assert_eq!(px(&frame, 26, 6), [0, 0, 0, 255]);
}

#[test]
fn later_clip_draws_over_earlier_one() {
    let red = Rgb8::new(255, 0, 0);
    let blue = Rgb8::new(0, 0, 255);
    let tl = Timeline::new(
        black(),
        vec![
            clip(1, "aaaa", 0.0, 2.0, style(blue, TextPosition::Center), "none"),
            clip(0, "aaaa", 0.0, 2.0, style(red, TextPosition::Center), "none"),
        ],
    )
    .unwrap();
    let order: Vec<usize> = tl.clips().iter().map(TimedClip::index).collect();
    assert_eq!(order, vec![0, 1]);
    let frame = tl.render_frame(1.0, &mut BlockTextRasterizer).unwrap();
    assert_eq!(px(&frame, 32, 18), [0, 0, 255, 255]);

    // an earlier start draws first regardless of segment order
    let tl = Timeline::new(
        black(),
        vec![
            clip(0, "aaaa", 0.5, 2.0, style(red, TextPosition::Center), "none"),
            clip(1, "aaaa", 0.0, 2.0, style(blue, TextPosition::Center), "none"),
        ],
    )
    .unwrap();
    let frame = tl.render_frame(1.0, &mut BlockTextRasterizer).unwrap();
    assert_eq!(px(&frame, 32, 18), [255, 0, 0, 255]);
}

#[test]
fn fingerprint_tracks_visible_state() {
    let tl = Timeline::new(
        black(),
        vec![
            clip(0, "held", 0.0, 2.0, style(Rgb8::WHITE, TextPosition::Center), "none"),
            clip(1, "fading", 3.0, 6.0, style(Rgb8::WHITE, TextPosition::Center), "fade_in"),
        ],
    )
    .unwrap();
    assert_eq!(tl.fingerprint(0.1), tl.fingerprint(1.9));
    assert_eq!(tl.fingerprint(2.1), tl.fingerprint(2.9));
    assert_ne!(tl.fingerprint(1.9), tl.fingerprint(2.1));
    assert_ne!(tl.fingerprint(3.1), tl.fingerprint(3.5));
}

#[test]
fn canvas_mismatch_is_rejected() {
    let other = Arc::new(Background::solid(Resolution::new(32, 18), Rgb8::WHITE));
    let err = Timeline::new(
        other,
        vec![clip(0, "x", 0.0, 1.0, style(Rgb8::WHITE, TextPosition::Center), "none")],
    )
    .unwrap_err();
    assert!(matches!(err, LyricError::Render(_)));
}
