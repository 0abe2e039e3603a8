use super::*;
use crate::effects::transform::BaseStyle;
use crate::foundation::core::Resolution;

#[test]
fn every_kind_round_trips_its_name() {
    for kind in EffectKind::ALL {
        assert_eq!(EffectKind::parse(kind.name()).unwrap(), kind);
    }
    assert_eq!(
        EffectKind::parse("color_gradient").unwrap(),
        EffectKind::Gradient
    );
    assert_eq!(EffectKind::parse(" Fade_In ").unwrap(), EffectKind::FadeIn);
}

#[test]
fn unknown_names_are_effect_errors() {
    assert!(matches!(
        EffectKind::parse("sparkle"),
        Err(LyricError::Effect(_))
    ));
    assert!(matches!(
        ColorEffect::parse("plaid"),
        Err(LyricError::Effect(_))
    ));
}

#[test]
fn colour_effect_takes_precedence() {
    let style = StyleConfig {
        effect_name: "slide_left".to_string(),
        color_effect_name: "pulse".to_string(),
        ..StyleConfig::default()
    };
    assert_eq!(EffectSpec::resolve(&style).unwrap().kind, EffectKind::Pulse);

    let style = StyleConfig {
        effect_name: "slide_left".to_string(),
        ..StyleConfig::default()
    };
    assert_eq!(
        EffectSpec::resolve(&style).unwrap().kind,
        EffectKind::SlideLeft
    );
}

#[test]
fn gradient_end_defaults_to_complement_and_can_be_overridden() {
    let style = StyleConfig {
        color: Rgb8::new(200, 100, 0),
        color_effect_name: "gradient".to_string(),
        ..StyleConfig::default()
    };
    let spec = EffectSpec::resolve(&style).unwrap();
    assert_eq!(spec.gradient_start, Rgb8::new(200, 100, 0));
    assert_eq!(spec.gradient_end, Rgb8::new(55, 155, 255));

    let spec = spec.with_gradient_end(Rgb8::new(1, 2, 3));
    assert_eq!(spec.gradient_end, Rgb8::new(1, 2, 3));

    let style = StyleConfig {
        gradient_end_color: Some(Rgb8::new(9, 9, 9)),
        ..style
    };
    assert_eq!(
        EffectSpec::resolve(&style).unwrap().gradient_end,
        Rgb8::new(9, 9, 9)
    );
}

#[test]
fn built_effects_report_position_management() {
    let managed = [
        EffectKind::SlideLeft,
        EffectKind::SlideRight,
        EffectKind::SlideTop,
        EffectKind::SlideBottom,
        EffectKind::Bounce,
        EffectKind::Shake,
        EffectKind::Wave,
    ];
    let base = EffectSpec::resolve(&StyleConfig::default()).unwrap();
    for kind in EffectKind::ALL {
        let spec = EffectSpec { kind, ..base };
        let effect = spec.build("hello", 0);
        assert_eq!(
            effect.manages_position(),
            managed.contains(&kind),
            "{}",
            kind.name()
        );
    }
}

#[test]
fn shake_salt_separates_clips() {
    let spec = EffectSpec {
        kind: EffectKind::Shake,
        ..EffectSpec::resolve(&StyleConfig::default()).unwrap()
    };
    let base = BaseStyle {
        color: Rgb8::WHITE,
        font_size_px: 40.0,
        canvas: Resolution::new(640, 360),
    };
    let a = spec.build("x", 0).evaluate(0.4, 2.0, &base);
    let b = spec.build("x", 1).evaluate(0.4, 2.0, &base);
    assert_ne!(a.offset, b.offset);
}
