use std::sync::Arc;

use crate::{
    config::style::StyleConfig,
    effects::library::{
        Bounce, Effect, Fade, FadeMode, Glow, Gradient, Identity, Pulse, Rainbow, Shake, Slide,
        SlideFrom, Spectrum, Typing, Wave, ZoomIn, ZoomOut,
    },
    foundation::{
        color::Rgb8,
        error::{LyricError, LyricResult},
    },
};

/// Variant tag selecting one [`Effect`] implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// No animation.
    None,
    /// Characters revealed over the segment.
    Typing,
    /// Fade in over the start.
    FadeIn,
    /// Fade out over the end.
    FadeOut,
    /// Fade in, then out.
    FadeBoth,
    /// Slide in from the left.
    SlideLeft,
    /// Slide in from the right.
    SlideRight,
    /// Slide in from the top.
    SlideTop,
    /// Slide in from the bottom.
    SlideBottom,
    /// Grow from nothing to full size.
    ZoomIn,
    /// Shrink over the segment.
    ZoomOut,
    /// Vertical sine bounce.
    Bounce,
    /// White halos behind the text.
    Glow,
    /// Seeded jitter.
    Shake,
    /// Circular sway.
    Wave,
    /// Steps through six hues.
    Rainbow,
    /// Steps from the base colour to its end colour.
    Gradient,
    /// Opacity pulse.
    Pulse,
    /// Steps around the hue wheel.
    Spectrum,
}

impl EffectKind {
    /// Every kind, in declaration order.
    pub const ALL: [EffectKind; 19] = [
        Self::None,
        Self::Typing,
        Self::FadeIn,
        Self::FadeOut,
        Self::FadeBoth,
        Self::SlideLeft,
        Self::SlideRight,
        Self::SlideTop,
        Self::SlideBottom,
        Self::ZoomIn,
        Self::ZoomOut,
        Self::Bounce,
        Self::Glow,
        Self::Shake,
        Self::Wave,
        Self::Rainbow,
        Self::Gradient,
        Self::Pulse,
        Self::Spectrum,
    ];

    /// Parse an effect name. Colour effects are also accepted under their
    /// `color_*` aliases.
    pub fn parse(name: &str) -> LyricResult<Self> {
        let key = name.trim().to_ascii_lowercase();
        let kind = match key.as_str() {
            "" | "none" => Self::None,
            "typing" => Self::Typing,
            "fade_in" => Self::FadeIn,
            "fade_out" => Self::FadeOut,
            "fade_both" => Self::FadeBoth,
            "slide_left" => Self::SlideLeft,
            "slide_right" => Self::SlideRight,
            "slide_top" => Self::SlideTop,
            "slide_bottom" => Self::SlideBottom,
            "zoom_in" => Self::ZoomIn,
            "zoom_out" => Self::ZoomOut,
            "bounce" => Self::Bounce,
            "glow" => Self::Glow,
            "shake" => Self::Shake,
            "wave" => Self::Wave,
            "rainbow" => Self::Rainbow,
            "gradient" | "color_gradient" => Self::Gradient,
            "pulse" | "color_pulse" => Self::Pulse,
            "spectrum" | "color_spectrum" => Self::Spectrum,
            _ => {
                return Err(LyricError::effect(format!("unknown effect '{name}'")));
            }
        };
        Ok(kind)
    }

    /// Canonical name, as accepted by [`EffectKind::parse`].
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Typing => "typing",
            Self::FadeIn => "fade_in",
            Self::FadeOut => "fade_out",
            Self::FadeBoth => "fade_both",
            Self::SlideLeft => "slide_left",
            Self::SlideRight => "slide_right",
            Self::SlideTop => "slide_top",
            Self::SlideBottom => "slide_bottom",
            Self::ZoomIn => "zoom_in",
            Self::ZoomOut => "zoom_out",
            Self::Bounce => "bounce",
            Self::Glow => "glow",
            Self::Shake => "shake",
            Self::Wave => "wave",
            Self::Rainbow => "rainbow",
            Self::Gradient => "gradient",
            Self::Pulse => "pulse",
            Self::Spectrum => "spectrum",
        }
    }

    /// Return `true` for the colour family.
    pub fn is_color(self) -> bool {
        matches!(
            self,
            Self::Rainbow | Self::Gradient | Self::Pulse | Self::Spectrum
        )
    }
}

/// Colour-family selection from the style's `colorEffectName`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorEffect {
    /// Keep the text effect.
    #[default]
    None,
    /// See [`EffectKind::Rainbow`].
    Rainbow,
    /// See [`EffectKind::Gradient`].
    Gradient,
    /// See [`EffectKind::Pulse`].
    Pulse,
    /// See [`EffectKind::Spectrum`].
    Spectrum,
}

impl ColorEffect {
    /// Parse a colour effect name, with or without the `color_` prefix.
    pub fn parse(name: &str) -> LyricResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "rainbow" => Ok(Self::Rainbow),
            "gradient" | "color_gradient" => Ok(Self::Gradient),
            "pulse" | "color_pulse" => Ok(Self::Pulse),
            "spectrum" | "color_spectrum" => Ok(Self::Spectrum),
            _ => Err(LyricError::effect(format!("unknown colour effect '{name}'"))),
        }
    }

    /// Effect kind replacing the text effect, if any.
    pub fn kind(self) -> Option<EffectKind> {
        match self {
            Self::None => None,
            Self::Rainbow => Some(EffectKind::Rainbow),
            Self::Gradient => Some(EffectKind::Gradient),
            Self::Pulse => Some(EffectKind::Pulse),
            Self::Spectrum => Some(EffectKind::Spectrum),
        }
    }
}

/// Effect kind plus the parameters needed to build it for one segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectSpec {
    /// Selected effect.
    pub kind: EffectKind,
    /// First gradient colour (the style colour).
    pub gradient_start: Rgb8,
    /// Last gradient colour.
    pub gradient_end: Rgb8,
    /// Seed for `shake`.
    pub shake_seed: u64,
}

impl EffectSpec {
    /// Resolve the style's two effect names into one spec. A colour effect
    /// replaces the text effect; both names must parse either way.
    pub fn resolve(style: &StyleConfig) -> LyricResult<Self> {
        let text_kind = EffectKind::parse(&style.effect_name)?;
        let color = ColorEffect::parse(&style.color_effect_name)?;
        Ok(Self {
            kind: color.kind().unwrap_or(text_kind),
            gradient_start: style.color,
            gradient_end: style
                .gradient_end_color
                .unwrap_or_else(|| style.color.complement()),
            shake_seed: style.shake_seed,
        })
    }

    /// Per-call override of the gradient end colour.
    pub fn with_gradient_end(mut self, end: Rgb8) -> Self {
        self.gradient_end = end;
        self
    }

    /// Instantiate the effect for the segment at `clip_index` showing `text`.
    pub fn build(&self, text: &str, clip_index: usize) -> Arc<dyn Effect> {
        match self.kind {
            EffectKind::None => Arc::new(Identity),
            EffectKind::Typing => Arc::new(Typing {
                chars: text.chars().count(),
            }),
            EffectKind::FadeIn => Arc::new(Fade { mode: FadeMode::In }),
            EffectKind::FadeOut => Arc::new(Fade {
                mode: FadeMode::Out,
            }),
            EffectKind::FadeBoth => Arc::new(Fade {
                mode: FadeMode::Both,
            }),
            EffectKind::SlideLeft => Arc::new(Slide {
                from: SlideFrom::Left,
            }),
            EffectKind::SlideRight => Arc::new(Slide {
                from: SlideFrom::Right,
            }),
            EffectKind::SlideTop => Arc::new(Slide {
                from: SlideFrom::Top,
            }),
            EffectKind::SlideBottom => Arc::new(Slide {
                from: SlideFrom::Bottom,
            }),
            EffectKind::ZoomIn => Arc::new(ZoomIn),
            EffectKind::ZoomOut => Arc::new(ZoomOut),
            EffectKind::Bounce => Arc::new(Bounce),
            EffectKind::Glow => Arc::new(Glow),
            EffectKind::Shake => Arc::new(Shake {
                seed: self.shake_seed,
                salt: clip_index as u64,
            }),
            EffectKind::Wave => Arc::new(Wave),
            EffectKind::Rainbow => Arc::new(Rainbow),
            EffectKind::Gradient => Arc::new(Gradient {
                start: self.gradient_start,
                end: self.gradient_end,
            }),
            EffectKind::Pulse => Arc::new(Pulse),
            EffectKind::Spectrum => Arc::new(Spectrum),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/kind.rs"]
mod tests;
