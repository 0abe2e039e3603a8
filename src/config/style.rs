use std::str::FromStr;

use crate::foundation::{
    color::Rgb8,
    error::{LyricError, LyricResult},
};

/// Vertical anchor for lyric text. Text is always centred horizontally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextPosition {
    /// Top edge of the text at 20% of the frame height.
    Top,
    /// Centred on both axes.
    #[default]
    Center,
    /// Top edge of the text at 80% of the frame height.
    Bottom,
}

impl FromStr for TextPosition {
    type Err = LyricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "center" | "centre" => Ok(Self::Center),
            "bottom" => Ok(Self::Bottom),
            other => Err(LyricError::config(format!(
                "unknown text position '{other}' (expected top, center or bottom)"
            ))),
        }
    }
}

/// Default jitter seed for the `shake` effect.
pub const DEFAULT_SHAKE_SEED: u64 = 0x6c79_7269_6373;

/// Text styling shared by every segment of a render job.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleConfig {
    /// Logical family name, or a path to a `.ttf`/`.otf`/`.ttc` file.
    pub font_family: String,
    /// Font size before any effect scaling.
    pub font_size_px: f64,
    /// Base text colour.
    pub color: Rgb8,
    /// Vertical placement.
    pub position: TextPosition,
    /// Text effect, e.g. `fade_in`, `slide_left`, `typing`.
    pub effect_name: String,
    /// Colour effect: `none`, `rainbow`, `gradient`, `pulse` or `spectrum`.
    pub color_effect_name: String,
    /// Seed for the `shake` jitter.
    pub shake_seed: u64,
    /// Overrides the complement colour used as the gradient end.
    pub gradient_end_color: Option<Rgb8>,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font_family: "Arial".to_string(),
            font_size_px: 70.0,
            color: Rgb8::WHITE,
            position: TextPosition::Center,
            effect_name: "fade_in".to_string(),
            color_effect_name: "none".to_string(),
            shake_seed: DEFAULT_SHAKE_SEED,
            gradient_end_color: None,
        }
    }
}

impl StyleConfig {
    /// Check that both effect names parse and the font size is usable.
    pub fn validate(&self) -> LyricResult<()> {
        if !self.font_size_px.is_finite() || self.font_size_px <= 0.0 {
            return Err(LyricError::config(format!(
                "fontSizePx must be a positive number, got {}",
                self.font_size_px
            )));
        }
        if self.font_family.trim().is_empty() {
            return Err(LyricError::config("fontFamily must not be empty"));
        }
        crate::effects::kind::EffectSpec::resolve(self).map(|_| ())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/style.rs"]
mod tests;
