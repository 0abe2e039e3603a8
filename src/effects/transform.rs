use smallvec::SmallVec;

use crate::foundation::{
    color::Rgb8,
    core::{Resolution, Vec2},
};

/// Style inputs an effect may read while evaluating.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BaseStyle {
    /// Colour before effects.
    pub color: Rgb8,
    /// Size before effects.
    pub font_size_px: f64,
    /// Output frame size; slide displacements are measured against it.
    pub canvas: Resolution,
}

/// One glow copy drawn behind the text at a larger font size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HaloLayer {
    /// Added font size.
    pub size_delta_px: f64,
    /// Layer opacity.
    pub opacity: f64,
    /// Layer colour.
    pub color: Rgb8,
}

/// Visual state of one clip at one instant.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    /// Pixel offset from the rest position.
    pub offset: Vec2,
    /// Multiplied into the clip opacity, clamped to `[0, 1]`.
    pub opacity: f64,
    /// Font size factor.
    pub scale: f64,
    /// Replaces the base colour when set.
    pub color_override: Option<Rgb8>,
    /// Show only the first `n` characters.
    pub reveal_chars: Option<usize>,
    /// Glow copies, innermost first.
    pub halo: SmallVec<[HaloLayer; 3]>,
}

impl Transform {
    /// No offset, full opacity, unit scale.
    pub fn identity() -> Self {
        Self {
            offset: Vec2::ZERO,
            opacity: 1.0,
            scale: 1.0,
            color_override: None,
            reveal_chars: None,
            halo: SmallVec::new(),
        }
    }

    /// Set the offset.
    pub fn with_offset(mut self, dx: f64, dy: f64) -> Self {
        self.offset = Vec2::new(dx, dy);
        self
    }

    /// Set the opacity.
    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    /// Set the scale.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Set the colour override.
    pub fn with_color(mut self, color: Rgb8) -> Self {
        self.color_override = Some(color);
        self
    }

    /// Clamp opacity into `[0, 1]` and scale to `>= 0`; non-finite values
    /// collapse to an invisible transform.
    pub fn sanitized(mut self) -> Self {
        self.opacity = if self.opacity.is_finite() {
            self.opacity.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.scale = if self.scale.is_finite() {
            self.scale.max(0.0)
        } else {
            0.0
        };
        if !self.offset.is_finite() {
            self.offset = Vec2::ZERO;
        }
        for layer in &mut self.halo {
            layer.opacity = if layer.opacity.is_finite() {
                layer.opacity.clamp(0.0, 1.0)
            } else {
                0.0
            };
        }
        self
    }

    /// `true` when nothing would be drawn.
    pub fn is_invisible(&self) -> bool {
        self.opacity <= 0.0 || self.scale <= 0.0 || self.reveal_chars == Some(0)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
