//! One [`Effect`] implementation per animation kind.
//!
//! Every effect is a pure function of local time: the same `(t_local,
//! duration, base)` always yields the same [`Transform`], so frames can be
//! evaluated in any order and on any thread.

use std::f64::consts::PI;

use smallvec::smallvec;

use crate::{
    effects::transform::{BaseStyle, HaloLayer, Transform},
    foundation::{color::Rgb8, math::Fnv1a64},
};

/// A time-parameterised visual transform for one clip.
pub trait Effect: Send + Sync + std::fmt::Debug {
    /// Transform at local time `t_local` of a clip lasting `duration` seconds.
    fn evaluate(&self, t_local: f64, duration: f64, base: &BaseStyle) -> Transform;

    /// `true` when the effect positions the text itself, relative to the
    /// frame centre, instead of using the configured top/center/bottom anchor.
    fn manages_position(&self) -> bool {
        false
    }
}

/// Fade ramps never exceed this many seconds.
pub const FADE_MAX_SECS: f64 = 1.5;
/// Length of the slide-in travel.
pub const SLIDE_SECS: f64 = 1.5;
/// Length of the zoom-in ramp.
pub const ZOOM_IN_SECS: f64 = 1.0;
/// Smallest `zoom_out` scale.
pub const ZOOM_OUT_MIN_SCALE: f64 = 0.1;
/// `bounce` height.
pub const BOUNCE_AMPLITUDE_PX: f64 = 10.0;
/// `bounce` frequency.
pub const BOUNCE_HZ: f64 = 3.0;
/// Largest `shake` offset per axis.
pub const SHAKE_PX: f64 = 3.0;
/// `wave` radius.
pub const WAVE_AMPLITUDE_PX: f64 = 5.0;
/// Colour steps of `gradient`.
pub const GRADIENT_STEPS: u32 = 10;
/// Colour steps of `spectrum`.
pub const SPECTRUM_STEPS: u32 = 20;

/// Hues cycled by `rainbow`.
pub const RAINBOW: [Rgb8; 6] = [
    Rgb8::new(255, 0, 0),
    Rgb8::new(255, 165, 0),
    Rgb8::new(255, 255, 0),
    Rgb8::new(0, 128, 0),
    Rgb8::new(0, 0, 255),
    Rgb8::new(128, 0, 128),
];

/// Index of the equal-length step containing `t`, in `0..steps`.
fn step_index(t: f64, duration: f64, steps: u32) -> u32 {
    if steps == 0 || !(duration > 0.0) {
        return 0;
    }
    let step_len = duration / f64::from(steps);
    let i = (t / step_len).floor();
    if i <= 0.0 {
        0
    } else {
        (i as u32).min(steps - 1)
    }
}

/// Leaves the text untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl Effect for Identity {
    fn evaluate(&self, _t_local: f64, _duration: f64, _base: &BaseStyle) -> Transform {
        Transform::identity()
    }
}

/// Reveals `ceil((t / D) * N)` characters.
#[derive(Clone, Copy, Debug)]
pub struct Typing {
    /// Character count of the line.
    pub chars: usize,
}

impl Effect for Typing {
    fn evaluate(&self, t_local: f64, duration: f64, _base: &BaseStyle) -> Transform {
        let mut tr = Transform::identity();
        if self.chars == 0 {
            return tr;
        }
        let n = self.chars as f64;
        let shown = if duration > 0.0 {
            ((t_local / duration) * n).ceil().clamp(0.0, n) as usize
        } else {
            self.chars
        };
        tr.reveal_chars = Some(shown);
        tr
    }
}

/// Which ends of the segment fade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FadeMode {
    /// Fade in only.
    In,
    /// Fade out only.
    Out,
    /// Fade at both ends.
    Both,
}

/// Linear opacity ramps at the start, the end, or both.
#[derive(Clone, Copy, Debug)]
pub struct Fade {
    /// Ends that fade.
    pub mode: FadeMode,
}

impl Fade {
    /// Ramp length for a segment of `duration` seconds.
    pub fn ramp_secs(duration: f64) -> f64 {
        (duration / 3.0).min(FADE_MAX_SECS)
    }
}

impl Effect for Fade {
    fn evaluate(&self, t_local: f64, duration: f64, _base: &BaseStyle) -> Transform {
        let ramp = Self::ramp_secs(duration);
        if !(ramp > 0.0) {
            return Transform::identity();
        }
        let fade_in = (t_local / ramp).clamp(0.0, 1.0);
        let fade_out = ((duration - t_local) / ramp).clamp(0.0, 1.0);
        let opacity = match self.mode {
            FadeMode::In => fade_in,
            FadeMode::Out => fade_out,
            FadeMode::Both => fade_in.min(fade_out),
        };
        Transform::identity().with_opacity(opacity)
    }
}

/// Edge the text enters from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlideFrom {
    /// Left edge.
    Left,
    /// Right edge.
    Right,
    /// Top edge.
    Top,
    /// Bottom edge.
    Bottom,
}

/// Travels from one full frame width/height away back to rest.
#[derive(Clone, Copy, Debug)]
pub struct Slide {
    /// Entry edge.
    pub from: SlideFrom,
}

impl Effect for Slide {
    fn evaluate(&self, t_local: f64, _duration: f64, base: &BaseStyle) -> Transform {
        let remaining = (1.0 - t_local / SLIDE_SECS).clamp(0.0, 1.0);
        let w = f64::from(base.canvas.width) * remaining;
        let h = f64::from(base.canvas.height) * remaining;
        let (dx, dy) = match self.from {
            SlideFrom::Left => (w, 0.0),
            SlideFrom::Right => (-w, 0.0),
            SlideFrom::Top => (0.0, -h),
            SlideFrom::Bottom => (0.0, h),
        };
        Transform::identity().with_offset(dx, dy)
    }

    fn manages_position(&self) -> bool {
        true
    }
}

/// Scales from 0 to 1 over the first second.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZoomIn;

impl Effect for ZoomIn {
    fn evaluate(&self, t_local: f64, _duration: f64, _base: &BaseStyle) -> Transform {
        Transform::identity().with_scale((t_local / ZOOM_IN_SECS).clamp(0.0, 1.0))
    }
}

/// Scales linearly from 1 down to the minimum.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZoomOut;

impl Effect for ZoomOut {
    fn evaluate(&self, t_local: f64, duration: f64, _base: &BaseStyle) -> Transform {
        let linear = if duration > 0.0 {
            1.0 - t_local / duration
        } else {
            1.0
        };
        Transform::identity().with_scale(linear.clamp(ZOOM_OUT_MIN_SCALE, 1.0))
    }
}

/// Vertical sine offset.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bounce;

impl Effect for Bounce {
    fn evaluate(&self, t_local: f64, _duration: f64, _base: &BaseStyle) -> Transform {
        let dy = BOUNCE_AMPLITUDE_PX * (2.0 * PI * BOUNCE_HZ * t_local).sin();
        Transform::identity().with_offset(0.0, dy)
    }

    fn manages_position(&self) -> bool {
        true
    }
}

/// Three white halo copies behind the text; the outermost flickers.
#[derive(Clone, Copy, Debug, Default)]
pub struct Glow;

impl Glow {
    /// Font size increase per halo, inner to outer.
    pub const SIZE_DELTAS_PX: [f64; 3] = [2.0, 4.0, 6.0];
    /// Halo opacity, inner to outer.
    pub const OPACITIES: [f64; 3] = [0.3, 0.2, 0.1];
}

impl Effect for Glow {
    fn evaluate(&self, t_local: f64, _duration: f64, _base: &BaseStyle) -> Transform {
        // 0.3 + 0.1·sin(8t), scaled so it stays around the outer layer's base
        let flicker = Self::OPACITIES[2] * (0.3 + 0.1 * (8.0 * t_local).sin()) / 0.3;
        let layer = |i: usize, opacity: f64| HaloLayer {
            size_delta_px: Self::SIZE_DELTAS_PX[i],
            opacity,
            color: Rgb8::WHITE,
        };
        let mut tr = Transform::identity();
        tr.halo = smallvec![
            layer(0, Self::OPACITIES[0]),
            layer(1, Self::OPACITIES[1]),
            layer(2, flicker),
        ];
        tr
    }
}

/// Seeded jitter. `salt` separates clips sharing the same seed.
#[derive(Clone, Copy, Debug)]
pub struct Shake {
    /// Shared seed.
    pub seed: u64,
    /// Per-clip salt.
    pub salt: u64,
}

impl Shake {
    fn axis(&self, tick: i64, axis: u64) -> f64 {
        let mut h = Fnv1a64::new(self.seed);
        h.write_u64(self.salt);
        h.write_u64(tick as u64);
        h.write_u64(axis);
        (h.finish_unit() * 2.0 - 1.0) * SHAKE_PX
    }
}

impl Effect for Shake {
    fn evaluate(&self, t_local: f64, _duration: f64, _base: &BaseStyle) -> Transform {
        // millisecond ticks: one draw per rendered frame at any sane rate
        let tick = (t_local * 1000.0).round() as i64;
        Transform::identity().with_offset(self.axis(tick, 0), self.axis(tick, 1))
    }

    fn manages_position(&self) -> bool {
        true
    }
}

/// Circular offset, sine on x and cosine on y.
#[derive(Clone, Copy, Debug, Default)]
pub struct Wave;

impl Effect for Wave {
    fn evaluate(&self, t_local: f64, _duration: f64, _base: &BaseStyle) -> Transform {
        Transform::identity().with_offset(
            WAVE_AMPLITUDE_PX * (2.0 * PI * t_local).sin(),
            WAVE_AMPLITUDE_PX * (3.0 * PI * t_local).cos(),
        )
    }

    fn manages_position(&self) -> bool {
        true
    }
}

/// Hard cuts through six hues, `D/6` each.
#[derive(Clone, Copy, Debug, Default)]
pub struct Rainbow;

impl Effect for Rainbow {
    fn evaluate(&self, t_local: f64, duration: f64, _base: &BaseStyle) -> Transform {
        let i = step_index(t_local, duration, RAINBOW.len() as u32) as usize;
        Transform::identity().with_color(RAINBOW[i])
    }
}

/// Ten discrete steps from `start` to `end`.
#[derive(Clone, Copy, Debug)]
pub struct Gradient {
    /// First colour.
    pub start: Rgb8,
    /// Last colour.
    pub end: Rgb8,
}

impl Gradient {
    /// Colour of step `step` in `0..GRADIENT_STEPS`.
    pub fn color_at_step(&self, step: u32) -> Rgb8 {
        let frac = f64::from(step) / f64::from(GRADIENT_STEPS - 1);
        let lerp = |a: u8, b: u8| {
            let a = f64::from(a);
            (a + (f64::from(b) - a) * frac) as u8
        };
        Rgb8::new(
            lerp(self.start.r, self.end.r),
            lerp(self.start.g, self.end.g),
            lerp(self.start.b, self.end.b),
        )
    }
}

impl Effect for Gradient {
    fn evaluate(&self, t_local: f64, duration: f64, _base: &BaseStyle) -> Transform {
        let step = step_index(t_local, duration, GRADIENT_STEPS);
        Transform::identity().with_color(self.color_at_step(step))
    }
}

/// Opacity oscillating around 0.6.
#[derive(Clone, Copy, Debug, Default)]
pub struct Pulse;

impl Effect for Pulse {
    fn evaluate(&self, t_local: f64, _duration: f64, _base: &BaseStyle) -> Transform {
        Transform::identity().with_opacity(0.6 + 0.4 * (2.0 * PI * t_local).sin())
    }
}

/// Full hue wheel in twenty equal steps.
#[derive(Clone, Copy, Debug, Default)]
pub struct Spectrum;

impl Effect for Spectrum {
    fn evaluate(&self, t_local: f64, duration: f64, _base: &BaseStyle) -> Transform {
        let step = step_index(t_local, duration, SPECTRUM_STEPS);
        let hue = f64::from(step) / f64::from(SPECTRUM_STEPS);
        Transform::identity().with_color(Rgb8::from_hsv(hue, 1.0, 1.0))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/effects/library.rs"]
mod tests;
