use std::sync::Arc;

use crate::{
    assets::background::Background,
    clip::timed::TimedClip,
    compose::{
        blend::blit_over,
        fingerprint::{FrameFingerprint, fingerprint_active},
    },
    config::style::TextPosition,
    effects::transform::Transform,
    foundation::{
        core::Resolution,
        error::{LyricError, LyricResult},
    },
    text::raster::{TextRasterizer, TextSprite},
};

/// One rendered frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` holds premultiplied alpha.
    pub premultiplied: bool,
}

/// A clip that is live at the query time, with its evaluated transform.
#[derive(Clone, Debug)]
pub struct ActiveClip<'a> {
    /// The clip being shown.
    pub clip: &'a TimedClip,
    /// Its transform at the query time.
    pub transform: Transform,
}

/// Background plus clips in draw order.
///
/// Read-only once built, so any number of workers may render frames from a
/// shared reference concurrently.
#[derive(Clone, Debug)]
pub struct Timeline {
    background: Arc<Background>,
    clips: Vec<TimedClip>,
}

impl Timeline {
    /// Clips are drawn in increasing start time; ties keep segment order.
    pub fn new(background: Arc<Background>, mut clips: Vec<TimedClip>) -> LyricResult<Self> {
        for clip in &clips {
            let canvas = clip.style().base.canvas;
            if canvas != background.resolution {
                return Err(LyricError::render(format!(
                    "background is {} but clip #{} targets {canvas}",
                    background.resolution,
                    clip.index() + 1
                )));
            }
        }
        clips.sort_by(|a, b| {
            a.interval()
                .start
                .total_cmp(&b.interval().start)
                .then(a.index().cmp(&b.index()))
        });
        Ok(Self { background, clips })
    }

    /// Output size, equal to the background size.
    pub fn canvas(&self) -> Resolution {
        self.background.resolution
    }

    /// Clips ordered by start time, then segment index.
    pub fn clips(&self) -> &[TimedClip] {
        &self.clips
    }

    /// Clips whose interval contains `t`, in draw order, with transforms.
    pub fn evaluate(&self, t: f64) -> Vec<ActiveClip<'_>> {
        self.clips
            .iter()
            .filter_map(|clip| {
                clip.evaluate(t)
                    .map(|transform| ActiveClip { clip, transform })
            })
            .collect()
    }

    pub(crate) fn fingerprint(&self, t: f64) -> FrameFingerprint {
        fingerprint_active(&self.evaluate(t))
    }

    /// Composite the background and every active clip at time `t`.
    pub fn render_frame(
        &self,
        t: f64,
        rasterizer: &mut dyn TextRasterizer,
    ) -> LyricResult<FrameRGBA> {
        let canvas = self.canvas();
        let mut data = self.background.rgba8_premul.as_ref().clone();
        if data.len() != canvas.byte_len() {
            return Err(LyricError::render(format!(
                "background buffer holds {} bytes, expected {} for {canvas}",
                data.len(),
                canvas.byte_len()
            )));
        }

        for active in self.evaluate(t) {
            draw_clip(&mut data, canvas, &active, rasterizer)?;
        }

        Ok(FrameRGBA {
            width: canvas.width,
            height: canvas.height,
            data,
            premultiplied: true,
        })
    }
}

/// Top-left corner for the base sprite of `clip`.
fn anchor(
    canvas: Resolution,
    sprite: &TextSprite,
    position: TextPosition,
    manages_position: bool,
    tr: &Transform,
) -> (f64, f64) {
    let (cw, ch) = (f64::from(canvas.width), f64::from(canvas.height));
    let (sw, sh) = (f64::from(sprite.width), f64::from(sprite.height));
    let x = (cw - sw) / 2.0;
    let y = if manages_position {
        (ch - sh) / 2.0
    } else {
        match position {
            TextPosition::Top => ch * 0.2,
            TextPosition::Center => (ch - sh) / 2.0,
            TextPosition::Bottom => ch * 0.8,
        }
    };
    (x + tr.offset.x, y + tr.offset.y)
}

fn draw_clip(
    frame: &mut [u8],
    canvas: Resolution,
    active: &ActiveClip<'_>,
    rasterizer: &mut dyn TextRasterizer,
) -> LyricResult<()> {
    let tr = &active.transform;
    if tr.is_invisible() {
        return Ok(());
    }
    let clip = active.clip;
    let text = clip.visible_text(tr);
    let style = clip.style();
    let size = style.base.font_size_px * tr.scale;
    let color = tr.color_override.unwrap_or(style.base.color);

    let Some(sprite) = rasterizer.rasterize(text, size, color)? else {
        return Ok(());
    };
    let (x, y) = anchor(
        canvas,
        &sprite,
        style.position,
        clip.manages_position(),
        tr,
    );
    let center = (
        x + f64::from(sprite.width) / 2.0,
        y + f64::from(sprite.height) / 2.0,
    );

    // outermost halo first so inner layers sit on top
    for layer in tr.halo.iter().rev() {
        let halo_size = (style.base.font_size_px + layer.size_delta_px) * tr.scale;
        let Some(halo) = rasterizer.rasterize(text, halo_size, layer.color)? else {
            continue;
        };
        let hx = center.0 - f64::from(halo.width) / 2.0;
        let hy = center.1 - f64::from(halo.height) / 2.0;
        blit_over(
            frame,
            canvas.width,
            canvas.height,
            &halo,
            hx.round() as i64,
            hy.round() as i64,
            layer.opacity * tr.opacity,
        );
    }

    blit_over(
        frame,
        canvas.width,
        canvas.height,
        &sprite,
        x.round() as i64,
        y.round() as i64,
        tr.opacity,
    );
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/compose/timeline.rs"]
mod tests;
