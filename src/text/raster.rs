use std::{collections::HashMap, sync::Arc};

use crate::{
    assets::font::{FontResolver, ResolvedFont},
    foundation::{
        color::Rgb8,
        core::Resolution,
        error::{LyricError, LyricResult},
    },
    text::layout::{TextBrushRgba8, TextLayoutEngine, layout_extent},
};

/// Rasterized text, premultiplied RGBA8, tightly sized with a small margin.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextSprite {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8 pixels.
    pub rgba8_premul: Vec<u8>,
}

/// Turns a string into a sprite.
///
/// Instances are owned by one worker at a time; [`TextRasterizer::fork`]
/// produces an equivalent instance for another worker.
pub trait TextRasterizer: Send {
    /// `Ok(None)` when there is nothing to draw (blank text, sub-pixel size).
    fn rasterize(
        &mut self,
        text: &str,
        size_px: f64,
        color: Rgb8,
    ) -> LyricResult<Option<Arc<TextSprite>>>;

    /// Equivalent rasterizer for another worker.
    fn fork(&self) -> LyricResult<Box<dyn TextRasterizer>>;
}

/// Builds the rasterizer for a job once its style and canvas are known.
pub trait RasterizerFactory: Send + Sync {
    /// Rasterizer for `font_family` on a `canvas`-sized frame.
    fn create(&self, font_family: &str, canvas: Resolution) -> LyricResult<Box<dyn TextRasterizer>>;
}

const SPRITE_MARGIN_PX: f64 = 2.0;
const SPRITE_CACHE_CAP: usize = 256;
/// Text wraps beyond this share of the frame width.
const MAX_TEXT_WIDTH_FRAC: f32 = 0.9;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct SpriteKey {
    text: String,
    size_q: u32, // 1/16 px
    color: Rgb8,
}

impl SpriteKey {
    /// Size the sprite is drawn at, so every hit on a key yields the same pixels.
    fn size_px(&self) -> f64 {
        f64::from(self.size_q) / 16.0
    }
}

#[derive(Default)]
struct SpriteCache {
    map: HashMap<SpriteKey, Option<Arc<TextSprite>>>,
}

impl SpriteCache {
    fn key(text: &str, size_px: f64, color: Rgb8) -> SpriteKey {
        SpriteKey {
            text: text.to_string(),
            size_q: (size_px * 16.0).round().clamp(0.0, f64::from(u32::MAX)) as u32,
            color,
        }
    }

    fn get_or_try_insert(
        &mut self,
        key: SpriteKey,
        make: impl FnOnce() -> LyricResult<Option<Arc<TextSprite>>>,
    ) -> LyricResult<Option<Arc<TextSprite>>> {
        if let Some(hit) = self.map.get(&key) {
            return Ok(hit.clone());
        }
        let sprite = make()?;
        if self.map.len() >= SPRITE_CACHE_CAP {
            self.map.clear();
        }
        self.map.insert(key, sprite.clone());
        Ok(sprite)
    }
}

/// Parley layout filled with `vello_cpu` glyph runs.
pub struct VelloTextRasterizer {
    font: ResolvedFont,
    vello_font: vello_cpu::peniko::FontData,
    engine: TextLayoutEngine,
    max_width_px: Option<f32>,
    cache: SpriteCache,
}

impl VelloTextRasterizer {
    /// Rasterizer for `font`; lines wrap at 90% of the canvas width.
    pub fn new(font: ResolvedFont, canvas: Resolution) -> LyricResult<Self> {
        let engine = TextLayoutEngine::new(&font.data)?;
        tracing::debug!(
            requested = %font.family,
            registered = engine.family_name(),
            fallback = font.fallback,
            "text rasterizer ready"
        );
        let vello_font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font.data.as_ref().clone()),
            font.index,
        );
        Ok(Self {
            font,
            vello_font,
            engine,
            max_width_px: Some(canvas.width as f32 * MAX_TEXT_WIDTH_FRAC),
            cache: SpriteCache::default(),
        })
    }

    fn draw(&mut self, text: &str, size_px: f64, color: Rgb8) -> LyricResult<Option<Arc<TextSprite>>> {
        let layout = self.engine.layout_plain(
            text,
            size_px as f32,
            TextBrushRgba8::from(color),
            self.max_width_px,
        )?;
        let (w, h) = layout_extent(&layout);
        if w <= 0.0 || h <= 0.0 {
            return Ok(None);
        }

        let to_dim = |v: f64| -> LyricResult<u16> {
            let px = (v + 2.0 * SPRITE_MARGIN_PX).ceil();
            if px > f64::from(u16::MAX) {
                return Err(LyricError::render(format!(
                    "text sprite of {px}px exceeds the rasterizer limit"
                )));
            }
            Ok(px.max(1.0) as u16)
        };
        let (sw, sh) = (to_dim(w)?, to_dim(h)?);

        let mut ctx = vello_cpu::RenderContext::new(sw, sh);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            SPRITE_MARGIN_PX,
            SPRITE_MARGIN_PX,
        )));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));
                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.vello_font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(sw, sh);
        ctx.render_to_pixmap(&mut pixmap);

        Ok(Some(Arc::new(TextSprite {
            width: u32::from(sw),
            height: u32::from(sh),
            rgba8_premul: pixmap.data_as_u8_slice().to_vec(),
        })))
    }
}

impl TextRasterizer for VelloTextRasterizer {
    fn rasterize(
        &mut self,
        text: &str,
        size_px: f64,
        color: Rgb8,
    ) -> LyricResult<Option<Arc<TextSprite>>> {
        if text.trim().is_empty() || !(size_px >= 0.5) {
            return Ok(None);
        }
        let key = SpriteCache::key(text, size_px, color);
        let draw_px = key.size_px();
        let mut cache = std::mem::take(&mut self.cache);
        let out = cache.get_or_try_insert(key, || self.draw(text, draw_px, color));
        self.cache = cache;
        out
    }

    fn fork(&self) -> LyricResult<Box<dyn TextRasterizer>> {
        // parley contexts are not shareable, each fork registers its own copy
        Ok(Box::new(Self {
            font: self.font.clone(),
            vello_font: self.vello_font.clone(),
            engine: TextLayoutEngine::new(&self.font.data)?,
            max_width_px: self.max_width_px,
            cache: SpriteCache::default(),
        }))
    }
}

/// [`RasterizerFactory`] resolving the family through a [`FontResolver`].
///
/// When no font can be resolved at all, jobs fall back to
/// [`BlockTextRasterizer`] instead of failing.
pub struct FontRasterizerFactory {
    resolver: Arc<dyn FontResolver>,
}

impl FontRasterizerFactory {
    /// Factory over `resolver`.
    pub fn new(resolver: Arc<dyn FontResolver>) -> Self {
        Self { resolver }
    }
}

impl RasterizerFactory for FontRasterizerFactory {
    fn create(&self, font_family: &str, canvas: Resolution) -> LyricResult<Box<dyn TextRasterizer>> {
        let font = match self.resolver.resolve(font_family) {
            Ok(font) => font,
            Err(e) => {
                tracing::warn!(requested = font_family, error = %e, "no usable font, drawing text as blocks");
                return Ok(Box::new(BlockTextRasterizer));
            }
        };
        Ok(Box::new(VelloTextRasterizer::new(font, canvas)?))
    }
}

/// Font-free rasterizer drawing every visible character as a solid block
/// `0.6 * size` wide and `size` tall; whitespace advances without ink.
///
/// Output depends only on its inputs, which makes it suitable for tests and
/// for previews on machines without fonts.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockTextRasterizer;

impl TextRasterizer for BlockTextRasterizer {
    fn rasterize(
        &mut self,
        text: &str,
        size_px: f64,
        color: Rgb8,
    ) -> LyricResult<Option<Arc<TextSprite>>> {
        if text.trim().is_empty() || !(size_px >= 0.5) {
            return Ok(None);
        }
        let advance = (size_px * 0.6).round().max(1.0) as u32;
        let height = size_px.round().max(1.0) as u32;
        let chars: Vec<char> = text.chars().collect();
        let width = advance * chars.len() as u32;

        let mut px = vec![0u8; (width as usize) * (height as usize) * 4];
        for (i, c) in chars.iter().enumerate() {
            if c.is_whitespace() {
                continue;
            }
            let x0 = i as u32 * advance;
            // one-pixel gap between blocks
            let x1 = (x0 + advance).saturating_sub(1).max(x0 + 1);
            for y in 0..height {
                for x in x0..x1 {
                    let o = ((y * width + x) * 4) as usize;
                    px[o..o + 4].copy_from_slice(&[color.r, color.g, color.b, 255]);
                }
            }
        }
        Ok(Some(Arc::new(TextSprite {
            width,
            height,
            rgba8_premul: px,
        })))
    }

    fn fork(&self) -> LyricResult<Box<dyn TextRasterizer>> {
        Ok(Box::new(*self))
    }
}

/// Factory handing out [`BlockTextRasterizer`]s.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockRasterizerFactory;

impl RasterizerFactory for BlockRasterizerFactory {
    fn create(&self, _font_family: &str, _canvas: Resolution) -> LyricResult<Box<dyn TextRasterizer>> {
        Ok(Box::new(BlockTextRasterizer))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/text/raster.rs"]
mod tests;
