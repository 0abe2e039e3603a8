use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use image::imageops::FilterType;

use crate::{
    foundation::{
        color::Rgb8,
        core::Resolution,
        error::{LyricError, LyricResult},
        math::Fnv1a64,
    },
    lyrics::transcript::extension_lower,
};

/// Image extensions picked up from a background folder.
pub const BACKGROUND_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "bmp"];

/// Source-pixel rectangle kept by the centre crop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    /// Left edge in source pixels.
    pub left: u32,
    /// Top edge in source pixels.
    pub top: u32,
    /// Crop width.
    pub width: u32,
    /// Crop height.
    pub height: u32,
}

/// Largest rectangle of the target aspect ratio centred in the source.
///
/// Integer math throughout: the kept extent is floored and the offset is
/// `(extent - kept) / 2` with floor division.
pub fn center_crop_rect(src_w: u32, src_h: u32, target: Resolution) -> CropRect {
    let (sw, sh) = (u64::from(src_w), u64::from(src_h));
    let (tw, th) = (
        u64::from(target.width.max(1)),
        u64::from(target.height.max(1)),
    );

    if sw * th > sh * tw {
        let new_w = (sh * tw / th).clamp(1, sw) as u32;
        CropRect {
            left: (src_w - new_w) / 2,
            top: 0,
            width: new_w,
            height: src_h,
        }
    } else {
        let new_h = (sw * th / tw).clamp(1, sh.max(1)) as u32;
        CropRect {
            left: 0,
            top: src_h.saturating_sub(new_h) / 2,
            width: src_w,
            height: new_h,
        }
    }
}

/// Background raster at exactly the job resolution, premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct Background {
    /// Always the requested target size.
    pub resolution: Resolution,
    /// Premultiplied RGBA8, `width * height * 4` bytes.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl Background {
    /// Centre-crop to the target aspect, then Lanczos-resize to the target size.
    pub fn from_image(img: &image::DynamicImage, target: Resolution) -> LyricResult<Self> {
        if img.width() == 0 || img.height() == 0 {
            return Err(LyricError::asset("background image has zero size"));
        }
        if target.width == 0 || target.height == 0 {
            return Err(LyricError::render(format!(
                "invalid target resolution {target}"
            )));
        }
        let crop = center_crop_rect(img.width(), img.height(), target);
        let framed = img
            .crop_imm(crop.left, crop.top, crop.width, crop.height)
            .resize_exact(target.width, target.height, FilterType::Lanczos3)
            .to_rgba8();

        let mut rgba8_premul = framed.into_raw();
        premultiply_rgba8_in_place(&mut rgba8_premul);
        Ok(Self {
            resolution: target,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Decode encoded image bytes, then crop and resize to `target`.
    pub fn decode(bytes: &[u8], target: Resolution) -> LyricResult<Self> {
        let img = image::load_from_memory(bytes).context("decode background image")?;
        Self::from_image(&img, target)
    }

    /// Read and decode an image file. Errors name the file.
    pub fn load(path: &Path, target: Resolution) -> LyricResult<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            LyricError::asset(format!("read background '{}': {e}", path.display()))
        })?;
        Self::decode(&bytes, target).map_err(|e| {
            LyricError::asset(format!("load background '{}': {e}", path.display()))
        })
    }

    /// Flat opaque colour.
    pub fn solid(target: Resolution, color: Rgb8) -> Self {
        let mut px = Vec::with_capacity(target.byte_len());
        for _ in 0..(target.width as usize * target.height as usize) {
            px.extend_from_slice(&[color.r, color.g, color.b, 255]);
        }
        Self {
            resolution: target,
            rgba8_premul: Arc::new(px),
        }
    }
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Image files directly inside `dir`, sorted by path.
pub fn list_background_images(dir: &Path) -> LyricResult<Vec<PathBuf>> {
    let rd = std::fs::read_dir(dir).map_err(|e| {
        LyricError::config(format!("read background folder '{}': {e}", dir.display()))
    })?;
    let mut out: Vec<PathBuf> = rd
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.is_file()
                && extension_lower(p).is_some_and(|ext| BACKGROUND_EXTENSIONS.contains(&ext.as_str()))
        })
        .collect();
    out.sort();
    Ok(out)
}

/// Resolve the background for the job keyed `key`.
///
/// A file is used as-is. A folder yields one of its images, chosen by
/// hashing `seed` with `key` so a given song always gets the same picture.
pub fn pick_background(source: &Path, key: &str, seed: u64) -> LyricResult<PathBuf> {
    if source.is_file() {
        return Ok(source.to_path_buf());
    }
    if !source.is_dir() {
        return Err(LyricError::config(format!(
            "background path '{}' does not exist",
            source.display()
        )));
    }
    let images = list_background_images(source)?;
    if images.is_empty() {
        return Err(LyricError::config(format!(
            "no .jpg/.jpeg/.png/.bmp images in '{}'",
            source.display()
        )));
    }
    let mut h = Fnv1a64::new(seed);
    h.write_bytes(key.as_bytes());
    let idx = (h.finish() % images.len() as u64) as usize;
    Ok(images[idx].clone())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/background.rs"]
mod tests;
