use std::path::Path;

use crate::{
    compose::{blend::flatten_to_opaque_rgba8, timeline::FrameRGBA},
    encode::ffmpeg::ensure_parent_dir,
    foundation::error::{LyricError, LyricResult},
};

/// Save one frame as an opaque PNG.
pub fn write_png(frame: &FrameRGBA, path: &Path) -> LyricResult<()> {
    let mut data = Vec::new();
    if frame.premultiplied {
        flatten_to_opaque_rgba8(&mut data, &frame.data, [0, 0, 0, 255]);
    } else {
        data.extend_from_slice(&frame.data);
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, data).ok_or_else(|| {
        LyricError::render(format!(
            "frame buffer does not match {}x{}",
            frame.width, frame.height
        ))
    })?;
    ensure_parent_dir(path)?;
    img.save_with_format(path, image::ImageFormat::Png)
        .map_err(|e| LyricError::render(format!("write png '{}': {e}", path.display())))
}
