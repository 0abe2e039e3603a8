use std::path::{Path, PathBuf};

use crate::{
    config::{
        preset::{AspectRatio, QualityTier},
        style::StyleConfig,
    },
    foundation::error::{LyricError, LyricResult},
    render::pipeline::RenderThreading,
};

/// Settings file consumed by the `lyricframe` binary.
///
/// Every field has a default so a partial JSON file is enough.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Text style shared by every job.
    pub style: StyleConfig,
    /// Frame shape.
    pub aspect: AspectRatio,
    /// Resolution and bitrate tier.
    pub quality: QualityTier,
    /// Input and output folders.
    pub folders: FolderConfig,
    /// Frame rendering parallelism.
    pub render: RenderThreading,
    /// Log filter and format.
    pub logging: LoggingConfig,
}

/// File-system locations supplied by the caller.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FolderConfig {
    /// Folder searched for audio files.
    pub audio: Option<PathBuf>,
    /// A single image or a folder of images.
    pub backgrounds: Option<PathBuf>,
    /// Folder receiving the videos.
    pub output: PathBuf,
    /// Extra directory scanned for font files.
    pub fonts: Option<PathBuf>,
}

impl Default for FolderConfig {
    fn default() -> Self {
        Self {
            audio: None,
            backgrounds: None,
            output: PathBuf::from("output"),
            fonts: None,
        }
    }
}

/// Logging configuration.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (e.g. `info`, `lyricframe=debug`).
    pub level: String,
    /// Emit structured JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Read a JSON settings file.
    pub fn load(path: &Path) -> LyricResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            LyricError::config(format!("read config '{}': {e}", path.display()))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            LyricError::config(format!("parse config '{}': {e}", path.display()))
        })
    }

    /// Check that the style resolves and that configured input folders exist.
    pub fn validate(&self) -> LyricResult<()> {
        self.style.validate()?;
        if let Some(dir) = &self.folders.audio
            && !dir.is_dir()
        {
            return Err(LyricError::config(format!(
                "audio folder '{}' does not exist",
                dir.display()
            )));
        }
        if let Some(bg) = &self.folders.backgrounds
            && !bg.exists()
        {
            return Err(LyricError::config(format!(
                "background path '{}' does not exist",
                bg.display()
            )));
        }
        if self.render.chunk_size == 0 {
            return Err(LyricError::config("render.chunkSize must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/app.rs"]
mod tests;
