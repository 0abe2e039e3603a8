use std::str::FromStr;

use crate::foundation::{
    core::{Fps, Resolution},
    error::LyricError,
};

/// Named preset bundling output resolution and video bitrate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum QualityTier {
    /// 1280x720 at 4000 kbps.
    P720,
    /// 1920x1080 at 8000 kbps.
    #[default]
    P1080,
    /// 3840x2160 at 20000 kbps.
    K4,
}

impl QualityTier {
    /// Parse a tier label; anything unrecognised falls back to `1080p`.
    pub fn parse_or_default(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "720p" | "720" => Self::P720,
            "1080p" | "1080" => Self::P1080,
            "4k" | "2160p" | "2160" => Self::K4,
            other => {
                tracing::warn!(tier = other, "unrecognised quality tier, using 1080p");
                Self::P1080
            }
        }
    }

    /// Display name, also accepted by `parse_or_default`.
    pub fn label(self) -> &'static str {
        match self {
            Self::P720 => "720p",
            Self::P1080 => "1080p",
            Self::K4 => "4K",
        }
    }

    /// Landscape (16:9) output size.
    pub fn resolution(self) -> Resolution {
        match self {
            Self::P720 => Resolution::new(1280, 720),
            Self::P1080 => Resolution::new(1920, 1080),
            Self::K4 => Resolution::new(3840, 2160),
        }
    }

    /// H.264 target bitrate.
    pub fn video_bitrate_kbps(self) -> u32 {
        match self {
            Self::P720 => 4000,
            Self::P1080 => 8000,
            Self::K4 => 20000,
        }
    }
}

impl From<String> for QualityTier {
    fn from(value: String) -> Self {
        Self::parse_or_default(&value)
    }
}

impl From<QualityTier> for String {
    fn from(value: QualityTier) -> Self {
        value.label().to_string()
    }
}

/// Target frame shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatio {
    /// 16:9
    #[default]
    Landscape,
    /// 9:16
    Portrait,
}

impl AspectRatio {
    /// Output size for `tier` in this shape.
    pub fn resolution(self, tier: QualityTier) -> Resolution {
        match self {
            Self::Landscape => tier.resolution(),
            Self::Portrait => tier.resolution().transposed(),
        }
    }
}

impl FromStr for AspectRatio {
    type Err = LyricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "landscape" | "16:9" => Ok(Self::Landscape),
            "portrait" | "9:16" => Ok(Self::Portrait),
            other => Err(LyricError::config(format!(
                "unknown aspect ratio '{other}' (expected landscape or portrait)"
            ))),
        }
    }
}

/// AAC bitrate used for the re-encoded audio track.
pub const AUDIO_BITRATE_KBPS: u32 = 320;

/// Everything the encoder needs to know about the output stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputPreset {
    /// Frame size.
    pub resolution: Resolution,
    /// Frame rate.
    pub fps: Fps,
    /// H.264 bitrate in kbps.
    pub video_bitrate_kbps: u32,
    /// AAC bitrate in kbps.
    pub audio_bitrate_kbps: u32,
}

impl OutputPreset {
    /// Preset for a frame shape and quality tier.
    pub fn new(aspect: AspectRatio, tier: QualityTier) -> Self {
        Self {
            resolution: aspect.resolution(tier),
            fps: Fps::LYRIC,
            video_bitrate_kbps: tier.video_bitrate_kbps(),
            audio_bitrate_kbps: AUDIO_BITRATE_KBPS,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/preset.rs"]
mod tests;
