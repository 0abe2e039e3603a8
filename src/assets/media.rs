use std::path::Path;

use crate::foundation::error::{LyricError, LyricResult};

/// Reads the playable length of an audio file.
pub trait AudioProbe: Send + Sync {
    /// Duration of the audio file at `path`, in seconds.
    fn duration_secs(&self, path: &Path) -> LyricResult<f64>;
}

/// [`AudioProbe`] that shells out to the system `ffprobe`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfprobeAudioProbe;

impl AudioProbe for FfprobeAudioProbe {
    fn duration_secs(&self, path: &Path) -> LyricResult<f64> {
        #[derive(serde::Deserialize)]
        struct ProbeFormat {
            duration: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct ProbeStream {
            codec_type: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct ProbeOut {
            #[serde(default)]
            streams: Vec<ProbeStream>,
            format: Option<ProbeFormat>,
        }

        if !path.is_file() {
            return Err(LyricError::asset(format!(
                "audio file '{}' does not exist",
                path.display()
            )));
        }

        let out = std::process::Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_streams",
                "-show_format",
            ])
            .arg(path)
            .output()
            .map_err(|e| LyricError::asset(format!("failed to run ffprobe: {e}")))?;
        if !out.status.success() {
            return Err(LyricError::asset(format!(
                "ffprobe failed for '{}': {}",
                path.display(),
                String::from_utf8_lossy(&out.stderr).trim()
            )));
        }

        let parsed: ProbeOut = serde_json::from_slice(&out.stdout).map_err(|e| {
            LyricError::asset(format!(
                "ffprobe json parse failed for '{}': {e}",
                path.display()
            ))
        })?;
        if !parsed
            .streams
            .iter()
            .any(|s| s.codec_type.as_deref() == Some("audio"))
        {
            return Err(LyricError::asset(format!(
                "'{}' has no audio stream",
                path.display()
            )));
        }
        parsed
            .format
            .and_then(|f| f.duration)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or_else(|| {
                LyricError::asset(format!(
                    "ffprobe reported no duration for '{}'",
                    path.display()
                ))
            })
    }
}
