use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{
    foundation::error::{LyricError, LyricResult},
    lyrics::{segment::LyricSegment, srt::parse_srt},
};

/// Transcripts keyed by audio basename, in sorted key order.
pub type Transcripts = BTreeMap<String, Vec<LyricSegment>>;

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum TranscriptJson {
    Bare(Vec<LyricSegment>),
    Wrapped { segments: Vec<LyricSegment> },
}

/// Read one transcript: `.srt`, or `.json` holding either a segment array
/// or an object with a `segments` array.
pub fn load_transcript(path: &Path) -> LyricResult<Vec<LyricSegment>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| LyricError::asset(format!("read transcript '{}': {e}", path.display())))?;
    match extension_lower(path).as_deref() {
        Some("srt") => parse_srt(&text)
            .map_err(|e| LyricError::asset(format!("parse '{}': {e}", path.display()))),
        Some("json") => {
            let parsed: TranscriptJson = serde_json::from_str(&text).map_err(|e| {
                LyricError::asset(format!("parse transcript '{}': {e}", path.display()))
            })?;
            Ok(match parsed {
                TranscriptJson::Bare(segments) | TranscriptJson::Wrapped { segments } => segments,
            })
        }
        _ => Err(LyricError::asset(format!(
            "unsupported transcript format '{}' (expected .srt or .json)",
            path.display()
        ))),
    }
}

/// Load every `.srt`/`.json` transcript in `dir`, keyed by file stem. When a
/// stem has both, the `.json` file wins.
///
/// A file that cannot be read or parsed is logged and left out; only an
/// unreadable folder is an error.
pub fn load_transcripts(dir: &Path) -> LyricResult<Transcripts> {
    let rd = std::fs::read_dir(dir).map_err(|e| {
        LyricError::config(format!("read transcript folder '{}': {e}", dir.display()))
    })?;

    let mut paths: Vec<PathBuf> = rd
        .flatten()
        .map(|e| e.path())
        .filter(|p| p.is_file() && matches!(extension_lower(p).as_deref(), Some("srt" | "json")))
        .collect();
    // srt before json within a stem, so json overwrites
    paths.sort_by_key(|p| {
        let json_last = extension_lower(p).as_deref() == Some("json");
        (p.file_stem().map(|s| s.to_os_string()), json_last)
    });

    let mut out = Transcripts::new();
    for path in paths {
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let segments = match load_transcript(&path) {
            Ok(segments) => segments,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping transcript");
                continue;
            }
        };
        tracing::debug!(key = stem, segments = segments.len(), path = %path.display(), "loaded transcript");
        out.insert(stem.to_string(), segments);
    }
    Ok(out)
}

/// Write segments as a JSON array.
pub fn save_transcript_json(segments: &[LyricSegment], path: &Path) -> LyricResult<()> {
    let json = serde_json::to_string_pretty(segments)
        .map_err(|e| LyricError::asset(format!("serialize transcript: {e}")))?;
    std::fs::write(path, json)
        .map_err(|e| LyricError::asset(format!("write transcript '{}': {e}", path.display())))
}

pub(crate) fn extension_lower(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
}

#[cfg(test)]
#[path = "../../tests/unit/lyrics/transcript.rs"]
mod tests;
