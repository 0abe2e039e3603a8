//! SubRip serialization of lyric segments.
//!
//! Output blocks are `index`, `HH:MM:SS,mmm --> HH:MM:SS,mmm`, `text`, blank
//! line, numbered from 1.

use std::path::Path;

use crate::{
    foundation::error::{LyricError, LyricResult},
    lyrics::segment::LyricSegment,
};

/// Serialize segments as SubRip text.
pub fn write_srt(segments: &[LyricSegment]) -> String {
    let mut output = String::new();

    for (i, segment) in segments.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_srt_time(segment.start),
            format_srt_time(segment.end),
        ));
        output.push_str(&segment.text);
        output.push_str("\n\n");
    }

    output
}

/// Seconds as `HH:MM:SS,mmm`. Rounded to the microsecond, then truncated to
/// the millisecond.
pub fn format_srt_time(secs: f64) -> String {
    let micros = (secs.max(0.0) * 1_000_000.0).round() as u64;
    let total_ms = micros / 1000;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

/// Parse `HH:MM:SS,mmm` (a `.` separator is tolerated).
pub fn parse_srt_time(s: &str) -> Option<f64> {
    let s = s.trim();
    let (hms, ms) = s.split_once([',', '.']).unwrap_or((s, "0"));
    let mut parts = hms.split(':');
    let h: u64 = parts.next()?.trim().parse().ok()?;
    let m: u64 = parts.next()?.trim().parse().ok()?;
    let sec: u64 = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() || m >= 60 || sec >= 60 {
        return None;
    }
    let ms_digits = ms.trim();
    if ms_digits.is_empty() || ms_digits.len() > 3 || !ms_digits.bytes().all(|b| b.is_ascii_digit())
    {
        return None;
    }
    // "5" after the comma means 500ms
    let ms: u64 = format!("{ms_digits:0<3}").parse().ok()?;
    Some((h * 3600 + m * 60 + sec) as f64 + ms as f64 / 1000.0)
}

/// Parse SubRip text. Index lines are optional; multi-line cue text is
/// joined with `\n`.
pub fn parse_srt(text: &str) -> LyricResult<Vec<LyricSegment>> {
    let text = text.trim_start_matches('\u{feff}').replace("\r\n", "\n");
    let mut segments = Vec::new();

    for (block_no, block) in text.split("\n\n").enumerate() {
        let mut lines = block.lines().filter(|l| !l.trim().is_empty()).peekable();
        let Some(first) = lines.peek().copied() else {
            continue;
        };
        if !first.contains("-->") {
            lines.next();
        }
        let Some(timing) = lines.next() else {
            return Err(LyricError::asset(format!(
                "srt block {} has no timing line",
                block_no + 1
            )));
        };
        let (a, b) = timing.split_once("-->").ok_or_else(|| {
            LyricError::asset(format!(
                "srt block {}: malformed timing line '{timing}'",
                block_no + 1
            ))
        })?;
        let (Some(start), Some(end)) = (parse_srt_time(a), parse_srt_time(b)) else {
            return Err(LyricError::asset(format!(
                "srt block {}: malformed timestamp in '{timing}'",
                block_no + 1
            )));
        };
        let body = lines.collect::<Vec<_>>().join("\n");
        segments.push(LyricSegment::new(body, start, end));
    }

    Ok(segments)
}

/// Write segments as an `.srt` file.
pub fn save_srt(segments: &[LyricSegment], path: &Path) -> LyricResult<()> {
    std::fs::write(path, write_srt(segments))
        .map_err(|e| LyricError::asset(format!("write srt '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/lyrics/srt.rs"]
mod tests;
