use crate::foundation::error::{LyricError, LyricResult};

/// One timestamped lyric line, in seconds from the start of the audio.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LyricSegment {
    /// Line text.
    pub text: String,
    /// Start, in seconds.
    pub start: f64,
    /// End, in seconds.
    pub end: f64,
}

impl LyricSegment {
    /// Segment from text and bounds.
    pub fn new(text: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// `end - start`.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Require finite times with `0 <= start < end`.
    pub fn validate(&self) -> LyricResult<()> {
        if !self.start.is_finite() || !self.end.is_finite() {
            return Err(LyricError::asset(format!(
                "segment '{}' has non-finite bounds",
                self.text
            )));
        }
        if self.start < 0.0 {
            return Err(LyricError::asset(format!(
                "segment '{}' starts before 0 ({})",
                self.text, self.start
            )));
        }
        if self.end <= self.start {
            return Err(LyricError::asset(format!(
                "segment '{}' ends at {} which is not after its start {}",
                self.text, self.end, self.start
            )));
        }
        Ok(())
    }
}

/// Validate every segment, naming the first bad one by position.
pub fn validate_segments(segments: &[LyricSegment]) -> LyricResult<()> {
    for (i, seg) in segments.iter().enumerate() {
        seg.validate()
            .map_err(|e| LyricError::asset(format!("segment #{}: {e}", i + 1)))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/lyrics/segment.rs"]
mod tests;
