use std::sync::Arc;

use crate::{
    config::style::TextPosition,
    effects::{
        kind::{EffectKind, EffectSpec},
        library::Effect,
        transform::{BaseStyle, Transform},
    },
    lyrics::segment::LyricSegment,
};

/// Resolved style shared by every clip of a job.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipStyle {
    /// Base colour and size handed to the effect.
    pub base: BaseStyle,
    /// Vertical placement.
    pub position: TextPosition,
}

/// Half-open `[start, end)` interval in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipInterval {
    /// Start, in seconds.
    pub start: f64,
    /// Exclusive end, in seconds.
    pub end: f64,
}

impl ClipInterval {
    /// Return `true` when `t` is inside `[start, end)`.
    pub fn contains(self, t: f64) -> bool {
        self.start <= t && t < self.end
    }

    /// Interval length in seconds.
    pub fn duration(self) -> f64 {
        self.end - self.start
    }
}

/// A lyric line bound to its interval and effect.
///
/// Immutable after construction; [`TimedClip::evaluate`] is a pure function
/// of the query time.
#[derive(Clone, Debug)]
pub struct TimedClip {
    index: usize,
    text: Arc<str>,
    style: Arc<ClipStyle>,
    interval: ClipInterval,
    kind: EffectKind,
    effect: Arc<dyn Effect>,
}

impl TimedClip {
    /// Build the clip for segment `index`, clipping its interval to
    /// `[0, audio_duration]`. Returns `None` when nothing of the segment
    /// remains on the timeline.
    pub fn new(
        index: usize,
        segment: &LyricSegment,
        style: Arc<ClipStyle>,
        spec: &EffectSpec,
        audio_duration: f64,
    ) -> Option<Self> {
        let interval = ClipInterval {
            start: segment.start.max(0.0),
            end: segment.end.min(audio_duration),
        };
        if !(interval.end > interval.start) {
            return None;
        }

        let text: Arc<str> = if segment.text.is_empty() && spec.kind == EffectKind::Typing {
            Arc::from(" ")
        } else {
            Arc::from(segment.text.as_str())
        };
        let effect = spec.build(&text, index);

        Some(Self {
            index,
            text,
            style,
            interval,
            kind: spec.kind,
            effect,
        })
    }

    /// Position of the source segment in the transcript.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Line text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Style the clip was built with.
    pub fn style(&self) -> &ClipStyle {
        &self.style
    }

    /// Active interval after clipping to the audio length.
    pub fn interval(&self) -> ClipInterval {
        self.interval
    }

    /// Effect tag the clip was built from.
    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    /// Return `true` when the clip is visible at absolute time `t`.
    pub fn contains(&self, t: f64) -> bool {
        self.interval.contains(t)
    }

    /// Whether the effect positions the text itself.
    pub fn manages_position(&self) -> bool {
        self.effect.manages_position()
    }

    /// Transform at absolute time `t`, or `None` outside the interval.
    pub fn evaluate(&self, t: f64) -> Option<Transform> {
        if !self.contains(t) {
            return None;
        }
        let t_local = t - self.interval.start;
        Some(
            self.effect
                .evaluate(t_local, self.interval.duration(), &self.style.base)
                .sanitized(),
        )
    }

    /// Text to draw under `tr`, honouring a character reveal limit.
    pub fn visible_text<'a>(&'a self, tr: &Transform) -> &'a str {
        match tr.reveal_chars {
            None => &self.text,
            Some(n) => match self.text.char_indices().nth(n) {
                Some((byte, _)) => &self.text[..byte],
                None => &self.text,
            },
        }
    }
}

/// Build clips for every segment, dropping those that fall outside the audio.
pub fn build_clips(
    segments: &[LyricSegment],
    style: Arc<ClipStyle>,
    spec: &EffectSpec,
    audio_duration: f64,
) -> Vec<TimedClip> {
    segments
        .iter()
        .enumerate()
        .filter_map(|(i, seg)| {
            let clip = TimedClip::new(i, seg, style.clone(), spec, audio_duration);
            if clip.is_none() {
                tracing::debug!(
                    segment = i + 1,
                    start = seg.start,
                    audio_duration,
                    "segment lies past the end of the audio, dropped"
                );
            }
            clip
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/clip/timed.rs"]
mod tests;
