use std::path::PathBuf;

use crate::{
    compose::timeline::FrameRGBA,
    config::preset::OutputPreset,
    foundation::{
        core::FrameIndex,
        error::{LyricError, LyricResult},
    },
};

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Clone, Debug)]
pub struct SinkConfig {
    /// Output size, rate and bitrates.
    pub preset: OutputPreset,
    /// Audio track muxed into the output, re-encoded at the preset bitrate.
    pub audio: Option<PathBuf>,
    /// File the sink writes to. The pipeline points this at a temporary
    /// sibling of the final output and renames it once the sink has ended.
    pub out_path: PathBuf,
}

/// Consumer of rendered frames.
///
/// `push_frame` is called in strictly increasing [`FrameIndex`] order,
/// between one `begin` and one `end`. A sink dropped without `end` must not
/// leave a playable file behind.
pub trait FrameSink: Send {
    /// Start encoding to `cfg.out_path`.
    fn begin(&mut self, cfg: SinkConfig) -> LyricResult<()>;
    /// Write frame `idx`. Frames arrive in order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> LyricResult<()>;
    /// Finish the file.
    fn end(&mut self) -> LyricResult<()>;
}

/// Creates one sink per job.
pub trait SinkFactory: Send + Sync {
    /// New sink for one job.
    fn create(&self) -> LyricResult<Box<dyn FrameSink>>;
}

/// Sink that keeps every frame, for tests and previews.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, FrameRGBA)>,
    ended: bool,
}

impl InMemorySink {
    /// Empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Config passed to `begin`.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Frames received so far.
    pub fn frames(&self) -> &[(FrameIndex, FrameRGBA)] {
        &self.frames
    }

    /// Whether `end` was called.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> LyricResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.ended = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> LyricResult<()> {
        if self.cfg.is_none() {
            return Err(LyricError::render("in-memory sink not started"));
        }
        if let Some((last, _)) = self.frames.last()
            && idx.0 <= last.0
        {
            return Err(LyricError::render(format!(
                "in-memory sink received frame {} after frame {}",
                idx.0, last.0
            )));
        }
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> LyricResult<()> {
        self.ended = true;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
