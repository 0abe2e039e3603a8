use std::{
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
        mpsc::Sender,
    },
};

use crate::{
    assets::{
        background::{Background, pick_background},
        font::SystemFontResolver,
        media::{AudioProbe, FfprobeAudioProbe},
    },
    clip::timed::{ClipStyle, build_clips},
    compose::timeline::Timeline,
    config::{
        preset::{AspectRatio, OutputPreset, QualityTier},
        style::StyleConfig,
    },
    effects::{kind::EffectSpec, transform::BaseStyle},
    encode::{ffmpeg::FfmpegSinkFactory, sink::SinkFactory},
    foundation::error::{LyricError, LyricResult},
    lyrics::segment::{LyricSegment, validate_segments},
    render::pipeline::RenderStats,
    text::raster::{FontRasterizerFactory, RasterizerFactory, TextRasterizer},
};

/// Lifecycle of one render job.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobStage {
    /// Not started.
    Idle,
    /// Resolving the background, validating segments, building clips.
    Preparing,
    /// Rendering frames and feeding the encoder.
    Rendering,
    /// Flushing the encoder and moving the file into place.
    Encoding,
    /// Output in place.
    Done,
    /// Stopped with an error.
    Failed,
}

impl JobStage {
    /// Return `true` for `Done` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Progress and outcome messages emitted while jobs run.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderEvent {
    /// A job moved to `stage`.
    Stage {
        /// Job key.
        job: String,
        /// New stage.
        stage: JobStage,
    },
    /// Frames handed to the encoder so far.
    Progress {
        /// Job key.
        job: String,
        /// Frames done.
        frames_done: u64,
        /// Frames in the job.
        frames_total: u64,
    },
    /// A batch entry with no matching audio file.
    Skipped {
        /// Transcript key.
        job: String,
        /// Why it was skipped.
        reason: String,
    },
    /// A job failed.
    Failed {
        /// Job key.
        job: String,
        /// Rendered error.
        error: String,
    },
    /// A video was written.
    Finished {
        /// Job key.
        job: String,
        /// Final output path.
        output: PathBuf,
        /// Frame counts.
        stats: RenderStats,
    },
}

/// Optional channel for [`RenderEvent`]s.
///
/// Sending never fails the job: once the receiver is gone events are
/// dropped.
#[derive(Clone, Debug, Default)]
pub struct RenderEvents(Option<Sender<RenderEvent>>);

impl RenderEvents {
    /// Events go to `tx`.
    pub fn new(tx: Sender<RenderEvent>) -> Self {
        Self(Some(tx))
    }

    /// Events are discarded.
    pub fn none() -> Self {
        Self(None)
    }

    /// Send `event` if anyone is listening.
    pub fn emit(&self, event: RenderEvent) {
        if let Some(tx) = &self.0 {
            let _ = tx.send(event);
        }
    }

    pub(crate) fn stage(&self, job: &str, stage: JobStage) {
        self.emit(RenderEvent::Stage {
            job: job.to_string(),
            stage,
        });
    }
}

/// Job-scoped cancellation flag, checked between frames.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Token that has not been tripped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the token. Running jobs stop at the next frame.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Return `true` once tripped.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` once tripped.
    pub fn check(&self) -> LyricResult<()> {
        if self.is_cancelled() {
            Err(LyricError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Collaborators a job needs from the outside world.
#[derive(Clone)]
pub struct RenderServices {
    /// Reads audio durations.
    pub probe: Arc<dyn AudioProbe>,
    /// Builds the text rasterizer per job.
    pub rasterizers: Arc<dyn RasterizerFactory>,
    /// Builds the encoder sink per job.
    pub sinks: Arc<dyn SinkFactory>,
}

impl RenderServices {
    /// `ffprobe` for durations, system fonts (plus `font_dir`) for text and
    /// `ffmpeg` for encoding.
    pub fn system(font_dir: Option<&Path>) -> Self {
        let fonts = Arc::new(SystemFontResolver::new(font_dir));
        Self {
            probe: Arc::new(FfprobeAudioProbe),
            rasterizers: Arc::new(FontRasterizerFactory::new(fonts)),
            sinks: Arc::new(FfmpegSinkFactory::default()),
        }
    }
}

impl std::fmt::Debug for RenderServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderServices").finish_non_exhaustive()
    }
}

/// Everything needed to produce one output video.
///
/// Built fresh for every output; nothing in it is mutated while rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderJob {
    /// Audio basename, used in output names, logs and events.
    pub key: String,
    /// Song audio, muxed into the video.
    pub audio_path: PathBuf,
    /// Lyric lines.
    pub segments: Vec<LyricSegment>,
    /// A single image or a folder of images.
    pub background: PathBuf,
    /// Mixed with `key` when a background folder needs a pick.
    pub background_seed: u64,
    /// Text style.
    pub style: StyleConfig,
    /// Frame shape.
    pub aspect: AspectRatio,
    /// Resolution and bitrate tier.
    pub quality: QualityTier,
    /// Final video path.
    pub output_path: PathBuf,
}

/// Output name for an audio basename.
pub fn output_file_name(key: &str) -> String {
    format!("{key}_lyric_video.mp4")
}

impl RenderJob {
    /// Output preset for this job's shape and tier.
    pub fn preset(&self) -> OutputPreset {
        OutputPreset::new(self.aspect, self.quality)
    }

    /// Resolve every input into a ready-to-render timeline.
    #[tracing::instrument(skip_all, fields(job = %self.key))]
    pub fn prepare(&self, services: &RenderServices) -> LyricResult<PreparedJob> {
        self.style.validate()?;
        let spec = EffectSpec::resolve(&self.style)?;
        validate_segments(&self.segments)?;

        let preset = self.preset();
        let canvas = preset.resolution;

        let audio_duration = services.probe.duration_secs(&self.audio_path)?;
        if !audio_duration.is_finite() || audio_duration < 0.0 {
            return Err(LyricError::asset(format!(
                "audio '{}' reports an invalid duration {audio_duration}",
                self.audio_path.display()
            )));
        }

        let bg_path = pick_background(&self.background, &self.key, self.background_seed)?;
        let background = Background::load(&bg_path, canvas)?;
        tracing::debug!(background = %bg_path.display(), %canvas, "background framed");

        let style = Arc::new(ClipStyle {
            base: BaseStyle {
                color: self.style.color,
                font_size_px: self.style.font_size_px,
                canvas,
            },
            position: self.style.position,
        });
        let clips = build_clips(&self.segments, style, &spec, audio_duration);
        let timeline = Timeline::new(Arc::new(background), clips)?;
        let rasterizer = services
            .rasterizers
            .create(&self.style.font_family, canvas)?;

        let total_frames = preset.fps.secs_to_frames_floor(audio_duration).max(1);
        tracing::info!(
            clips = timeline.clips().len(),
            total_frames,
            audio_duration,
            effect = spec.kind.name(),
            "job prepared"
        );

        Ok(PreparedJob {
            key: self.key.clone(),
            preset,
            audio_path: self.audio_path.clone(),
            output_path: self.output_path.clone(),
            audio_duration,
            total_frames,
            timeline,
            rasterizer: Mutex::new(rasterizer),
        })
    }
}

/// A job whose inputs are loaded and whose clips are built.
pub struct PreparedJob {
    /// Job key.
    pub key: String,
    /// Output size, rate and bitrates.
    pub preset: OutputPreset,
    /// Song audio.
    pub audio_path: PathBuf,
    /// Final video path.
    pub output_path: PathBuf,
    /// Probed audio length in seconds.
    pub audio_duration: f64,
    /// `max(1, floor(duration * 30))`.
    pub total_frames: u64,
    /// Background plus clips.
    pub timeline: Timeline,
    /// Prototype that render workers fork their own rasterizer from.
    pub(crate) rasterizer: Mutex<Box<dyn TextRasterizer>>,
}

impl PreparedJob {
    pub(crate) fn fork_rasterizer(&self) -> LyricResult<Box<dyn TextRasterizer>> {
        let proto = self
            .rasterizer
            .lock()
            .map_err(|_| LyricError::render("text rasterizer lock poisoned"))?;
        proto.fork()
    }
}

impl std::fmt::Debug for PreparedJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedJob")
            .field("key", &self.key)
            .field("preset", &self.preset)
            .field("total_frames", &self.total_frames)
            .field("clips", &self.timeline.clips().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/job.rs"]
mod tests;
