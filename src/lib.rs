//! Lyricframe renders lyric videos: timed lines of text, animated by a
//! library of effects, composited over a background picture and encoded
//! to MP4 together with the song's audio.
//!
//! The pieces, bottom-up:
//!
//! - [`LyricSegment`]s come from a transcript ([`load_transcripts`], [`parse_srt`])
//! - [`EffectSpec`] turns a [`StyleConfig`] into one [`Effect`] per line
//! - [`TimedClip`]s place those effects on the song's timeline
//! - a [`Timeline`] composites the active clips over a [`Background`] into a [`FrameRGBA`]
//! - [`render_job`] streams every frame of a [`RenderJob`] into a [`FrameSink`]
//! - [`batch_generate`] runs one job per transcript entry with matching audio
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod clip;
mod compose;
mod config;
mod effects;
mod encode;
mod foundation;
mod lyrics;
mod render;
mod text;

pub use crate::foundation::color::Rgb8;
pub use crate::foundation::core::{Fps, FrameIndex, FrameRange, Resolution, Vec2};
pub use crate::foundation::error::{LyricError, LyricResult};
pub use crate::foundation::logging::init_logging;

pub use crate::config::app::{AppConfig, FolderConfig, LoggingConfig};
pub use crate::config::preset::{AUDIO_BITRATE_KBPS, AspectRatio, OutputPreset, QualityTier};
pub use crate::config::style::{DEFAULT_SHAKE_SEED, StyleConfig, TextPosition};

pub use crate::effects::kind::{ColorEffect, EffectKind, EffectSpec};
pub use crate::effects::library::Effect;
pub use crate::effects::transform::{BaseStyle, HaloLayer, Transform};

pub use crate::lyrics::segment::{LyricSegment, validate_segments};
pub use crate::lyrics::srt::{format_srt_time, parse_srt, parse_srt_time, save_srt, write_srt};
pub use crate::lyrics::transcript::{
    Transcripts, load_transcript, load_transcripts, save_transcript_json,
};

pub use crate::clip::timed::{ClipInterval, ClipStyle, TimedClip, build_clips};

pub use crate::assets::background::{
    BACKGROUND_EXTENSIONS, Background, CropRect, center_crop_rect, list_background_images,
    pick_background,
};
pub use crate::assets::font::{FontResolver, ResolvedFont, SystemFontResolver};
pub use crate::assets::media::{AudioProbe, FfprobeAudioProbe};

pub use crate::text::raster::{
    BlockRasterizerFactory, BlockTextRasterizer, FontRasterizerFactory, RasterizerFactory,
    TextRasterizer, TextSprite, VelloTextRasterizer,
};

pub use crate::compose::timeline::{ActiveClip, FrameRGBA, Timeline};

pub use crate::encode::ffmpeg::{
    FfmpegSink, FfmpegSinkFactory, FfmpegSinkOpts, ensure_parent_dir, is_ffmpeg_on_path,
};
pub use crate::encode::png::write_png;
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig, SinkFactory};

pub use crate::render::batch::{
    AUDIO_EXTENSIONS, AudioSearch, BatchFailure, BatchReport, BatchRequest, batch_generate,
    find_audio_for,
};
pub use crate::render::job::{
    CancelToken, JobStage, PreparedJob, RenderEvent, RenderEvents, RenderJob, RenderServices,
    output_file_name,
};
pub use crate::render::pipeline::{
    ENCODER_QUEUE_DEPTH, JobOutcome, RenderStats, RenderThreading, render_job, render_prepared,
    render_preview_frame,
};
