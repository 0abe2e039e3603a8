use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, mpsc},
};

use rayon::prelude::*;

use crate::{
    compose::{fingerprint::FrameFingerprint, timeline::FrameRGBA},
    encode::sink::{FrameSink, SinkConfig},
    foundation::{
        core::{FrameIndex, FrameRange},
        error::{LyricError, LyricResult},
    },
    render::job::{CancelToken, JobStage, PreparedJob, RenderEvent, RenderEvents, RenderJob, RenderServices},
};

/// Frames the encoder may lag behind rendering before workers block.
pub const ENCODER_QUEUE_DEPTH: usize = 4;

/// Threading and chunking controls for frame rendering.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderThreading {
    /// Render the frames of a chunk on a worker pool.
    pub parallel: bool,
    /// Frames scheduled together; also the progress-event granularity.
    pub chunk_size: usize,
    /// Worker count; `None` lets rayon decide.
    pub threads: Option<usize>,
    /// Render identical frames within a chunk once.
    pub static_frame_elision: bool,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: true,
            chunk_size: 64,
            threads: None,
            static_frame_elision: true,
        }
    }
}

/// Aggregated rendering counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Frames in the job.
    pub frames_total: u64,
    /// Frames actually rasterized.
    pub frames_rendered: u64,
    /// Frames reused from an identical earlier frame of the same chunk.
    pub frames_elided: u64,
}

impl RenderStats {
    fn absorb(&mut self, other: RenderStats) {
        self.frames_total += other.frames_total;
        self.frames_rendered += other.frames_rendered;
        self.frames_elided += other.frames_elided;
    }
}

/// Result of a finished job.
#[derive(Clone, Debug, PartialEq)]
pub struct JobOutcome {
    /// Final output path.
    pub output: PathBuf,
    /// Frame counts.
    pub stats: RenderStats,
}

/// Prepare, render and encode one job with a sink from `services`.
///
/// Emits stage events from `Preparing` through `Done` or `Failed`.
#[tracing::instrument(skip_all, fields(job = %job.key))]
pub fn render_job(
    job: &RenderJob,
    services: &RenderServices,
    threading: &RenderThreading,
    events: &RenderEvents,
    cancel: &CancelToken,
) -> LyricResult<JobOutcome> {
    let result = run_stages(job, services, threading, events, cancel);

    match &result {
        Ok(outcome) => {
            events.stage(&job.key, JobStage::Done);
            events.emit(RenderEvent::Finished {
                job: job.key.clone(),
                output: outcome.output.clone(),
                stats: outcome.stats,
            });
            tracing::info!(
                output = %outcome.output.display(),
                frames = outcome.stats.frames_total,
                elided = outcome.stats.frames_elided,
                "video written"
            );
        }
        Err(e) => {
            events.stage(&job.key, JobStage::Failed);
            events.emit(RenderEvent::Failed {
                job: job.key.clone(),
                error: e.to_string(),
            });
        }
    }
    result
}

fn run_stages(
    job: &RenderJob,
    services: &RenderServices,
    threading: &RenderThreading,
    events: &RenderEvents,
    cancel: &CancelToken,
) -> LyricResult<JobOutcome> {
    events.stage(&job.key, JobStage::Preparing);
    cancel.check()?;
    let prepared = job.prepare(services)?;
    let mut sink = services.sinks.create()?;
    let stats = render_prepared(&prepared, sink.as_mut(), threading, events, cancel)?;
    Ok(JobOutcome {
        output: prepared.output_path.clone(),
        stats,
    })
}

/// Render every frame of `prepared` into `sink`.
///
/// The sink writes to a temporary sibling of the output path, which is
/// renamed into place only after the sink has ended cleanly. On error or
/// cancellation the temporary file is removed.
pub fn render_prepared(
    prepared: &PreparedJob,
    sink: &mut dyn FrameSink,
    threading: &RenderThreading,
    events: &RenderEvents,
    cancel: &CancelToken,
) -> LyricResult<RenderStats> {
    let key = prepared.key.as_str();
    let staging = staging_path(&prepared.output_path)?;
    let mut guard = TempFileGuard(Some(staging.clone()));

    sink.begin(SinkConfig {
        preset: prepared.preset,
        audio: Some(prepared.audio_path.clone()),
        out_path: staging.clone(),
    })?;

    events.stage(key, JobStage::Rendering);
    let (tx, rx) = mpsc::sync_channel::<(FrameIndex, Arc<FrameRGBA>)>(ENCODER_QUEUE_DEPTH);

    let (produced, written) = std::thread::scope(|s| {
        let writer = s.spawn(|| -> LyricResult<()> {
            for (idx, frame) in rx {
                sink.push_frame(idx, &frame)?;
            }
            Ok(())
        });
        let produced = produce_frames(prepared, threading, events, cancel, &tx);
        drop(tx);
        let written = writer
            .join()
            .unwrap_or_else(|_| Err(LyricError::render("encoder thread panicked")));
        (produced, written)
    });

    // a sink failure closes the queue, so report its error over the
    // producer's "queue closed"
    written?;
    let stats = produced?;
    cancel.check()?;

    events.stage(key, JobStage::Encoding);
    sink.end()?;

    if staging.exists() {
        std::fs::rename(&staging, &prepared.output_path).map_err(|e| {
            LyricError::render(format!(
                "move '{}' to '{}': {e}",
                staging.display(),
                prepared.output_path.display()
            ))
        })?;
    } else {
        tracing::debug!("sink wrote no file, nothing to move");
    }
    guard.0 = None;
    Ok(stats)
}

fn produce_frames(
    prepared: &PreparedJob,
    threading: &RenderThreading,
    events: &RenderEvents,
    cancel: &CancelToken,
    tx: &mpsc::SyncSender<(FrameIndex, Arc<FrameRGBA>)>,
) -> LyricResult<RenderStats> {
    let range = FrameRange::new(FrameIndex(0), FrameIndex(prepared.total_frames))?;
    let chunk_size = normalized_chunk_size(threading.chunk_size);
    let pool = if threading.parallel {
        Some(build_thread_pool(threading.threads)?)
    } else {
        None
    };

    let mut stats = RenderStats::default();
    for chunk in range.chunks(chunk_size) {
        cancel.check()?;
        let out = match &pool {
            Some(pool) => render_chunk_parallel_unique(prepared, chunk, threading, pool, cancel)?,
            None => render_chunk_sequential(prepared, chunk, cancel)?,
        };

        for (offset, &u) in out.frame_to_unique.iter().enumerate() {
            let frame = out.unique_frames.get(u).ok_or_else(|| {
                LyricError::render("internal error: unique frame index out of range")
            })?;
            let idx = FrameIndex(chunk.start.0 + offset as u64);
            tx.send((idx, Arc::clone(frame)))
                .map_err(|_| LyricError::render("encoder queue closed"))?;
        }

        stats.absorb(out.stats);
        events.emit(RenderEvent::Progress {
            job: prepared.key.clone(),
            frames_done: chunk.end.0,
            frames_total: prepared.total_frames,
        });
        tracing::debug!(frames_done = chunk.end.0, total = prepared.total_frames, "chunk rendered");
    }
    Ok(stats)
}

fn frame_time(prepared: &PreparedJob, f: u64) -> f64 {
    prepared.preset.fps.frames_to_secs(f)
}

struct ChunkOut {
    unique_frames: Vec<Arc<FrameRGBA>>,
    frame_to_unique: Vec<usize>,
    stats: RenderStats,
}

fn render_chunk_sequential(
    prepared: &PreparedJob,
    range: FrameRange,
    cancel: &CancelToken,
) -> LyricResult<ChunkOut> {
    let mut rasterizer = prepared
        .rasterizer
        .lock()
        .map_err(|_| LyricError::render("text rasterizer lock poisoned"))?;
    let mut unique_frames = Vec::with_capacity(range.len_frames() as usize);
    for f in range.start.0..range.end.0 {
        cancel.check()?;
        let frame = prepared
            .timeline
            .render_frame(frame_time(prepared, f), &mut **rasterizer)?;
        unique_frames.push(Arc::new(frame));
    }
    let total = range.len_frames();
    Ok(ChunkOut {
        frame_to_unique: (0..unique_frames.len()).collect(),
        unique_frames,
        stats: RenderStats {
            frames_total: total,
            frames_rendered: total,
            frames_elided: 0,
        },
    })
}

fn render_chunk_parallel_unique(
    prepared: &PreparedJob,
    range: FrameRange,
    threading: &RenderThreading,
    pool: &rayon::ThreadPool,
    cancel: &CancelToken,
) -> LyricResult<ChunkOut> {
    let frames: Vec<u64> = (range.start.0..range.end.0).collect();

    let mut unique_indices = Vec::<usize>::with_capacity(frames.len());
    let mut frame_to_unique = Vec::<usize>::with_capacity(frames.len());
    if threading.static_frame_elision {
        let mut first = HashMap::<FrameFingerprint, usize>::new();
        for (idx, &f) in frames.iter().enumerate() {
            let fingerprint = prepared.timeline.fingerprint(frame_time(prepared, f));
            if let Some(existing) = first.get(&fingerprint).copied() {
                frame_to_unique.push(existing);
            } else {
                let slot = unique_indices.len();
                unique_indices.push(idx);
                first.insert(fingerprint, slot);
                frame_to_unique.push(slot);
            }
        }
    } else {
        for idx in 0..frames.len() {
            frame_to_unique.push(idx);
            unique_indices.push(idx);
        }
    }

    let rendered = pool.install(|| {
        unique_indices
            .par_iter()
            .map_init(
                || prepared.fork_rasterizer(),
                |worker, &idx| -> LyricResult<Arc<FrameRGBA>> {
                    cancel.check()?;
                    let rasterizer = worker
                        .as_mut()
                        .map_err(|e| LyricError::render(format!("fork text rasterizer: {e}")))?;
                    let t = frame_time(prepared, frames[idx]);
                    Ok(Arc::new(prepared.timeline.render_frame(t, &mut **rasterizer)?))
                },
            )
            .collect::<Vec<_>>()
    });

    let mut unique_frames = Vec::with_capacity(rendered.len());
    for item in rendered {
        unique_frames.push(item?);
    }

    let total = frames.len() as u64;
    let rendered_count = unique_indices.len() as u64;
    Ok(ChunkOut {
        unique_frames,
        frame_to_unique,
        stats: RenderStats {
            frames_total: total,
            frames_rendered: rendered_count,
            frames_elided: total.saturating_sub(rendered_count),
        },
    })
}

/// Render the single frame at `t` seconds, for previews.
pub fn render_preview_frame(prepared: &PreparedJob, t: f64) -> LyricResult<FrameRGBA> {
    let mut rasterizer = prepared.fork_rasterizer()?;
    prepared.timeline.render_frame(t, rasterizer.as_mut())
}

/// `dir/.name.partial` next to `output`.
pub(crate) fn staging_path(output: &Path) -> LyricResult<PathBuf> {
    let name = output.file_name().ok_or_else(|| {
        LyricError::config(format!("output path '{}' has no file name", output.display()))
    })?;
    let mut staged = std::ffi::OsString::from(".");
    staged.push(name);
    staged.push(".partial");
    Ok(output.with_file_name(staged))
}

pub(crate) fn build_thread_pool(threads: Option<usize>) -> LyricResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(LyricError::config(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| LyricError::render(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> u64 {
    chunk_size.max(1) as u64
}

struct TempFileGuard(Option<PathBuf>);

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
