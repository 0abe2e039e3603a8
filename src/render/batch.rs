use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::{
    config::{
        preset::{AspectRatio, QualityTier},
        style::StyleConfig,
    },
    foundation::error::{LyricError, LyricResult},
    lyrics::{segment::LyricSegment, transcript::Transcripts},
    render::{
        job::{CancelToken, RenderEvent, RenderEvents, RenderJob, RenderServices, output_file_name},
        pipeline::{RenderThreading, build_thread_pool, render_job},
    },
};

/// Audio extensions tried, in order, when looking for a transcript's audio.
pub const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "wav", "flac", "ogg", "m4a"];

/// Where [`find_audio_for`] looks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AudioSearch {
    /// Audio file of an earlier single-file run; its folder is searched first.
    pub previous_audio: Option<PathBuf>,
    /// Folder of audio files; matched exactly, then by substring.
    pub audio_folder: Option<PathBuf>,
    /// Searched last.
    pub working_dir: PathBuf,
}

fn exact_in(dir: &Path, key: &str) -> Option<PathBuf> {
    AUDIO_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{key}.{ext}")))
        .find(|p| p.is_file())
}

fn has_audio_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| AUDIO_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
}

/// First audio file in `dir` (sorted by name) whose stem contains `key`.
fn fuzzy_in(dir: &Path, key: &str) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)
        .ok()?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && has_audio_extension(p))
        .collect();
    candidates.sort();
    candidates.into_iter().find(|p| {
        p.file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem.contains(key))
    })
}

/// Locate the audio file for transcript `key`.
///
/// Search order: the previous audio file's folder, the audio folder by
/// exact name, the audio folder by substring of the file stem, then the
/// working directory. The first existing file wins.
pub fn find_audio_for(key: &str, search: &AudioSearch) -> Option<PathBuf> {
    if let Some(dir) = search.previous_audio.as_deref().and_then(Path::parent)
        && let Some(found) = exact_in(dir, key)
    {
        return Some(found);
    }
    if let Some(folder) = search.audio_folder.as_deref() {
        if let Some(found) = exact_in(folder, key) {
            return Some(found);
        }
        if let Some(found) = fuzzy_in(folder, key) {
            return Some(found);
        }
    }
    exact_in(&search.working_dir, key)
}

/// Settings shared by every job of a batch.
#[derive(Clone, Debug)]
pub struct BatchRequest {
    /// Where audio is looked up.
    pub search: AudioSearch,
    /// Background image or folder.
    pub background: PathBuf,
    /// Seed for background folder picks.
    pub background_seed: u64,
    /// Folder receiving the videos.
    pub output_dir: PathBuf,
    /// Text style.
    pub style: StyleConfig,
    /// Frame shape.
    pub aspect: AspectRatio,
    /// Quality tier.
    pub quality: QualityTier,
    /// Frame rendering parallelism within each job.
    pub threading: RenderThreading,
    /// Jobs rendered at once; `1` runs the batch sequentially.
    pub max_parallel_jobs: usize,
}

/// One batch entry that produced no video.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BatchFailure {
    /// Transcript key.
    pub key: String,
    /// Rendered error.
    pub error: String,
}

/// What a batch produced. Successful outputs are always reported, whatever
/// happened to the other entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Videos written, in entry order.
    pub produced: Vec<PathBuf>,
    /// Keys with no matching audio file.
    pub skipped: Vec<String>,
    /// Entries that failed, including those not started after cancellation.
    pub failed: Vec<BatchFailure>,
    /// The cancel token tripped before every entry had run.
    pub cancelled: bool,
}

enum EntryOutcome {
    Produced(PathBuf),
    Skipped(String),
    Failed(BatchFailure),
}

impl BatchRequest {
    /// Fresh job for one transcript entry.
    pub fn job_for(&self, key: &str, audio_path: PathBuf, segments: Vec<LyricSegment>) -> RenderJob {
        RenderJob {
            key: key.to_string(),
            audio_path,
            segments,
            background: self.background.clone(),
            background_seed: self.background_seed,
            style: self.style.clone(),
            aspect: self.aspect,
            quality: self.quality,
            output_path: self.output_dir.join(output_file_name(key)),
        }
    }
}

/// Render one video per transcript entry whose audio can be found.
///
/// Entries without audio are skipped and entries that fail are recorded;
/// neither stops the batch. Cancellation stops starting new entries, but
/// the report still lists every video already produced. Only a failure
/// to create the output folder is returned as an error.
#[tracing::instrument(skip_all, fields(entries = transcripts.len()))]
pub fn batch_generate(
    transcripts: &Transcripts,
    request: &BatchRequest,
    services: &RenderServices,
    events: &RenderEvents,
    cancel: &CancelToken,
) -> LyricResult<BatchReport> {
    std::fs::create_dir_all(&request.output_dir).map_err(|e| {
        LyricError::config(format!(
            "create output folder '{}': {e}",
            request.output_dir.display()
        ))
    })?;

    let run = |(key, segments): (&String, &Vec<LyricSegment>)| -> EntryOutcome {
        run_entry(key, segments, request, services, events, cancel)
    };

    let outcomes: Vec<EntryOutcome> = if request.max_parallel_jobs > 1 {
        let pool = build_thread_pool(Some(request.max_parallel_jobs))?;
        let entries: Vec<_> = transcripts.iter().collect();
        pool.install(|| entries.into_par_iter().map(run).collect())
    } else {
        transcripts.iter().map(run).collect()
    };

    let mut report = BatchReport {
        cancelled: cancel.is_cancelled(),
        ..BatchReport::default()
    };
    for outcome in outcomes {
        match outcome {
            EntryOutcome::Produced(path) => report.produced.push(path),
            EntryOutcome::Skipped(key) => report.skipped.push(key),
            EntryOutcome::Failed(failure) => report.failed.push(failure),
        }
    }
    tracing::info!(
        produced = report.produced.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        cancelled = report.cancelled,
        "batch finished"
    );
    Ok(report)
}

fn run_entry(
    key: &str,
    segments: &[LyricSegment],
    request: &BatchRequest,
    services: &RenderServices,
    events: &RenderEvents,
    cancel: &CancelToken,
) -> EntryOutcome {
    if cancel.is_cancelled() {
        return EntryOutcome::Failed(BatchFailure {
            key: key.to_string(),
            error: LyricError::Cancelled.to_string(),
        });
    }

    let Some(audio) = find_audio_for(key, &request.search) else {
        let reason = format!("no audio file found for '{key}'");
        tracing::warn!(job = key, "{reason}, skipping");
        events.emit(RenderEvent::Skipped {
            job: key.to_string(),
            reason,
        });
        return EntryOutcome::Skipped(key.to_string());
    };
    tracing::info!(job = key, audio = %audio.display(), "audio matched");

    let job = request.job_for(key, audio.clone(), segments.to_vec());
    match render_job(&job, services, &request.threading, events, cancel) {
        Ok(outcome) => EntryOutcome::Produced(outcome.output),
        Err(e) => {
            tracing::warn!(job = key, audio = %audio.display(), error = %e, "video failed");
            EntryOutcome::Failed(BatchFailure {
                key: key.to_string(),
                error: e.to_string(),
            })
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/batch.rs"]
mod tests;
