use std::{
    path::{Path, PathBuf},
    sync::{Arc, mpsc},
    thread::JoinHandle,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use lyricframe::{
    AppConfig, AspectRatio, AudioProbe, AudioSearch, BatchRequest, CancelToken, LyricResult,
    QualityTier, RenderEvent, RenderEvents, RenderJob, RenderServices, Rgb8, TextPosition,
};

#[derive(Parser, Debug)]
#[command(name = "lyricframe", version, about = "Render lyric videos from transcripts")]
struct Cli {
    /// JSON settings file; flags override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (e.g. `debug`).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit JSON log lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one video from an audio file and its transcript (requires ffmpeg).
    Render(RenderArgs),
    /// Render a video for every transcript in a folder that has matching audio.
    Batch(BatchArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Convert a JSON transcript to SRT.
    Srt(SrtArgs),
}

#[derive(clap::Args, Debug, Default)]
struct StyleArgs {
    /// Text effect (`fade_in`, `typing`, `slide_left`, `glow`, ...).
    #[arg(long)]
    effect: Option<String>,
    /// Colour effect (`none`, `rainbow`, `gradient`, `pulse`, `spectrum`).
    #[arg(long)]
    color_effect: Option<String>,
    /// Font family name or font file path.
    #[arg(long)]
    font: Option<String>,
    #[arg(long)]
    font_size: Option<f64>,
    /// `#RRGGBB`, `#RGB` or a colour name.
    #[arg(long)]
    color: Option<String>,
    /// `top`, `center` or `bottom`.
    #[arg(long)]
    position: Option<String>,
    /// `landscape` or `portrait`.
    #[arg(long)]
    aspect: Option<String>,
    /// `720p`, `1080p` or `4k`.
    #[arg(long)]
    quality: Option<String>,
    /// Background image or folder of images.
    #[arg(long)]
    background: Option<PathBuf>,
    /// Render frames on one thread.
    #[arg(long)]
    sequential: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[arg(long)]
    audio: PathBuf,
    /// `.srt` or `.json` transcript.
    #[arg(long)]
    transcript: PathBuf,
    /// Output MP4; defaults to `<output folder>/<audio name>_lyric_video.mp4`.
    #[arg(long)]
    out: Option<PathBuf>,
    #[command(flatten)]
    style: StyleArgs,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Folder of `.srt`/`.json` transcripts named after their audio files.
    #[arg(long)]
    transcripts: PathBuf,
    #[arg(long)]
    audio_folder: Option<PathBuf>,
    /// An audio file from an earlier run; its folder is searched first.
    #[arg(long)]
    previous_audio: Option<PathBuf>,
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Videos rendered at once.
    #[arg(long, default_value_t = 1)]
    jobs: usize,
    #[command(flatten)]
    style: StyleArgs,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// `.srt` or `.json` transcript.
    #[arg(long)]
    transcript: PathBuf,
    /// Time in seconds.
    #[arg(long)]
    at: f64,
    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
    /// Audio file bounding the timeline; defaults to the last line's end.
    #[arg(long)]
    audio: Option<PathBuf>,
    #[command(flatten)]
    style: StyleArgs,
}

#[derive(Parser, Debug)]
struct SrtArgs {
    /// JSON transcript.
    #[arg(long = "in")]
    in_path: PathBuf,
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    if cli.json_logs {
        config.logging.json = true;
    }
    lyricframe::init_logging(&config.logging);

    match cli.cmd {
        Command::Render(args) => cmd_render(config, args),
        Command::Batch(args) => cmd_batch(config, args),
        Command::Frame(args) => cmd_frame(config, args),
        Command::Srt(args) => cmd_srt(args),
    }
}

fn apply_style(config: &mut AppConfig, args: &StyleArgs) -> anyhow::Result<()> {
    let style = &mut config.style;
    if let Some(v) = &args.effect {
        style.effect_name = v.clone();
    }
    if let Some(v) = &args.color_effect {
        style.color_effect_name = v.clone();
    }
    if let Some(v) = &args.font {
        style.font_family = v.clone();
    }
    if let Some(v) = args.font_size {
        style.font_size_px = v;
    }
    if let Some(v) = &args.color {
        style.color = Rgb8::parse(v)?;
    }
    if let Some(v) = &args.position {
        style.position = v.parse::<TextPosition>()?;
    }
    if let Some(v) = &args.aspect {
        config.aspect = v.parse::<AspectRatio>()?;
    }
    if let Some(v) = &args.quality {
        config.quality = QualityTier::parse_or_default(v);
    }
    if let Some(v) = &args.background {
        config.folders.backgrounds = Some(v.clone());
    }
    if args.sequential {
        config.render.parallel = false;
    }
    config.validate()?;
    Ok(())
}

fn background_of(config: &AppConfig) -> anyhow::Result<PathBuf> {
    config
        .folders
        .backgrounds
        .clone()
        .context("no background given (use --background or folders.backgrounds)")
}

fn audio_key(path: &Path) -> anyhow::Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .with_context(|| format!("audio path '{}' has no usable file name", path.display()))
}

/// Log events on a dedicated thread until every sender is gone.
fn spawn_event_logger() -> (RenderEvents, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel::<RenderEvent>();
    let handle = std::thread::spawn(move || {
        for event in rx {
            match event {
                RenderEvent::Stage { job, stage } => tracing::info!(%job, ?stage, "stage"),
                RenderEvent::Progress {
                    job,
                    frames_done,
                    frames_total,
                } => {
                    let pct = 100.0 * frames_done as f64 / frames_total.max(1) as f64;
                    tracing::info!(%job, frames_done, frames_total, "{pct:.0}%");
                }
                RenderEvent::Skipped { job, reason } => tracing::warn!(%job, "skipped: {reason}"),
                RenderEvent::Failed { job, error } => tracing::error!(%job, "failed: {error}"),
                RenderEvent::Finished { job, output, stats } => tracing::info!(
                    %job,
                    output = %output.display(),
                    rendered = stats.frames_rendered,
                    elided = stats.frames_elided,
                    "finished"
                ),
            }
        }
    });
    (RenderEvents::new(tx), handle)
}

fn finish_events(events: RenderEvents, handle: JoinHandle<()>) {
    drop(events);
    if handle.join().is_err() {
        eprintln!("event logger thread panicked");
    }
}

fn cmd_render(mut config: AppConfig, args: RenderArgs) -> anyhow::Result<()> {
    apply_style(&mut config, &args.style)?;
    let key = audio_key(&args.audio)?;
    let segments = lyricframe::load_transcript(&args.transcript)?;
    let output_path = args.out.unwrap_or_else(|| {
        config
            .folders
            .output
            .join(lyricframe::output_file_name(&key))
    });
    let job = RenderJob {
        key,
        audio_path: args.audio,
        segments,
        background: background_of(&config)?,
        background_seed: config.style.shake_seed,
        style: config.style.clone(),
        aspect: config.aspect,
        quality: config.quality,
        output_path,
    };

    let services = RenderServices::system(config.folders.fonts.as_deref());
    let (events, logger) = spawn_event_logger();
    let result = lyricframe::render_job(&job, &services, &config.render, &events, &CancelToken::new());
    finish_events(events, logger);

    let outcome = result?;
    println!("{}", outcome.output.display());
    Ok(())
}

fn cmd_batch(mut config: AppConfig, args: BatchArgs) -> anyhow::Result<()> {
    apply_style(&mut config, &args.style)?;
    let transcripts = lyricframe::load_transcripts(&args.transcripts)?;
    let request = BatchRequest {
        search: AudioSearch {
            previous_audio: args.previous_audio,
            audio_folder: args.audio_folder.or_else(|| config.folders.audio.clone()),
            working_dir: std::env::current_dir().context("read current directory")?,
        },
        background: background_of(&config)?,
        background_seed: config.style.shake_seed,
        output_dir: args.out_dir.unwrap_or_else(|| config.folders.output.clone()),
        style: config.style.clone(),
        aspect: config.aspect,
        quality: config.quality,
        threading: config.render.clone(),
        max_parallel_jobs: args.jobs.max(1),
    };

    let services = RenderServices::system(config.folders.fonts.as_deref());
    let (events, logger) = spawn_event_logger();
    let result = lyricframe::batch_generate(
        &transcripts,
        &request,
        &services,
        &events,
        &CancelToken::new(),
    );
    finish_events(events, logger);

    let report = result?;
    for path in &report.produced {
        println!("{}", path.display());
    }
    for failure in &report.failed {
        eprintln!("failed {}: {}", failure.key, failure.error);
    }
    if !report.skipped.is_empty() {
        eprintln!("skipped (no audio): {}", report.skipped.join(", "));
    }
    if report.cancelled {
        eprintln!("batch cancelled");
    }
    if report.produced.is_empty() && !report.failed.is_empty() {
        anyhow::bail!("no video was produced");
    }
    Ok(())
}

struct FixedDuration(f64);

impl AudioProbe for FixedDuration {
    fn duration_secs(&self, _path: &Path) -> LyricResult<f64> {
        Ok(self.0)
    }
}

fn cmd_frame(mut config: AppConfig, args: FrameArgs) -> anyhow::Result<()> {
    apply_style(&mut config, &args.style)?;
    let segments = lyricframe::load_transcript(&args.transcript)?;
    let mut services = RenderServices::system(config.folders.fonts.as_deref());
    let (key, audio_path) = match &args.audio {
        Some(audio) => (audio_key(audio)?, audio.clone()),
        None => {
            let end = segments.iter().map(|s| s.end).fold(0.0, f64::max);
            services.probe = Arc::new(FixedDuration(end.max(args.at)));
            (audio_key(&args.transcript)?, args.transcript.clone())
        }
    };

    let job = RenderJob {
        key,
        audio_path,
        segments,
        background: background_of(&config)?,
        background_seed: config.style.shake_seed,
        style: config.style.clone(),
        aspect: config.aspect,
        quality: config.quality,
        output_path: args.out.clone(),
    };
    let prepared = job.prepare(&services)?;
    let frame = lyricframe::render_preview_frame(&prepared, args.at)?;
    lyricframe::write_png(&frame, &args.out)?;
    println!("{}", args.out.display());
    Ok(())
}

fn cmd_srt(args: SrtArgs) -> anyhow::Result<()> {
    let segments = lyricframe::load_transcript(&args.in_path)?;
    lyricframe::save_srt(&segments, &args.out)?;
    println!("{}", args.out.display());
    Ok(())
}
