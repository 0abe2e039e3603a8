use std::{
    ffi::OsString,
    io::{Read, Write as _},
    path::Path,
    process::{Child, ChildStdin, Command, Stdio},
    thread::JoinHandle,
};

use anyhow::Context as _;

use crate::{
    compose::{
        blend::{PremulRgba8, flatten_to_opaque_rgba8},
        timeline::FrameRGBA,
    },
    encode::sink::{FrameSink, SinkConfig, SinkFactory},
    foundation::{
        core::FrameIndex,
        error::{LyricError, LyricResult},
    },
};

/// Options for [`FfmpegSink`].
#[derive(Clone, Copy, Debug)]
pub struct FfmpegSinkOpts {
    /// Overwrite the output file if it already exists.
    pub overwrite: bool,
    /// Colour used to flatten any remaining alpha.
    pub bg_rgba: PremulRgba8,
}

impl Default for FfmpegSinkOpts {
    fn default() -> Self {
        Self {
            overwrite: true,
            bg_rgba: [0, 0, 0, 255],
        }
    }
}

/// Sink that spawns the system `ffmpeg` and streams raw RGBA frames to its
/// stdin, producing H.264/AAC MP4.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,

    child: Option<Child>,
    stdin: Option<ChildStdin>,
    stderr_drain: Option<JoinHandle<std::io::Result<Vec<u8>>>>,

    scratch: Vec<u8>,
    cfg: Option<SinkConfig>,
    last_idx: Option<FrameIndex>,
}

impl FfmpegSink {
    /// Sink that has not started an encoder yet.
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            child: None,
            stdin: None,
            stderr_drain: None,
            scratch: Vec::new(),
            cfg: None,
            last_idx: None,
        }
    }
}

/// Full `ffmpeg` argument list for one output.
pub(crate) fn ffmpeg_args(cfg: &SinkConfig, overwrite: bool) -> Vec<OsString> {
    let p = &cfg.preset;
    let mut args: Vec<OsString> = Vec::with_capacity(40);
    let mut push = |items: &[&str]| args.extend(items.iter().map(OsString::from));

    push(&[if overwrite { "-y" } else { "-n" }]);
    push(&[
        "-loglevel",
        "error",
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgba",
        "-s",
        &p.resolution.to_string(),
        "-r",
        &format!("{}/{}", p.fps.num, p.fps.den),
        "-i",
        "pipe:0",
    ]);
    if let Some(audio) = cfg.audio.as_ref() {
        args.push("-i".into());
        args.push(audio.as_os_str().to_owned());
        args.extend(
            ["-map", "0:v:0", "-map", "1:a:0"]
                .iter()
                .map(OsString::from),
        );
    }
    args.extend(
        [
            "-c:v",
            "libx264",
            "-preset",
            "medium",
            "-pix_fmt",
            "yuv420p",
            "-b:v",
            &format!("{}k", p.video_bitrate_kbps),
        ]
        .iter()
        .map(OsString::from),
    );
    if cfg.audio.is_some() {
        args.extend(
            [
                "-c:a",
                "aac",
                "-b:a",
                &format!("{}k", p.audio_bitrate_kbps),
                "-shortest",
            ]
            .iter()
            .map(OsString::from),
        );
    } else {
        args.push("-an".into());
    }
    args.extend(["-movflags", "+faststart", "-f", "mp4"].iter().map(OsString::from));
    args.push(cfg.out_path.as_os_str().to_owned());
    args
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> LyricResult<()> {
        let res = cfg.preset.resolution;
        if res.width == 0 || res.height == 0 {
            return Err(LyricError::render(
                "ffmpeg sink width/height must be non-zero",
            ));
        }
        if !res.width.is_multiple_of(2) || !res.height.is_multiple_of(2) {
            return Err(LyricError::render(format!(
                "ffmpeg sink needs even dimensions for yuv420p output, got {res}"
            )));
        }
        if let Some(audio) = cfg.audio.as_ref()
            && !audio.is_file()
        {
            return Err(LyricError::asset(format!(
                "audio file '{}' does not exist",
                audio.display()
            )));
        }

        ensure_parent_dir(&cfg.out_path)?;
        if !self.opts.overwrite && cfg.out_path.exists() {
            return Err(LyricError::render(format!(
                "output file '{}' already exists",
                cfg.out_path.display()
            )));
        }
        if !is_ffmpeg_on_path() {
            return Err(LyricError::render(
                "ffmpeg is required for MP4 encoding, but was not found on PATH",
            ));
        }

        let args = ffmpeg_args(&cfg, self.opts.overwrite);
        tracing::debug!(?args, "spawning ffmpeg");
        let mut child = Command::new("ffmpeg")
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| LyricError::render(format!("failed to spawn ffmpeg: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| LyricError::render("failed to open ffmpeg stdin"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| LyricError::render("failed to open ffmpeg stderr"))?;
        let stderr_drain = std::thread::spawn(move || {
            let mut bytes = Vec::new();
            stderr.read_to_end(&mut bytes)?;
            Ok(bytes)
        });

        self.scratch = Vec::with_capacity(res.byte_len());
        self.child = Some(child);
        self.stdin = Some(stdin);
        self.stderr_drain = Some(stderr_drain);
        self.cfg = Some(cfg);
        self.last_idx = None;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> LyricResult<()> {
        let cfg = self
            .cfg
            .as_ref()
            .ok_or_else(|| LyricError::render("ffmpeg sink not started"))?;
        if let Some(last) = self.last_idx
            && idx.0 <= last.0
        {
            return Err(LyricError::render(format!(
                "ffmpeg sink received frame {} after frame {}",
                idx.0, last.0
            )));
        }
        self.last_idx = Some(idx);

        let res = cfg.preset.resolution;
        if frame.width != res.width || frame.height != res.height {
            return Err(LyricError::render(format!(
                "frame size mismatch: got {}x{}, expected {res}",
                frame.width, frame.height
            )));
        }
        if frame.data.len() != res.byte_len() {
            return Err(LyricError::render(
                "frame data length does not match width*height*4",
            ));
        }

        if frame.premultiplied {
            flatten_to_opaque_rgba8(&mut self.scratch, &frame.data, self.opts.bg_rgba);
        } else {
            self.scratch.clear();
            self.scratch.extend_from_slice(&frame.data);
        }

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(LyricError::render("ffmpeg sink is already finalized"));
        };
        stdin
            .write_all(&self.scratch)
            .map_err(|e| LyricError::render(format!("failed to write frame {} to ffmpeg: {e}", idx.0)))?;
        Ok(())
    }

    fn end(&mut self) -> LyricResult<()> {
        drop(self.stdin.take());
        let mut child = self
            .child
            .take()
            .ok_or_else(|| LyricError::render("ffmpeg sink not started"))?;

        let status = child
            .wait()
            .map_err(|e| LyricError::render(format!("failed to wait for ffmpeg: {e}")))?;
        let stderr_bytes = match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| LyricError::render("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| LyricError::render(format!("ffmpeg stderr read failed: {e}")))?,
            None => Vec::new(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(LyricError::render(format!(
                "ffmpeg exited with status {status}: {}",
                stderr.trim()
            )));
        }

        self.cfg = None;
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // abandoned mid-stream: stop the encoder so the partial file can go
        drop(self.stdin.take());
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if let Some(handle) = self.stderr_drain.take() {
            let _ = handle.join();
        }
    }
}

/// Hands out a fresh [`FfmpegSink`] per job.
#[derive(Clone, Copy, Debug, Default)]
pub struct FfmpegSinkFactory {
    /// Options for every sink.
    pub opts: FfmpegSinkOpts,
}

impl SinkFactory for FfmpegSinkFactory {
    fn create(&self) -> LyricResult<Box<dyn FrameSink>> {
        Ok(Box::new(FfmpegSink::new(self.opts)))
    }
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path) -> LyricResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
