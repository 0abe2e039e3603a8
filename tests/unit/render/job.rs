use std::sync::mpsc;

use super::*;
use crate::{
    encode::sink::{FrameSink, InMemorySink},
    text::raster::BlockRasterizerFactory,
};

struct FixedProbe(f64);

impl AudioProbe for FixedProbe {
    fn duration_secs(&self, _path: &Path) -> LyricResult<f64> {
        Ok(self.0)
    }
}

struct MemorySinks;

impl SinkFactory for MemorySinks {
    fn create(&self) -> LyricResult<Box<dyn FrameSink>> {
        Ok(Box::new(InMemorySink::new()))
    }
}

fn services(duration: f64) -> RenderServices {
    RenderServices {
        probe: Arc::new(FixedProbe(duration)),
        rasterizers: Arc::new(BlockRasterizerFactory),
        sinks: Arc::new(MemorySinks),
    }
}

fn job(dir: &Path) -> RenderJob {
    let bg = dir.join("bg.png");
    image::RgbaImage::from_pixel(40, 30, image::Rgba([10, 20, 30, 255]))
        .save(&bg)
        .unwrap();
    RenderJob {
        key: "song".to_string(),
        audio_path: dir.join("song.mp3"),
        segments: vec![
            LyricSegment::new("one", 0.0, 1.0),
            LyricSegment::new("two", 1.0, 2.5),
            LyricSegment::new("late", 9.0, 10.0),
        ],
        background: bg,
        background_seed: 0,
        style: StyleConfig::default(),
        aspect: AspectRatio::Landscape,
        quality: QualityTier::P720,
        output_path: dir.join("out").join(output_file_name("song")),
    }
}

#[test]
fn prepare_builds_timeline_for_tier_and_audio() {
    let dir = tempfile::tempdir().unwrap();
    let prepared = job(dir.path()).prepare(&services(2.0)).unwrap();
    assert_eq!(prepared.preset.resolution.to_string(), "1280x720");
    assert_eq!(prepared.timeline.canvas(), prepared.preset.resolution);
    assert_eq!(prepared.total_frames, 60);
    // the third segment starts after the audio ends
    assert_eq!(prepared.timeline.clips().len(), 2);
}

#[test]
fn zero_length_audio_still_has_one_frame() {
    let dir = tempfile::tempdir().unwrap();
    let prepared = job(dir.path()).prepare(&services(0.01)).unwrap();
    assert_eq!(prepared.total_frames, 1);
}

#[test]
fn prepare_reports_bad_segments_and_missing_background() {
    let dir = tempfile::tempdir().unwrap();
    let mut bad = job(dir.path());
    bad.segments.push(LyricSegment::new("backwards", 5.0, 4.0));
    assert!(matches!(bad.prepare(&services(10.0)), Err(LyricError::Asset(_))));

    let mut missing = job(dir.path());
    missing.background = dir.path().join("nope.png");
    assert!(missing.prepare(&services(10.0)).is_err());

    let mut effect = job(dir.path());
    effect.style.effect_name = "sparkle".to_string();
    assert!(matches!(effect.prepare(&services(10.0)), Err(LyricError::Effect(_))));
}

#[test]
fn cancel_token_is_shared_between_clones() {
    let token = CancelToken::new();
    let other = token.clone();
    assert!(token.check().is_ok());
    other.cancel();
    assert!(token.is_cancelled());
    assert!(matches!(token.check(), Err(LyricError::Cancelled)));
}

#[test]
fn events_are_delivered_until_receiver_is_gone() {
    let (tx, rx) = mpsc::channel();
    let events = RenderEvents::new(tx);
    events.stage("a", JobStage::Preparing);
    assert_eq!(
        rx.recv().unwrap(),
        RenderEvent::Stage {
            job: "a".to_string(),
            stage: JobStage::Preparing
        }
    );
    drop(rx);
    events.stage("a", JobStage::Done);
    RenderEvents::none().stage("b", JobStage::Failed);
}

#[test]
fn terminal_stages() {
    assert!(JobStage::Done.is_terminal());
    assert!(JobStage::Failed.is_terminal());
    assert!(!JobStage::Encoding.is_terminal());
    assert_eq!(output_file_name("My Song"), "My Song_lyric_video.mp4");
}
