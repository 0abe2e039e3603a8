use xxhash_rust::xxh3::Xxh3;

use crate::compose::timeline::ActiveClip;

const XXH3_SEED: u64 = 0x6c79_7269_6366_7270;

/// Stable per-frame fingerprint used by static-frame elision.
///
/// Two frames of the same timeline with equal fingerprints render to
/// identical pixels. Time itself is not hashed, so a still stretch (a held
/// line, a gap between lines) collapses to one render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct FrameFingerprint {
    pub(crate) hi: u64,
    pub(crate) lo: u64,
}

pub(crate) fn fingerprint_active(active: &[ActiveClip<'_>]) -> FrameFingerprint {
    let mut h = Xxh3::with_seed(XXH3_SEED);
    h.update(&(active.len() as u64).to_le_bytes());
    for a in active {
        let tr = &a.transform;
        h.update(&(a.clip.index() as u64).to_le_bytes());
        h.update(&tr.offset.x.to_bits().to_le_bytes());
        h.update(&tr.offset.y.to_bits().to_le_bytes());
        h.update(&tr.opacity.to_bits().to_le_bytes());
        h.update(&tr.scale.to_bits().to_le_bytes());
        match tr.color_override {
            Some(c) => h.update(&[1, c.r, c.g, c.b]),
            None => h.update(&[0]),
        }
        match tr.reveal_chars {
            Some(n) => {
                h.update(&[1]);
                h.update(&(n as u64).to_le_bytes());
            }
            None => h.update(&[0]),
        }
        h.update(&(tr.halo.len() as u64).to_le_bytes());
        for layer in &tr.halo {
            h.update(&layer.size_delta_px.to_bits().to_le_bytes());
            h.update(&layer.opacity.to_bits().to_le_bytes());
            h.update(&[layer.color.r, layer.color.g, layer.color.b]);
        }
    }
    let v = h.digest128();
    FrameFingerprint {
        hi: (v >> 64) as u64,
        lo: v as u64,
    }
}
