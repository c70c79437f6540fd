//! Procedural page-flip sound.
//!
//! The cue is three layers summed into one mono buffer: a short band-passed
//! noise snap, a low-passed paper rustle and a low sine thump near the end.
//! Everything is synthesized per call from a seeded noise source, so two
//! flips never sound identical but a fixed seed reproduces the same buffer.

use std::f64::consts::PI;
use std::path::Path;

use crate::audio::filter::{Biquad, FilterKind};
use crate::foundation::error::{FlipbookError, FlipbookResult};
use crate::foundation::math::Rng64;

const CUE_SECS: f64 = 0.4;

const SNAP_SECS: f64 = 0.06;
const SNAP_DECAY: f64 = 60.0;
const SNAP_GAIN: f64 = 0.22;
const SNAP_CENTER_HZ: f64 = 3_200.0;
const SNAP_Q: f64 = 1.2;

const RUSTLE_START_SECS: f64 = 0.02;
const RUSTLE_SECS: f64 = 0.28;
const RUSTLE_PEAK_SECS: f64 = 0.08;
const RUSTLE_WIDTH_SECS: f64 = 0.06;
const RUSTLE_GAIN: f64 = 0.14;
const RUSTLE_SMOOTH_PASSES: usize = 3;
const RUSTLE_CUTOFF_HZ: f64 = 2_500.0;

const THUMP_HZ: f64 = 75.0;
const THUMP_START_SECS: f64 = 0.2;
const THUMP_ATTACK_END_SECS: f64 = 0.22;
const THUMP_DECAY_END_SECS: f64 = 0.34;
const THUMP_PEAK_GAIN: f64 = 0.07;
const THUMP_FLOOR_GAIN: f64 = 0.001;

/// Mono PCM buffer of one synthesized cue.
#[derive(Clone, Debug, PartialEq)]
pub struct CueBuffer {
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl CueBuffer {
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Largest absolute sample value.
    pub fn peak(&self) -> f32 {
        self.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
    }

    /// RMS energy of the samples in `[start_secs, end_secs)`.
    pub fn rms_between(&self, start_secs: f64, end_secs: f64) -> f64 {
        let sr = f64::from(self.sample_rate);
        let a = ((start_secs * sr).max(0.0) as usize).min(self.samples.len());
        let b = ((end_secs * sr).max(0.0) as usize).min(self.samples.len());
        if b <= a {
            return 0.0;
        }
        let sum: f64 = self.samples[a..b]
            .iter()
            .map(|&s| f64::from(s) * f64::from(s))
            .sum();
        (sum / (b - a) as f64).sqrt()
    }
}

/// Build the flip cue at `sample_rate` using `seed` for the noise layers.
pub fn synthesize_flip_cue(sample_rate: u32, seed: u64) -> FlipbookResult<CueBuffer> {
    if sample_rate == 0 {
        return Err(FlipbookError::audio("cue sample_rate must be > 0"));
    }
    let sr = f64::from(sample_rate);
    let mut out = vec![0.0f32; secs_to_samples(CUE_SECS, sr)];
    let mut rng = Rng64::new(seed);

    let snap = snap_layer(sample_rate, &mut rng);
    mix_into(&mut out, &snap, 0);

    let rustle = rustle_layer(sample_rate, &mut rng);
    mix_into(&mut out, &rustle, secs_to_samples(RUSTLE_START_SECS, sr));

    add_thump(&mut out, sr);

    for s in &mut out {
        *s = s.clamp(-1.0, 1.0);
    }
    Ok(CueBuffer {
        sample_rate,
        samples: out,
    })
}

/// Something that can play a synthesized cue.
///
/// Failures are the sink's own business; the flipbook logs and drops them.
pub trait CueSink {
    fn play(&mut self, cue: &CueBuffer) -> anyhow::Result<()>;
}

/// Sink that keeps every cue it receives. Useful for offline export and tests.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub cues: Vec<CueBuffer>,
}

impl CueSink for CollectingSink {
    fn play(&mut self, cue: &CueBuffer) -> anyhow::Result<()> {
        self.cues.push(cue.clone());
        Ok(())
    }
}

/// Synthesizes a fresh cue per flip and hands it to a sink.
pub struct FlipCuePlayer {
    sample_rate: u32,
    next_seed: u64,
    sink: Box<dyn CueSink>,
}

impl FlipCuePlayer {
    pub fn new(sample_rate: u32, seed: u64, sink: Box<dyn CueSink>) -> Self {
        Self {
            sample_rate,
            next_seed: seed,
            sink,
        }
    }

    /// Synthesize and play one cue. Never fails; problems are logged at debug.
    pub fn fire(&mut self) {
        let seed = self.next_seed;
        self.next_seed = self.next_seed.wrapping_add(1);
        let played = synthesize_flip_cue(self.sample_rate, seed)
            .map_err(anyhow::Error::from)
            .and_then(|cue| self.sink.play(&cue));
        if let Err(err) = played {
            tracing::debug!(error = %err, "flip cue dropped");
        }
    }
}

impl std::fmt::Debug for FlipCuePlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlipCuePlayer")
            .field("sample_rate", &self.sample_rate)
            .field("next_seed", &self.next_seed)
            .finish_non_exhaustive()
    }
}

/// Write raw little-endian `f32` mono samples to `out_path`.
pub fn write_cue_f32le(cue: &CueBuffer, out_path: &Path) -> FlipbookResult<()> {
    if let Some(parent) = out_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            FlipbookError::io(format!(
                "failed to create cue output directory '{}': {e}",
                parent.display()
            ))
        })?;
    }

    let mut bytes = Vec::<u8>::with_capacity(cue.samples.len() * 4);
    for &sample in &cue.samples {
        bytes.extend_from_slice(&sample.to_le_bytes());
    }
    std::fs::write(out_path, bytes).map_err(|e| {
        FlipbookError::io(format!(
            "failed to write cue file '{}': {e}",
            out_path.display()
        ))
    })
}

fn secs_to_samples(secs: f64, sr: f64) -> usize {
    (secs * sr).round().max(0.0) as usize
}

fn snap_layer(sample_rate: u32, rng: &mut Rng64) -> Vec<f32> {
    let sr = f64::from(sample_rate);
    let len = secs_to_samples(SNAP_SECS, sr);
    let mut buf: Vec<f32> = (0..len)
        .map(|i| {
            let t = i as f64 / sr;
            let env = (-t * SNAP_DECAY).exp() * SNAP_GAIN;
            (f64::from(rng.next_signed()) * env) as f32
        })
        .collect();
    Biquad::new(FilterKind::BandPass, sample_rate, SNAP_CENTER_HZ, SNAP_Q)
        .process_in_place(&mut buf);
    buf
}

fn rustle_layer(sample_rate: u32, rng: &mut Rng64) -> Vec<f32> {
    let sr = f64::from(sample_rate);
    let len = secs_to_samples(RUSTLE_SECS, sr);
    let mut buf: Vec<f32> = (0..len)
        .map(|i| {
            let t = i as f64 / sr;
            let x = (t - RUSTLE_PEAK_SECS) / RUSTLE_WIDTH_SECS;
            let env = (-x * x).exp() * RUSTLE_GAIN;
            (f64::from(rng.next_signed()) * env) as f32
        })
        .collect();

    // [1, 2, 1] / 4 kernel applied in place, left to right.
    for _ in 0..RUSTLE_SMOOTH_PASSES {
        for k in 1..buf.len().saturating_sub(1) {
            buf[k] = (buf[k - 1] + 2.0 * buf[k] + buf[k + 1]) * 0.25;
        }
    }

    Biquad::new(
        FilterKind::LowPass,
        sample_rate,
        RUSTLE_CUTOFF_HZ,
        std::f64::consts::FRAC_1_SQRT_2,
    )
    .process_in_place(&mut buf);
    buf
}

fn thump_gain(t: f64) -> f64 {
    if t < THUMP_START_SECS {
        0.0
    } else if t < THUMP_ATTACK_END_SECS {
        THUMP_PEAK_GAIN * (t - THUMP_START_SECS) / (THUMP_ATTACK_END_SECS - THUMP_START_SECS)
    } else if t < THUMP_DECAY_END_SECS {
        let u = (t - THUMP_ATTACK_END_SECS) / (THUMP_DECAY_END_SECS - THUMP_ATTACK_END_SECS);
        THUMP_PEAK_GAIN * (THUMP_FLOOR_GAIN / THUMP_PEAK_GAIN).powf(u)
    } else {
        THUMP_FLOOR_GAIN
    }
}

fn add_thump(out: &mut [f32], sr: f64) {
    let start = secs_to_samples(THUMP_START_SECS, sr);
    for (i, s) in out.iter_mut().enumerate().skip(start) {
        let t = i as f64 / sr;
        let phase = 2.0 * PI * THUMP_HZ * (t - THUMP_START_SECS);
        *s += (phase.sin() * thump_gain(t)) as f32;
    }
}

fn mix_into(out: &mut [f32], layer: &[f32], offset: usize) {
    for (dst, &src) in out.iter_mut().skip(offset).zip(layer) {
        *dst += src;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/cue.rs"]
mod tests;
