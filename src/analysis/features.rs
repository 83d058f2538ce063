//! Frame-level descriptors of a mono excerpt.
//!
//! All curves share the same framing: windows of [`FRAME_SIZE`] samples
//! advanced by [`HOP_SIZE`]. A signal shorter than one frame is zero-padded
//! to a single frame.

use crate::{AtelierError, Result};
use realfft::RealFftPlanner;
use std::f32::consts::PI;

pub const FRAME_SIZE: usize = 2048;
pub const HOP_SIZE: usize = 512;

/// Tempo search range in BPM.
const MIN_BPM: f64 = 30.0;
const MAX_BPM: f64 = 300.0;
/// Centre and width (in octaves) of the log-normal tempo prior.
const PRIOR_BPM: f64 = 120.0;
const PRIOR_OCTAVES: f64 = 1.0;

/// Start offsets of every analysis frame.
fn frame_starts(len: usize) -> impl Iterator<Item = usize> {
    let count = if len <= FRAME_SIZE {
        1
    } else {
        1 + (len - FRAME_SIZE) / HOP_SIZE
    };
    (0..count).map(|i| i * HOP_SIZE)
}

/// Copy of the frame starting at `start`, zero-padded to [`FRAME_SIZE`].
fn frame_at(samples: &[f32], start: usize) -> Vec<f32> {
    let end = (start + FRAME_SIZE).min(samples.len());
    let mut frame = samples[start.min(end)..end].to_vec();
    frame.resize(FRAME_SIZE, 0.0);
    frame
}

/// Root-mean-square energy of every frame.
pub fn rms_curve(samples: &[f32]) -> Vec<f64> {
    frame_starts(samples.len())
        .map(|start| {
            let frame = frame_at(samples, start);
            let power: f64 = frame.iter().map(|s| f64::from(*s) * f64::from(*s)).sum();
            (power / FRAME_SIZE as f64).sqrt()
        })
        .collect()
}

/// Periodic Hann window.
fn hann_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|n| 0.5 - 0.5 * (2.0 * PI * n as f32 / size as f32).cos())
        .collect()
}

/// Magnitude spectrogram, one vector of `FRAME_SIZE / 2 + 1` bins per frame.
pub fn magnitude_spectrogram(samples: &[f32]) -> Result<Vec<Vec<f32>>> {
    let mut planner = RealFftPlanner::<f32>::new();
    let fft = planner.plan_fft_forward(FRAME_SIZE);
    let window = hann_window(FRAME_SIZE);
    let mut spectrum = fft.make_output_vec();

    frame_starts(samples.len())
        .map(|start| -> Result<Vec<f32>> {
            let mut frame = frame_at(samples, start);
            for (sample, w) in frame.iter_mut().zip(&window) {
                *sample *= w;
            }
            fft.process(&mut frame, &mut spectrum)
                .map_err(|e| AtelierError::Decode(format!("FFT failed: {e}")))?;
            Ok(spectrum.iter().map(|c| c.norm()).collect::<Vec<f32>>())
        })
        .collect()
}

/// Spectral centroid (Hz) of every non-silent frame.
pub fn centroid_curve(spectrogram: &[Vec<f32>], sample_rate: u32) -> Vec<f64> {
    let bin_hz = f64::from(sample_rate) / FRAME_SIZE as f64;
    spectrogram
        .iter()
        .filter_map(|bins| {
            let total: f64 = bins.iter().map(|m| f64::from(*m)).sum();
            if total <= f64::EPSILON {
                return None;
            }
            let weighted: f64 = bins
                .iter()
                .enumerate()
                .map(|(k, m)| k as f64 * bin_hz * f64::from(*m))
                .sum();
            Some(weighted / total)
        })
        .collect()
}

/// Half-wave rectified log-magnitude spectral flux, one value per frame.
pub fn onset_envelope(spectrogram: &[Vec<f32>]) -> Vec<f64> {
    let mut envelope = Vec::with_capacity(spectrogram.len());
    envelope.push(0.0);
    for pair in spectrogram.windows(2) {
        let flux = pair[1]
            .iter()
            .zip(&pair[0])
            .map(|(now, before)| {
                (f64::from(*now).ln_1p() - f64::from(*before).ln_1p()).max(0.0)
            })
            .sum();
        envelope.push(flux);
    }
    envelope.truncate(spectrogram.len());
    envelope
}

/// Three-tap triangular smoothing.
fn smooth(values: &[f64]) -> Vec<f64> {
    (0..values.len())
        .map(|i| {
            let before = if i > 0 { values[i - 1] } else { 0.0 };
            let after = values.get(i + 1).copied().unwrap_or(0.0);
            0.25 * before + 0.5 * values[i] + 0.25 * after
        })
        .collect()
}

/// Global tempo estimate from an onset envelope.
///
/// The smoothed, mean-removed envelope is autocorrelated over the lags covering
/// 30 to 300 BPM, each lag normalised by its overlap length and weighted by a
/// log-normal prior centred on 120 BPM. The best lag is refined by parabolic
/// interpolation. Returns `None` when no periodicity is found.
pub fn estimate_tempo(envelope: &[f64], sample_rate: u32) -> Option<f64> {
    let frames_per_sec = f64::from(sample_rate) / HOP_SIZE as f64;
    let n = envelope.len();

    let min_lag = ((60.0 * frames_per_sec / MAX_BPM).floor() as usize).max(1);
    let max_lag = ((60.0 * frames_per_sec / MIN_BPM).ceil() as usize).min(n.saturating_sub(1));
    if n < 4 || min_lag + 2 > max_lag {
        return None;
    }

    let smoothed = smooth(envelope);
    let mean = smoothed.iter().sum::<f64>() / n as f64;
    let centred: Vec<f64> = smoothed.iter().map(|v| v - mean).collect();

    let weighted: Vec<(usize, f64)> = (min_lag..=max_lag)
        .map(|lag| {
            let ac = centred[..n - lag]
                .iter()
                .zip(&centred[lag..])
                .map(|(a, b)| a * b)
                .sum::<f64>()
                / (n - lag) as f64;
            let bpm = 60.0 * frames_per_sec / lag as f64;
            let octaves = (bpm / PRIOR_BPM).log2() / PRIOR_OCTAVES;
            (lag, ac * (-0.5 * octaves * octaves).exp())
        })
        .collect();

    let (best_index, &(best_lag, best_score)) = weighted
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.1.total_cmp(&b.1))?;
    if best_score <= 0.0 {
        return None;
    }

    let mut lag = best_lag as f64;
    if best_index > 0 && best_index + 1 < weighted.len() {
        let (left, centre, right) = (
            weighted[best_index - 1].1,
            best_score,
            weighted[best_index + 1].1,
        );
        let denominator = left - 2.0 * centre + right;
        if denominator.abs() > f64::EPSILON {
            lag += (0.5 * (left - right) / denominator).clamp(-0.5, 0.5);
        }
    }

    Some(60.0 * frames_per_sec / lag)
}

/// Every `step`-th sample, for thumbnail plots.
pub fn downsample(samples: &[f32], step: usize) -> Vec<f32> {
    samples.iter().step_by(step.max(1)).copied().collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// max - min, 0 for an empty curve.
pub fn spread(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    if values.is_empty() {
        0.0
    } else {
        max - min
    }
}
