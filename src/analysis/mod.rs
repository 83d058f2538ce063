//! Local analysis of short audio excerpts.
//!
//! Used when the catalog has no native descriptors for a track: the excerpt
//! is decoded to mono samples and reduced to tempo, energy, brightness and
//! dynamic range.

pub mod decode;
pub mod features;

pub use decode::{decode_mono, DecodedAudio, ExcerptFile};

use crate::Result;

/// Keep one sample out of this many in the waveform thumbnail.
pub const WAVEFORM_STEP: usize = 200;

/// Scalar descriptors of one excerpt.
#[derive(Debug, Clone, PartialEq)]
pub struct ExcerptAnalysis {
    /// Beats per minute, `None` when no periodicity was found
    pub tempo: Option<f64>,
    /// Mean RMS energy
    pub energy: f64,
    /// Mean spectral centroid in Hz over non-silent frames, `None` for silence
    pub spectral_centroid: Option<f64>,
    /// max(RMS) - min(RMS)
    pub dynamic_range: f64,
    /// Downsampled samples for plotting
    pub waveform: Vec<f32>,
    pub duration_secs: f64,
}

/// Decodes and analyses excerpts.
///
/// # Examples
///
/// ```rust,no_run
/// use atelier_lucide::analysis::ExcerptAnalyzer;
///
/// # fn example(bytes: &[u8]) -> atelier_lucide::Result<()> {
/// let analysis = ExcerptAnalyzer::new(30.0).analyze_bytes(bytes)?;
/// if let (Some(bpm), Some(centroid)) = (analysis.tempo, analysis.spectral_centroid) {
///     println!("{bpm:.0} BPM, centroid {centroid:.0} Hz");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ExcerptAnalyzer {
    max_seconds: f64,
}

impl ExcerptAnalyzer {
    /// Analyse at most `max_seconds` of every excerpt.
    pub fn new(max_seconds: f64) -> Self {
        Self { max_seconds }
    }

    /// Write `bytes` to a scoped temporary file, decode it and analyse it.
    ///
    /// The temporary file is gone when this returns, whatever the outcome.
    pub fn analyze_bytes(&self, bytes: &[u8]) -> Result<ExcerptAnalysis> {
        let excerpt = ExcerptFile::write(bytes)?;
        let audio = decode_mono(excerpt.path(), self.max_seconds)?;
        self.analyze(&audio)
    }

    pub fn analyze(&self, audio: &DecodedAudio) -> Result<ExcerptAnalysis> {
        let rms = features::rms_curve(&audio.samples);
        let spectrogram = features::magnitude_spectrogram(&audio.samples)?;
        let centroids = features::centroid_curve(&spectrogram, audio.sample_rate);
        let envelope = features::onset_envelope(&spectrogram);

        let tempo = features::estimate_tempo(&envelope, audio.sample_rate);
        if tempo.is_none() {
            log::warn!("No periodicity found in excerpt");
        }

        let analysis = ExcerptAnalysis {
            tempo,
            energy: features::mean(&rms).unwrap_or(0.0),
            spectral_centroid: features::mean(&centroids),
            dynamic_range: features::spread(&rms),
            waveform: features::downsample(&audio.samples, WAVEFORM_STEP),
            duration_secs: audio.duration_secs(),
        };

        log::debug!(
            "Excerpt analysis: tempo {:?}, energy {:.3}, centroid {:?}, range {:.3}",
            analysis.tempo,
            analysis.energy,
            analysis.spectral_centroid,
            analysis.dynamic_range
        );

        Ok(analysis)
    }
}

impl Default for ExcerptAnalyzer {
    fn default() -> Self {
        Self::new(30.0)
    }
}
