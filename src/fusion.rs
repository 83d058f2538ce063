//! Score fusion: pure functions over already-collected signals.
//!
//! Nothing here substitutes a default for a missing input. When an operand is
//! absent the functions return `None` and the caller renders
//! "insufficient data".

use crate::config::{DissonanceThresholds, LabelThresholds};
use crate::types::{AudioSignal, LyricSignal};
use std::fmt;

/// Tempo range mapped onto [0, 1] by the mood proxy.
const MOOD_TEMPO_RANGE: (f64, f64) = (60.0, 180.0);
/// Spectral centroid range (Hz) mapped onto [0, 1] by the mood proxy.
const MOOD_CENTROID_RANGE: (f64, f64) = (1000.0, 6000.0);

fn rescale(value: f64, (low, high): (f64, f64)) -> f64 {
    ((value - low) / (high - low)).clamp(0.0, 1.0)
}

/// Audio mood proxy in [0, 1].
///
/// Catalog signals carry a valence and use it directly. Excerpt signals
/// average the rescaled tempo and spectral centroid. Returns `None` when
/// there is no valence and either the tempo or the centroid is unknown.
pub fn audio_mood(audio: &AudioSignal) -> Option<f64> {
    if let Some(valence) = audio.valence {
        return Some(valence.clamp(0.0, 1.0));
    }
    let tempo = audio.tempo?;
    let centroid = audio.spectral_centroid?;
    Some((rescale(tempo, MOOD_TEMPO_RANGE) + rescale(centroid, MOOD_CENTROID_RANGE)) / 2.0)
}

/// Map a polarity in [-1, 1] onto [0, 1].
pub fn text_valence(lyric: &LyricSignal) -> f64 {
    ((lyric.polarity + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Three-band classification of a dissonance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DissonanceBand {
    VeryCoherent,
    CoherentWithNuance,
    StrongCreativeTension,
}

impl DissonanceBand {
    pub fn classify(score: f64, thresholds: &DissonanceThresholds) -> Self {
        if score < thresholds.coherent {
            DissonanceBand::VeryCoherent
        } else if score < thresholds.tension {
            DissonanceBand::CoherentWithNuance
        } else {
            DissonanceBand::StrongCreativeTension
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DissonanceBand::VeryCoherent => "very coherent",
            DissonanceBand::CoherentWithNuance => "coherent with nuance",
            DissonanceBand::StrongCreativeTension => "strong creative tension",
        }
    }

    /// Binary reading: tension or not.
    pub fn is_tension(&self) -> bool {
        matches!(self, DissonanceBand::StrongCreativeTension)
    }
}

impl fmt::Display for DissonanceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A dissonance score with its band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dissonance {
    /// |audio mood - text valence|, in [0, 1]
    pub score: f64,
    pub band: DissonanceBand,
}

/// Dissonance between sound and lyrics.
///
/// `None` unless both signals are present and the audio mood is computable.
///
/// # Examples
///
/// ```rust
/// use atelier_lucide::config::DissonanceThresholds;
/// use atelier_lucide::fusion::{dissonance, DissonanceBand};
/// use atelier_lucide::{AudioSignal, LyricOrigin, LyricSignal};
///
/// let audio = AudioSignal::from_excerpt(Some(150.0), 0.2, 3500.0, 0.1);
/// let lyric = LyricSignal {
///     polarity: -0.6,
///     subjectivity: 0.5,
///     unique_tokens: 120,
///     origin: LyricOrigin::Manual,
///     preview: vec![],
/// };
///
/// let result = dissonance(Some(&audio), Some(&lyric), &DissonanceThresholds::default()).unwrap();
/// assert!((result.score - 0.425).abs() < 1e-9);
/// assert_eq!(result.band, DissonanceBand::StrongCreativeTension);
/// assert!(dissonance(None, Some(&lyric), &DissonanceThresholds::default()).is_none());
/// ```
pub fn dissonance(
    audio: Option<&AudioSignal>,
    lyric: Option<&LyricSignal>,
    thresholds: &DissonanceThresholds,
) -> Option<Dissonance> {
    let mood = audio_mood(audio?)?;
    let valence = text_valence(lyric?);
    let score = (mood - valence).abs();
    Some(Dissonance {
        score,
        band: DissonanceBand::classify(score, thresholds),
    })
}

// ================================================================================================
// QUALITATIVE LABELS
// ================================================================================================

/// A short label and the sentence explaining it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualitativeLabel {
    pub label: &'static str,
    pub explanation: &'static str,
}

impl fmt::Display for QualitativeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.explanation)
    }
}

/// Pick the entry whose upper bound is the first one above `value`.
///
/// `entries` has one more element than `bounds`.
fn banded(value: f64, bounds: &[f64], entries: &[QualitativeLabel]) -> QualitativeLabel {
    let index = bounds
        .iter()
        .position(|bound| value < *bound)
        .unwrap_or(bounds.len());
    entries[index.min(entries.len() - 1)]
}

const fn label(label: &'static str, explanation: &'static str) -> QualitativeLabel {
    QualitativeLabel { label, explanation }
}

const TEMPO_LABELS: [QualitativeLabel; 4] = [
    label("slow", "Slow tempo, suited to ballads and introspective moods."),
    label("moderate", "Moderate tempo, relaxed and conversational."),
    label("fast", "Fast tempo, driving and energetic."),
    label("very fast", "Very fast tempo, high intensity."),
];

const ENERGY_LABELS: [QualitativeLabel; 3] = [
    label("calm", "Low energy, a soft and intimate sound."),
    label("moderate", "Balanced energy."),
    label("intense", "High energy, a dense and powerful sound."),
];

const BRIGHTNESS_LABELS: [QualitativeLabel; 3] = [
    label("dark", "Dark timbre dominated by low frequencies."),
    label("balanced", "Balanced timbre."),
    label("bright", "Bright timbre rich in high frequencies."),
];

const DYNAMIC_RANGE_LABELS: [QualitativeLabel; 3] = [
    label("compressed", "Little dynamic variation, a heavily compressed mix."),
    label("moderate", "Moderate dynamic variation."),
    label("dynamic", "Strong contrasts between quiet and loud passages."),
];

const POPULARITY_LABELS: [QualitativeLabel; 5] = [
    label("confidential", "Confidential audience."),
    label("emerging", "Emerging artist."),
    label("growing", "Growing audience."),
    label("established", "Established artist."),
    label("mainstream", "Mainstream artist."),
];

pub fn tempo_label(bpm: f64, thresholds: &LabelThresholds) -> QualitativeLabel {
    banded(bpm, &thresholds.tempo, &TEMPO_LABELS)
}

pub fn energy_label(energy: f64, thresholds: &LabelThresholds) -> QualitativeLabel {
    banded(energy, &thresholds.energy, &ENERGY_LABELS)
}

pub fn brightness_label(centroid_hz: f64, thresholds: &LabelThresholds) -> QualitativeLabel {
    banded(centroid_hz, &thresholds.brightness, &BRIGHTNESS_LABELS)
}

pub fn dynamic_range_label(range: f64, thresholds: &LabelThresholds) -> QualitativeLabel {
    banded(range, &thresholds.dynamic_range, &DYNAMIC_RANGE_LABELS)
}

pub fn popularity_label(popularity: u8, thresholds: &LabelThresholds) -> QualitativeLabel {
    banded(f64::from(popularity), &thresholds.popularity, &POPULARITY_LABELS)
}

/// Every label computable from an audio signal, in display order.
///
/// Labels whose input the signal does not carry are skipped.
pub fn audio_labels(audio: &AudioSignal, thresholds: &LabelThresholds) -> Vec<QualitativeLabel> {
    let mut labels = Vec::new();
    if let Some(bpm) = audio.tempo {
        labels.push(tempo_label(bpm, thresholds));
    }
    labels.push(energy_label(audio.energy, thresholds));
    if let Some(centroid) = audio.spectral_centroid {
        labels.push(brightness_label(centroid, thresholds));
    }
    if let Some(range) = audio.dynamic_range {
        labels.push(dynamic_range_label(range, thresholds));
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LyricOrigin;

    fn lyric(polarity: f64) -> LyricSignal {
        LyricSignal {
            polarity,
            subjectivity: 0.5,
            unique_tokens: 10,
            origin: LyricOrigin::Manual,
            preview: Vec::new(),
        }
    }

    #[test]
    fn test_audio_mood_from_excerpt() {
        let audio = AudioSignal::from_excerpt(Some(150.0), 0.2, 3500.0, 0.1);
        assert!((audio_mood(&audio).unwrap() - 0.625).abs() < 1e-9);
    }

    #[test]
    fn test_audio_mood_clamps_each_term() {
        let audio = AudioSignal::from_excerpt(Some(400.0), 0.2, 200.0, 0.1);
        assert!((audio_mood(&audio).unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_audio_mood_needs_a_tempo() {
        let audio = AudioSignal::from_excerpt(None, 0.2, 3500.0, 0.1);
        assert_eq!(audio_mood(&audio), None);
        assert_eq!(
            dissonance(Some(&audio), Some(&lyric(0.0)), &DissonanceThresholds::default()),
            None
        );

        let labels = audio_labels(&audio, &LabelThresholds::default());
        assert_eq!(labels.len(), 3);
        assert_eq!(labels[0].label, energy_label(0.2, &LabelThresholds::default()).label);
    }

    #[test]
    fn test_dissonance_requires_both_inputs() {
        let thresholds = DissonanceThresholds::default();
        let audio = AudioSignal::from_excerpt(Some(120.0), 0.2, 2000.0, 0.1);
        assert!(dissonance(Some(&audio), None, &thresholds).is_none());
        assert!(dissonance(None, Some(&lyric(0.3)), &thresholds).is_none());
        assert!(dissonance(None, None, &thresholds).is_none());
    }

    #[test]
    fn test_dissonance_stays_in_unit_interval() {
        let thresholds = DissonanceThresholds::default();
        for tempo in [0.0, 60.0, 120.0, 180.0, 300.0] {
            for centroid in [0.0, 1000.0, 3500.0, 6000.0, 12000.0] {
                for polarity in [-1.0, -0.5, 0.0, 0.5, 1.0] {
                    let audio = AudioSignal::from_excerpt(Some(tempo), 0.2, centroid, 0.1);
                    let score = dissonance(Some(&audio), Some(&lyric(polarity)), &thresholds)
                        .unwrap()
                        .score;
                    assert!((0.0..=1.0).contains(&score));
                }
            }
        }
    }

    #[test]
    fn test_band_edges() {
        let t = DissonanceThresholds::default();
        assert_eq!(DissonanceBand::classify(0.19, &t), DissonanceBand::VeryCoherent);
        assert_eq!(DissonanceBand::classify(0.2, &t), DissonanceBand::CoherentWithNuance);
        assert_eq!(DissonanceBand::classify(0.4, &t), DissonanceBand::StrongCreativeTension);
        assert!(!DissonanceBand::CoherentWithNuance.is_tension());
    }

    #[test]
    fn test_label_breakpoints() {
        let t = LabelThresholds::default();
        assert_eq!(tempo_label(79.9, &t).label, "slow");
        assert_eq!(tempo_label(80.0, &t).label, "moderate");
        assert_eq!(tempo_label(139.0, &t).label, "fast");
        assert_eq!(tempo_label(140.0, &t).label, "very fast");
        assert_eq!(energy_label(0.30, &t).label, "intense");
        assert_eq!(brightness_label(1499.0, &t).label, "dark");
        assert_eq!(dynamic_range_label(0.1, &t).label, "moderate");
        assert_eq!(popularity_label(14, &t).label, "confidential");
        assert_eq!(popularity_label(50, &t).label, "established");
        assert_eq!(popularity_label(75, &t).label, "mainstream");
    }

    #[test]
    fn test_catalog_signal_labels_skip_excerpt_fields() {
        let audio = AudioSignal::from_catalog(&crate::types::CatalogDescriptors {
            tempo: 100.0,
            energy: 0.7,
            danceability: 0.6,
            valence: 0.4,
            acousticness: 0.1,
            loudness: -6.0,
            duration_ms: 200_000,
        });
        let labels = audio_labels(&audio, &LabelThresholds::default());
        assert_eq!(labels.len(), 2);
        assert_eq!(audio_mood(&audio), Some(0.4));
    }
}
