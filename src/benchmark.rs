//! Comparison of one track against a genre cohort.
//!
//! Cohort statistics are recomputed from scratch on every call. An empty
//! cohort is refused with [`EmptyCohort`] rather than producing NaN means.

use crate::config::BenchmarkThresholds;
use crate::types::AudioSignal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Radar axes, in plotting order.
pub const RADAR_AXES: [&str; 5] = ["energy", "danceability", "valence", "acousticness", "loudness"];

/// One track of a benchmark, target or cohort member.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CohortMember {
    pub energy: f64,
    pub danceability: f64,
    pub valence: f64,
    pub acousticness: f64,
    pub loudness_db: f64,
    pub popularity: u8,
    pub duration_ms: u64,
}

impl CohortMember {
    /// Build a member from a signal carrying the full descriptor set.
    ///
    /// Excerpt-derived signals lack danceability, valence, acousticness and
    /// loudness and therefore give `None`.
    pub fn from_signal(signal: &AudioSignal, popularity: u8) -> Option<Self> {
        Some(Self {
            energy: signal.energy,
            danceability: signal.danceability?,
            valence: signal.valence?,
            acousticness: signal.acousticness?,
            loudness_db: signal.loudness_db?,
            popularity,
            duration_ms: signal.duration_ms?,
        })
    }

    fn duration_secs(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }
}

/// Arithmetic means over a non-empty cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortStats {
    pub energy: f64,
    pub danceability: f64,
    pub valence: f64,
    pub acousticness: f64,
    pub loudness_db: f64,
    pub popularity: f64,
    pub duration_secs: f64,
    pub member_count: usize,
}

impl CohortStats {
    /// `None` for an empty cohort.
    pub fn compute(cohort: &[CohortMember]) -> Option<Self> {
        if cohort.is_empty() {
            return None;
        }
        let n = cohort.len() as f64;
        let mean = |f: fn(&CohortMember) -> f64| cohort.iter().map(f).sum::<f64>() / n;

        Some(Self {
            energy: mean(|m| m.energy),
            danceability: mean(|m| m.danceability),
            valence: mean(|m| m.valence),
            acousticness: mean(|m| m.acousticness),
            loudness_db: mean(|m| m.loudness_db),
            popularity: mean(|m| f64::from(m.popularity)),
            duration_secs: mean(CohortMember::duration_secs),
            member_count: cohort.len(),
        })
    }
}

/// `(db + 60) / 60`, optionally clamped to [0, 1].
pub fn normalize_loudness(loudness_db: f64, clamp: bool) -> f64 {
    let value = (loudness_db + 60.0) / 60.0;
    if clamp {
        value.clamp(0.0, 1.0)
    } else {
        value
    }
}

/// Cohort means and target values along [`RADAR_AXES`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarPair {
    pub cohort: [f64; 5],
    pub target: [f64; 5],
}

/// One diagnostic rule that fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Diagnostic {
    TooLong,
    TooShort,
    LowEnergy,
    HighEnergy,
    LowDanceability,
    Darker,
    Brighter,
    WellAligned,
}

impl Diagnostic {
    pub fn message(&self) -> &'static str {
        match self {
            Diagnostic::TooLong => "Track is too long compared to the style average",
            Diagnostic::TooShort => "Track is too short compared to the style average",
            Diagnostic::LowEnergy => "Energy below style average",
            Diagnostic::HighEnergy => "Energy above style average",
            Diagnostic::LowDanceability => "Less danceable than the style average",
            Diagnostic::Darker => "Darker than standard",
            Diagnostic::Brighter => "Brighter than standard",
            Diagnostic::WellAligned => "Well aligned with the style",
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Full benchmark outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub cohort: CohortStats,
    pub target: CohortMember,
    pub radar: RadarPair,
    /// Never empty: [`Diagnostic::WellAligned`] when no other rule fires
    pub diagnostics: Vec<Diagnostic>,
}

/// No reference track with usable descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("No comparable data: the cohort has no track with usable descriptors")]
pub struct EmptyCohort;

/// Compare `target` to the cohort means.
///
/// Every rule is evaluated independently and all that fire are reported.
///
/// # Examples
///
/// ```rust
/// use atelier_lucide::benchmark::{benchmark, CohortMember, Diagnostic};
/// use atelier_lucide::config::BenchmarkThresholds;
///
/// let member = |energy| CohortMember {
///     energy,
///     danceability: 0.6,
///     valence: 0.5,
///     acousticness: 0.2,
///     loudness_db: -7.0,
///     popularity: 50,
///     duration_ms: 180_000,
/// };
/// let cohort = [member(0.4), member(0.5), member(0.6)];
///
/// let report = benchmark(&member(0.3), &cohort, &BenchmarkThresholds::default()).unwrap();
/// assert_eq!(report.diagnostics, vec![Diagnostic::LowEnergy]);
/// assert!(benchmark(&member(0.3), &[], &BenchmarkThresholds::default()).is_err());
/// ```
pub fn benchmark(
    target: &CohortMember,
    cohort: &[CohortMember],
    thresholds: &BenchmarkThresholds,
) -> Result<BenchmarkReport, EmptyCohort> {
    let stats = CohortStats::compute(cohort).ok_or(EmptyCohort)?;
    log::debug!("Benchmarking against {} cohort members", stats.member_count);

    let clamp = thresholds.clamp_loudness;
    let radar = RadarPair {
        cohort: [
            stats.energy,
            stats.danceability,
            stats.valence,
            stats.acousticness,
            normalize_loudness(stats.loudness_db, clamp),
        ],
        target: [
            target.energy,
            target.danceability,
            target.valence,
            target.acousticness,
            normalize_loudness(target.loudness_db, clamp),
        ],
    };

    let mut diagnostics = Vec::new();

    let duration_delta = target.duration_secs() - stats.duration_secs;
    if duration_delta > thresholds.duration_secs {
        diagnostics.push(Diagnostic::TooLong);
    } else if duration_delta < -thresholds.duration_secs {
        diagnostics.push(Diagnostic::TooShort);
    }

    let energy_delta = target.energy - stats.energy;
    if energy_delta < -thresholds.energy {
        diagnostics.push(Diagnostic::LowEnergy);
    } else if energy_delta > thresholds.energy {
        diagnostics.push(Diagnostic::HighEnergy);
    }

    if stats.danceability - target.danceability > thresholds.danceability {
        diagnostics.push(Diagnostic::LowDanceability);
    }

    let valence_delta = target.valence - stats.valence;
    if valence_delta < -thresholds.valence {
        diagnostics.push(Diagnostic::Darker);
    } else if valence_delta > thresholds.valence {
        diagnostics.push(Diagnostic::Brighter);
    }

    if diagnostics.is_empty() {
        diagnostics.push(Diagnostic::WellAligned);
    }

    Ok(BenchmarkReport {
        cohort: stats,
        target: *target,
        radar,
        diagnostics,
    })
}
