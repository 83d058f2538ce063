//! Data types shared by every stage of the pipeline.
//!
//! This module contains the catalog records returned by collaborators
//! (candidates, tracks, releases, excerpt hits), the per-track signals
//! derived from them, and the [`Signal`] wrapper that keeps "present",
//! "absent", "failed" and "not attempted" apart.

use serde::{Deserialize, Serialize};
use std::fmt;

// ================================================================================================
// CATALOG RECORDS
// ================================================================================================

/// One hit of a catalog artist search.
///
/// Candidates are weakly ranked by the catalog; [`EntityResolver`](crate::EntityResolver)
/// is the only consumer and picks one of them.
///
/// # Examples
///
/// ```rust
/// use atelier_lucide::CandidateEntity;
///
/// let candidate = CandidateEntity::named("id-angele", "Angèle", 40);
/// assert_eq!(candidate.popularity, 40);
/// assert!(candidate.genres.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateEntity {
    /// Catalog identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Catalog popularity score, 0 to 100
    pub popularity: u8,
    /// Follower count
    pub followers: u64,
    /// Genre tags in catalog order
    pub genres: Vec<String>,
    /// Artist picture, if the catalog has one
    pub image_url: Option<String>,
    /// Public page of the artist on the catalog
    pub external_url: Option<String>,
}

impl CandidateEntity {
    /// Build a candidate with only a name and a popularity score.
    pub fn named(id: &str, name: &str, popularity: u8) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            popularity,
            followers: 0,
            genres: Vec::new(),
            image_url: None,
            external_url: None,
        }
    }
}

/// The artist currently under study.
///
/// A resolved artist is never mutated: a new successful search replaces it
/// wholesale (see [`Session::replace_artist`](crate::Session::replace_artist)).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedArtist {
    pub id: String,
    pub name: String,
    pub popularity: u8,
    pub followers: u64,
    pub genres: Vec<String>,
    pub image_url: Option<String>,
    pub external_url: Option<String>,
}

impl ResolvedArtist {
    /// The first `n` genre tags, as shown under the artist name.
    pub fn headline_genres(&self, n: usize) -> &[String] {
        &self.genres[..self.genres.len().min(n)]
    }

    /// Number of genre tags the catalog attaches to the artist.
    pub fn genre_count(&self) -> usize {
        self.genres.len()
    }
}

impl From<CandidateEntity> for ResolvedArtist {
    fn from(candidate: CandidateEntity) -> Self {
        Self {
            id: candidate.id,
            name: candidate.name,
            popularity: candidate.popularity,
            followers: candidate.followers,
            genres: candidate.genres,
            image_url: candidate.image_url,
            external_url: candidate.external_url,
        }
    }
}

impl fmt::Display for ResolvedArtist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A catalog track belonging to (or featuring) a resolved artist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Catalog identifier
    pub id: String,
    /// Track title
    pub name: String,
    /// Album the track was released on
    pub album_name: String,
    /// Album cover, if any
    pub album_art_url: Option<String>,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Catalog popularity score, 0 to 100
    pub popularity: u8,
    /// Identifiers of every performing artist, main artist first
    pub performer_ids: Vec<String>,
    /// Names of every performing artist, same order as `performer_ids`
    pub performer_names: Vec<String>,
    /// Short preview clip hosted by the catalog, if any
    pub preview_url: Option<String>,
}

impl Track {
    /// Whether `artist_id` is among the performers of this track.
    ///
    /// Used to tell tracks truly performed by the resolved artist apart from
    /// guest appearances on other artists' tracks.
    pub fn is_performed_by(&self, artist_id: &str) -> bool {
        self.performer_ids.iter().any(|id| id == artist_id)
    }

    /// Name of the main performer, if the catalog reported one.
    pub fn primary_performer(&self) -> Option<&str> {
        self.performer_names.first().map(String::as_str)
    }

    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_ms as f64 / 1000.0
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} – {}", self.name, self.album_name)
    }
}

/// A release (album or single) of an artist, used for the release timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub id: String,
    pub name: String,
    /// Raw release date as reported by the catalog: `YYYY`, `YYYY-MM` or `YYYY-MM-DD`
    pub release_date: String,
    /// `album`, `single`, `compilation`, ...
    pub kind: String,
}

/// Native audio descriptors as returned by the catalog for one track.
///
/// All fields are the catalog's own; `loudness` is in dB (typically -60..0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CatalogDescriptors {
    pub tempo: f64,
    pub energy: f64,
    pub danceability: f64,
    pub valence: f64,
    pub acousticness: f64,
    pub loudness: f64,
    pub duration_ms: u64,
}

/// One hit of the audio excerpt source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcerptCandidate {
    /// Matched track title
    pub title: String,
    /// Matched performer name
    pub performer: String,
    /// Downloadable short audio file
    pub preview_url: String,
    /// Cover picture, if any
    pub cover_url: Option<String>,
}

// ================================================================================================
// DERIVED SIGNALS
// ================================================================================================

/// Which provider populated an [`AudioSignal`].
///
/// The two origins are alternatives: exactly one is active per track.
/// Scoring code must not branch on this; it is informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioOrigin {
    /// Descriptors supplied by the catalog
    Catalog,
    /// Descriptors computed locally from a short audio excerpt
    Excerpt,
}

/// Per-track audio descriptors.
///
/// Fields a provider cannot supply are `None` rather than zero. A catalog
/// provider fills `danceability`, `valence`, `acousticness` and `loudness_db`;
/// an excerpt analysis fills `spectral_centroid` and `dynamic_range`, and
/// leaves `tempo` empty when the excerpt has no detectable pulse.
///
/// # Examples
///
/// ```rust
/// use atelier_lucide::{AudioOrigin, AudioSignal};
///
/// let signal = AudioSignal::from_excerpt(Some(150.0), 0.21, 3500.0, 0.12);
/// assert_eq!(signal.origin, AudioOrigin::Excerpt);
/// assert_eq!(signal.valence, None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioSignal {
    pub origin: AudioOrigin,
    /// Beats per minute
    pub tempo: Option<f64>,
    /// Bounded magnitude (RMS-like for excerpts, 0..1 for the catalog)
    pub energy: f64,
    pub danceability: Option<f64>,
    pub valence: Option<f64>,
    pub acousticness: Option<f64>,
    /// Loudness in dB, usually negative
    pub loudness_db: Option<f64>,
    /// Mean spectral centroid in Hz
    pub spectral_centroid: Option<f64>,
    /// max(energy curve) - min(energy curve)
    pub dynamic_range: Option<f64>,
    pub duration_ms: Option<u64>,
}

impl AudioSignal {
    /// Signal built from catalog descriptors.
    pub fn from_catalog(descriptors: &CatalogDescriptors) -> Self {
        Self {
            origin: AudioOrigin::Catalog,
            tempo: Some(descriptors.tempo),
            energy: descriptors.energy,
            danceability: Some(descriptors.danceability),
            valence: Some(descriptors.valence),
            acousticness: Some(descriptors.acousticness),
            loudness_db: Some(descriptors.loudness),
            spectral_centroid: None,
            dynamic_range: None,
            duration_ms: Some(descriptors.duration_ms),
        }
    }

    /// Signal built from a local excerpt analysis.
    pub fn from_excerpt(
        tempo: Option<f64>,
        energy: f64,
        spectral_centroid: f64,
        dynamic_range: f64,
    ) -> Self {
        Self {
            origin: AudioOrigin::Excerpt,
            tempo,
            energy,
            danceability: None,
            valence: None,
            acousticness: None,
            loudness_db: None,
            spectral_centroid: Some(spectral_centroid),
            dynamic_range: Some(dynamic_range),
            duration_ms: None,
        }
    }
}

/// Where the lyrics text behind a [`LyricSignal`] came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LyricOrigin {
    /// Fetched automatically from the named lyrics provider
    Retrieved { provider: String },
    /// Pasted in by the user
    Manual,
}

/// Per-track text descriptors.
///
/// There is no "zero" lyric signal: when no text is available the collector
/// reports [`Signal::Absent`] instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricSignal {
    /// -1 (negative) to +1 (positive)
    pub polarity: f64,
    /// 0 (objective) to 1 (subjective)
    pub subjectivity: f64,
    /// Number of distinct case-folded word tokens
    pub unique_tokens: usize,
    pub origin: LyricOrigin,
    /// First lines of the cleaned lyrics, for display
    pub preview: Vec<String>,
}

/// A public-perception keyword with its weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedTag {
    pub name: String,
    pub weight: f64,
}

/// A neighbouring artist with a similarity weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    pub name: String,
    pub similarity: f64,
}

/// Public perception of an artist: tag cloud plus neighbour list.
///
/// An empty profile is meaningful ("no public perception data") and is
/// distinct from a profile that could not be fetched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagProfile {
    pub tags: Vec<WeightedTag>,
    pub neighbors: Vec<Neighbor>,
}

impl TagProfile {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.neighbors.is_empty()
    }
}

// ================================================================================================
// SIGNAL OUTCOMES
// ================================================================================================

/// Outcome of acquiring one signal.
///
/// Keeps apart the four states a caller needs to render differently:
/// never tried, computed, no data anywhere, and a failing source.
///
/// # Examples
///
/// ```rust
/// use atelier_lucide::Signal;
///
/// let missing: Signal<f64> = Signal::from_option(None);
/// assert_eq!(missing, Signal::Absent);
/// assert!(missing.present().is_none());
///
/// let fresh: Signal<f64> = Signal::default();
/// assert!(!fresh.was_attempted());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Signal<T> {
    /// Acquisition has not been attempted yet
    NotAttempted,
    /// Acquisition succeeded
    Present(T),
    /// Every source was reachable but none had data
    Absent,
    /// A source failed; the reason is kept for display
    Unavailable(String),
}

impl<T> Default for Signal<T> {
    fn default() -> Self {
        Signal::NotAttempted
    }
}

impl<T> Signal<T> {
    /// `Present` for `Some`, `Absent` for `None`.
    pub fn from_option(value: Option<T>) -> Self {
        match value {
            Some(value) => Signal::Present(value),
            None => Signal::Absent,
        }
    }

    /// Borrow the value if present.
    pub fn present(&self) -> Option<&T> {
        match self {
            Signal::Present(value) => Some(value),
            _ => None,
        }
    }

    /// Take the value if present.
    pub fn into_present(self) -> Option<T> {
        match self {
            Signal::Present(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Signal::Present(_))
    }

    pub fn was_attempted(&self) -> bool {
        !matches!(self, Signal::NotAttempted)
    }
}

/// Everything collected for one artist, and optionally one of its tracks.
///
/// Each member is independent: a failing lyrics source leaves `audio` and
/// `tags` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalBundle {
    pub audio: Signal<AudioSignal>,
    pub lyrics: Signal<LyricSignal>,
    pub tags: Signal<TagProfile>,
}
