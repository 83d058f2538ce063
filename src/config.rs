//! Configuration: heuristic thresholds, collector options, retry policy and
//! API credentials.
//!
//! Every numeric breakpoint used by the label, dissonance and benchmark
//! functions lives here as data. The `Default` values are the stock
//! breakpoints; the `with_*` builders allow tuning.

use crate::{AtelierError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ================================================================================================
// SCORING THRESHOLDS
// ================================================================================================

/// Breakpoints of the qualitative label functions.
///
/// Each array lists ascending upper bounds; a value at or above the last
/// bound falls into the final label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelThresholds {
    /// BPM: slow / moderate / fast / very fast
    pub tempo: [f64; 3],
    /// RMS energy: calm / moderate / intense
    pub energy: [f64; 2],
    /// Spectral centroid in Hz: dark / balanced / bright
    pub brightness: [f64; 2],
    /// Energy dynamic range: compressed / moderate / dynamic
    pub dynamic_range: [f64; 2],
    /// Catalog popularity: confidential / emerging / growing / established / mainstream
    pub popularity: [f64; 4],
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            tempo: [80.0, 110.0, 140.0],
            energy: [0.15, 0.30],
            brightness: [1500.0, 3500.0],
            dynamic_range: [0.10, 0.25],
            popularity: [15.0, 25.0, 50.0, 75.0],
        }
    }
}

/// Band limits of the dissonance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DissonanceThresholds {
    /// Below this the track is "very coherent"
    pub coherent: f64,
    /// At or above this the track shows "strong creative tension"
    pub tension: f64,
}

impl Default for DissonanceThresholds {
    fn default() -> Self {
        Self {
            coherent: 0.2,
            tension: 0.4,
        }
    }
}

/// Tolerances of the benchmark diagnostic rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkThresholds {
    /// Duration delta in seconds
    pub duration_secs: f64,
    pub energy: f64,
    pub danceability: f64,
    pub valence: f64,
    /// Clamp renormalised loudness into [0, 1]
    pub clamp_loudness: bool,
}

impl Default for BenchmarkThresholds {
    fn default() -> Self {
        Self {
            duration_secs: 30.0,
            energy: 0.15,
            danceability: 0.15,
            valence: 0.2,
            clamp_loudness: true,
        }
    }
}

/// All scoring thresholds in one place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub labels: LabelThresholds,
    pub dissonance: DissonanceThresholds,
    pub benchmark: BenchmarkThresholds,
}

// ================================================================================================
// HALF-TIME TEMPO CORRECTION
// ================================================================================================

/// Halve a locally detected tempo for artists tagged with certain genres.
///
/// Beat tracking on trap-like material tends to lock onto the hi-hat grid
/// and report double the felt tempo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HalfTimeRule {
    /// Matched case-insensitively against each genre tag
    pub tag_substring: String,
    /// Tempo must be strictly above this to be halved
    pub min_bpm: f64,
}

impl HalfTimeRule {
    pub fn new(tag_substring: &str, min_bpm: f64) -> Self {
        Self {
            tag_substring: tag_substring.to_lowercase(),
            min_bpm,
        }
    }

    fn matches(&self, genres: &[String], bpm: f64) -> bool {
        bpm > self.min_bpm
            && genres
                .iter()
                .any(|genre| genre.to_lowercase().contains(&self.tag_substring))
    }
}

/// The rule table used when none is configured.
pub fn default_half_time_rules() -> Vec<HalfTimeRule> {
    vec![
        HalfTimeRule::new("drill", 130.0),
        HalfTimeRule::new("hip hop", 130.0),
        HalfTimeRule::new("rap", 130.0),
    ]
}

/// Apply the first matching rule of `rules` to `bpm`.
///
/// Returns the tempo unchanged when no rule matches.
pub fn apply_half_time(rules: &[HalfTimeRule], genres: &[String], bpm: f64) -> f64 {
    if rules.iter().any(|rule| rule.matches(genres, bpm)) {
        log::debug!("Half-time correction applied: {bpm:.1} -> {:.1} BPM", bpm / 2.0);
        bpm / 2.0
    } else {
        bpm
    }
}

// ================================================================================================
// COLLECTOR OPTIONS
// ================================================================================================

/// Knobs of the signal collector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectorOptions {
    /// Maximum number of tags kept in a tag profile
    pub tag_limit: usize,
    /// Maximum number of neighbours kept in a tag profile
    pub neighbor_limit: usize,
    /// Seconds of excerpt audio to analyse
    pub excerpt_seconds: f64,
    /// Lines of lyrics kept for preview
    pub lyric_preview_lines: usize,
    pub half_time_rules: Vec<HalfTimeRule>,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            tag_limit: 10,
            neighbor_limit: 10,
            excerpt_seconds: 30.0,
            lyric_preview_lines: 15,
            half_time_rules: default_half_time_rules(),
        }
    }
}

impl CollectorOptions {
    pub fn with_tag_limit(mut self, limit: usize) -> Self {
        self.tag_limit = limit;
        self
    }

    pub fn with_neighbor_limit(mut self, limit: usize) -> Self {
        self.neighbor_limit = limit;
        self
    }

    pub fn with_half_time_rules(mut self, rules: Vec<HalfTimeRule>) -> Self {
        self.half_time_rules = rules;
        self
    }
}

// ================================================================================================
// RETRY CONFIGURATION
// ================================================================================================

/// Retry behaviour of the HTTP collaborators.
///
/// Only rate-limit responses are retried. The scoring core itself never
/// retries anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Base delay for exponential backoff (in seconds)
    pub base_delay: u64,
    /// Maximum delay cap (in seconds)
    pub max_delay: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: 2,
            max_delay: 60,
        }
    }
}

impl RetryConfig {
    /// Configuration that never retries.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            base_delay: 0,
            max_delay: 0,
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

// ================================================================================================
// CREDENTIALS
// ================================================================================================

/// API credentials of the HTTP collaborators.
///
/// Loaded from `<config dir>/atelier-lucide/config.json`, with environment
/// variables taking precedence over file values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub spotify_client_id: Option<String>,
    #[serde(default)]
    pub spotify_client_secret: Option<String>,
    #[serde(default)]
    pub lastfm_api_key: Option<String>,
    /// Scrape Genius when lyrics.ovh has nothing
    #[serde(default = "default_true")]
    pub genius_enabled: bool,
}

fn default_true() -> bool {
    true
}

/// Fully validated application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub spotify_client_id: String,
    pub spotify_client_secret: String,
    /// Tag profiles are skipped when no key is configured
    pub lastfm_api_key: Option<String>,
    pub genius_enabled: bool,
    /// Catalog market used for top tracks and releases
    pub market: String,
}

impl AppConfig {
    /// Path of the JSON configuration file.
    ///
    /// Returns a path like `~/.config/atelier-lucide/config.json`.
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AtelierError::Config("Cannot determine config directory".to_string()))?;
        Ok(config_dir.join("atelier-lucide").join("config.json"))
    }

    /// Load the configuration file (if any) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let file_credentials = if path.exists() {
            log::debug!("Loading configuration from {}", path.display());
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents).map_err(|e| {
                AtelierError::Config(format!("Invalid config file {}: {e}", path.display()))
            })?
        } else {
            Credentials {
                genius_enabled: true,
                ..Credentials::default()
            }
        };

        let credentials = Credentials {
            spotify_client_id: std::env::var("SPOTIFY_CLIENT_ID")
                .ok()
                .or(file_credentials.spotify_client_id),
            spotify_client_secret: std::env::var("SPOTIFY_CLIENT_SECRET")
                .ok()
                .or(file_credentials.spotify_client_secret),
            lastfm_api_key: std::env::var("LASTFM_API_KEY")
                .ok()
                .or(file_credentials.lastfm_api_key),
            genius_enabled: file_credentials.genius_enabled,
        };

        Self::from_credentials(credentials)
    }

    /// Validate raw credentials.
    pub fn from_credentials(credentials: Credentials) -> Result<Self> {
        let spotify_client_id = non_blank(credentials.spotify_client_id)
            .ok_or_else(|| AtelierError::Config("SPOTIFY_CLIENT_ID is not set".to_string()))?;
        let spotify_client_secret = non_blank(credentials.spotify_client_secret)
            .ok_or_else(|| AtelierError::Config("SPOTIFY_CLIENT_SECRET is not set".to_string()))?;

        Ok(Self {
            spotify_client_id,
            spotify_client_secret,
            lastfm_api_key: non_blank(credentials.lastfm_api_key),
            genius_enabled: credentials.genius_enabled,
            market: "FR".to_string(),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let thresholds = Thresholds::default();
        assert_eq!(thresholds.labels.tempo, [80.0, 110.0, 140.0]);
        assert_eq!(thresholds.labels.popularity, [15.0, 25.0, 50.0, 75.0]);
        assert_eq!(thresholds.dissonance.coherent, 0.2);
        assert_eq!(thresholds.dissonance.tension, 0.4);
        assert_eq!(thresholds.benchmark.duration_secs, 30.0);
        assert!(thresholds.benchmark.clamp_loudness);
    }

    #[test]
    fn test_half_time_applies_only_above_threshold() {
        let rules = default_half_time_rules();
        let genres = vec!["French Trap".to_string()];

        assert_eq!(apply_half_time(&rules, &genres, 150.0), 75.0);
        assert_eq!(apply_half_time(&rules, &genres, 130.0), 130.0);
        assert_eq!(
            apply_half_time(&rules, &["chanson".to_string()], 150.0),
            150.0
        );
    }

    #[test]
    fn test_default_half_time_rules_do_not_overlap() {
        let rules = default_half_time_rules();
        for (i, rule) in rules.iter().enumerate() {
            for (j, other) in rules.iter().enumerate() {
                if i != j {
                    assert!(
                        !rule.tag_substring.contains(&other.tag_substring),
                        "'{}' is already covered by '{}'",
                        rule.tag_substring,
                        other.tag_substring
                    );
                }
            }
        }
        assert_eq!(rules.len(), 3);
    }

    #[test]
    fn test_credentials_validation() {
        let missing = AppConfig::from_credentials(Credentials::default());
        assert!(matches!(missing, Err(AtelierError::Config(_))));

        let config = AppConfig::from_credentials(Credentials {
            spotify_client_id: Some("id".to_string()),
            spotify_client_secret: Some("secret".to_string()),
            lastfm_api_key: Some("  ".to_string()),
            genius_enabled: false,
        })
        .unwrap();
        assert_eq!(config.spotify_client_id, "id");
        assert_eq!(config.lastfm_api_key, None);
        assert!(!config.genius_enabled);
    }

    #[test]
    fn test_credentials_file_defaults() {
        let credentials: Credentials =
            serde_json::from_str(r#"{"spotify_client_id": "abc"}"#).unwrap();
        assert_eq!(credentials.spotify_client_id.as_deref(), Some("abc"));
        assert!(credentials.genius_enabled);
    }
}
