//! Disambiguation of a free-text query against a weakly ranked candidate list.
//!
//! The resolver is pure: the caller runs the catalog search and hands the
//! candidates in. Matching works on a normalised form of the names (lower
//! case, only `[a-z0-9]` kept) and walks four tiers in order:
//!
//! 1. exact normalised match
//! 2. normalised name starts with the normalised query
//! 3. normalised name contains the normalised query
//! 4. no textual match: every candidate
//!
//! The first non-empty tier wins and the most popular candidate of that tier
//! is chosen, ties going to the earliest candidate in list order.
//!
//! Accented letters are dropped, not folded, so "Angèle" normalises to
//! `angle` while "Angele" normalises to `angele`. Folding can be enabled with
//! [`EntityResolver::with_diacritic_folding`].

use crate::types::{CandidateEntity, ResolvedArtist};
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Catalog artist URLs and URIs, e.g. `https://open.spotify.com/artist/<id>`
/// or `spotify:artist:<id>`.
static ENTITY_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?:open\.spotify\.com/(?:intl-[a-zA-Z-]+/)?artist/|spotify:artist:)([A-Za-z0-9]{22})",
    )
    .unwrap()
});

/// Outcome of [`EntityResolver::resolve`].
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// A candidate was selected
    Resolved(ResolvedArtist),
    /// The query was an entity URL; the caller must fetch this identifier
    ById(String),
    /// No candidate to choose from
    NotFound,
}

impl Resolution {
    /// The resolved artist, if a candidate was selected.
    pub fn artist(&self) -> Option<&ResolvedArtist> {
        match self {
            Resolution::Resolved(artist) => Some(artist),
            _ => None,
        }
    }
}

/// Which tier a candidate was selected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    Exact,
    Prefix,
    Substring,
    Fallback,
}

/// Picks one canonical artist out of catalog search results.
///
/// # Examples
///
/// ```rust
/// use atelier_lucide::{CandidateEntity, EntityResolver, Resolution};
///
/// let candidates = vec![
///     CandidateEntity::named("1", "Dua Lipa", 95),
///     CandidateEntity::named("2", "Angèle", 40),
///     CandidateEntity::named("3", "Angèle VL", 10),
/// ];
///
/// let resolution = EntityResolver::new().resolve("Angèle", &candidates);
/// assert_eq!(resolution.artist().map(|a| a.id.as_str()), Some("2"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EntityResolver {
    fold_diacritics: bool,
}

impl EntityResolver {
    /// Resolver without accent folding.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold accented letters to their base letter before stripping.
    pub fn with_diacritic_folding(mut self, fold: bool) -> Self {
        self.fold_diacritics = fold;
        self
    }

    /// Normalise a name for comparison.
    pub fn normalize(&self, name: &str) -> String {
        if self.fold_diacritics {
            let folded: String = name.nfkd().filter(|c| !is_combining_mark(*c)).collect();
            normalize_name(&folded)
        } else {
            normalize_name(name)
        }
    }

    /// Resolve `query` against `candidates`.
    ///
    /// Deterministic: identical inputs always give identical results.
    pub fn resolve(&self, query: &str, candidates: &[CandidateEntity]) -> Resolution {
        if let Some(id) = parse_entity_url(query) {
            log::debug!("Query is an entity URL, resolving by id {id}");
            return Resolution::ById(id);
        }

        match self.select(query, candidates) {
            Some((candidate, tier)) => {
                log::debug!(
                    "Resolved '{query}' to '{}' (popularity {}, tier {tier:?})",
                    candidate.name,
                    candidate.popularity
                );
                Resolution::Resolved(candidate.clone().into())
            }
            None => Resolution::NotFound,
        }
    }

    /// Select the winning candidate and report the tier it came from.
    pub fn select<'c>(
        &self,
        query: &str,
        candidates: &'c [CandidateEntity],
    ) -> Option<(&'c CandidateEntity, MatchTier)> {
        if candidates.is_empty() {
            return None;
        }

        let normalized_query = self.normalize(query);
        let normalized: Vec<String> = candidates.iter().map(|c| self.normalize(&c.name)).collect();

        let tiers: [(MatchTier, fn(&str, &str) -> bool); 3] = [
            (MatchTier::Exact, |name, query| name == query),
            (MatchTier::Prefix, |name, query| name.starts_with(query)),
            (MatchTier::Substring, |name, query| name.contains(query)),
        ];

        for (tier, matches) in tiers {
            let best = most_popular(
                candidates
                    .iter()
                    .zip(&normalized)
                    .filter(|(_, name)| matches(name, &normalized_query))
                    .map(|(candidate, _)| candidate),
            );
            if let Some(best) = best {
                return Some((best, tier));
            }
        }

        most_popular(candidates.iter()).map(|best| (best, MatchTier::Fallback))
    }
}

/// Highest popularity wins; the first one seen wins ties.
fn most_popular<'c>(
    candidates: impl Iterator<Item = &'c CandidateEntity>,
) -> Option<&'c CandidateEntity> {
    candidates.fold(None::<&'c CandidateEntity>, |best, candidate| match best {
        Some(current) if current.popularity >= candidate.popularity => Some(current),
        _ => Some(candidate),
    })
}

/// Lower-case and keep only `[a-z0-9]`.
///
/// Locale-naive: characters outside ASCII are dropped, not transliterated.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Extract the artist identifier from a catalog URL or URI.
pub fn parse_entity_url(query: &str) -> Option<String> {
    ENTITY_URL
        .captures(query.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn is_combining_mark(c: char) -> bool {
    matches!(c as u32, 0x0300..=0x036F | 0x1AB0..=0x1AFF | 0x1DC0..=0x1DFF | 0xFE20..=0xFE2F)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates(entries: &[(&str, u8)]) -> Vec<CandidateEntity> {
        entries
            .iter()
            .enumerate()
            .map(|(i, (name, pop))| CandidateEntity::named(&format!("id{i}"), name, *pop))
            .collect()
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("The Beatles!"), "thebeatles");
        assert_eq!(normalize_name("Angèle"), "angle");
        assert_eq!(normalize_name("Angele"), "angele");
        assert_eq!(normalize_name("AC/DC 2"), "acdc2");
    }

    #[test]
    fn test_folding_is_opt_in() {
        let folding = EntityResolver::new().with_diacritic_folding(true);
        assert_eq!(folding.normalize("Angèle"), "angele");
        assert_eq!(EntityResolver::new().normalize("Angèle"), "angle");
    }

    #[test]
    fn test_parse_entity_url() {
        assert_eq!(
            parse_entity_url("https://open.spotify.com/artist/4tZwfgrHOc3mvqYlEYSvVi?si=abc"),
            Some("4tZwfgrHOc3mvqYlEYSvVi".to_string())
        );
        assert_eq!(
            parse_entity_url("https://open.spotify.com/intl-fr/artist/4tZwfgrHOc3mvqYlEYSvVi"),
            Some("4tZwfgrHOc3mvqYlEYSvVi".to_string())
        );
        assert_eq!(
            parse_entity_url("spotify:artist:4tZwfgrHOc3mvqYlEYSvVi"),
            Some("4tZwfgrHOc3mvqYlEYSvVi".to_string())
        );
        assert_eq!(parse_entity_url("Daft Punk"), None);
    }

    #[test]
    fn test_url_short_circuits_ranking() {
        let list = candidates(&[("Daft Punk", 90)]);
        let resolution =
            EntityResolver::new().resolve("spotify:artist:4tZwfgrHOc3mvqYlEYSvVi", &list);
        assert_eq!(
            resolution,
            Resolution::ById("4tZwfgrHOc3mvqYlEYSvVi".to_string())
        );
    }

    #[test]
    fn test_prefix_beats_substring() {
        let list = candidates(&[("The Stromae Tribute", 80), ("Stromae Live", 20)]);
        let (best, tier) = EntityResolver::new().select("stromae", &list).unwrap();
        assert_eq!(best.name, "Stromae Live");
        assert_eq!(tier, MatchTier::Prefix);
    }

    #[test]
    fn test_substring_tier() {
        let list = candidates(&[("Fan de Orelsan", 5), ("Les Orelsan", 7), ("Nekfeu", 90)]);
        let (best, tier) = EntityResolver::new().select("orelsan", &list).unwrap();
        assert_eq!(best.name, "Les Orelsan");
        assert_eq!(tier, MatchTier::Substring);
    }

    #[test]
    fn test_fallback_takes_most_popular() {
        let list = candidates(&[("Alpha", 10), ("Beta", 60), ("Gamma", 60)]);
        let (best, tier) = EntityResolver::new().select("zzz", &list).unwrap();
        assert_eq!(best.name, "Beta");
        assert_eq!(tier, MatchTier::Fallback);
    }

    #[test]
    fn test_ties_keep_list_order() {
        let list = candidates(&[("Muse", 50), ("MUSE", 50)]);
        let (best, _) = EntityResolver::new().select("muse", &list).unwrap();
        assert_eq!(best.id, "id0");
    }

    #[test]
    fn test_empty_candidates_is_not_found() {
        assert_eq!(EntityResolver::new().resolve("anything", &[]), Resolution::NotFound);
    }
}
