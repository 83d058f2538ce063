//! Signal acquisition for a resolved artist and one of its tracks.
//!
//! Each signal type is acquired independently. A collaborator error is caught
//! at the call site, logged, and turned into [`Signal::Unavailable`] for that
//! signal only; the other signals are still collected.

use crate::analysis::ExcerptAnalyzer;
use crate::benchmark::CohortMember;
use crate::config::{apply_half_time, CollectorOptions};
use crate::resolver::normalize_name;
use crate::sentiment::{analyze_lyrics, LexiconAnalyzer, SentimentAnalyzer};
use crate::sources::{CatalogSource, ExcerptSource, LyricsSource, ManualLyrics, TagSource};
use crate::types::{
    AudioSignal, ExcerptCandidate, LyricOrigin, LyricSignal, Neighbor, ResolvedArtist, Signal,
    SignalBundle, TagProfile, Track, WeightedTag,
};
use crate::Result;
use once_cell::sync::Lazy;
use regex::Regex;

static PARENTHESISED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\(.*?\)").unwrap());

/// Gathers audio, lyric and tag signals from the configured sources.
///
/// Only the catalog is mandatory. Without an excerpt source, tracks lacking
/// catalog descriptors get no audio signal; without a tag source the tag
/// profile stays [`Signal::NotAttempted`].
///
/// # Examples
///
/// ```rust,no_run
/// use atelier_lucide::collector::SignalCollector;
/// use atelier_lucide::{CatalogSource, LyricsSource, ResolvedArtist};
///
/// # async fn example(
/// #     catalog: &dyn CatalogSource,
/// #     lyrics: &dyn LyricsSource,
/// #     artist: &ResolvedArtist,
/// # ) -> atelier_lucide::Result<()> {
/// let collector = SignalCollector::new(catalog).with_lyrics_source(lyrics);
///
/// let tracks = collector.artist_tracks(artist).await?;
/// let bundle = collector.collect(artist, tracks.first()).await;
/// if let Some(lyrics) = bundle.lyrics.present() {
///     println!("polarity {:.2}", lyrics.polarity);
/// }
/// # Ok(())
/// # }
/// ```
pub struct SignalCollector<'a> {
    catalog: &'a dyn CatalogSource,
    excerpts: Option<&'a dyn ExcerptSource>,
    lyrics: Vec<&'a dyn LyricsSource>,
    tags: Option<&'a dyn TagSource>,
    manual: Option<&'a dyn ManualLyrics>,
    sentiment: Box<dyn SentimentAnalyzer + 'a>,
    analyzer: ExcerptAnalyzer,
    options: CollectorOptions,
}

impl<'a> SignalCollector<'a> {
    pub fn new(catalog: &'a dyn CatalogSource) -> Self {
        let options = CollectorOptions::default();
        Self {
            catalog,
            excerpts: None,
            lyrics: Vec::new(),
            tags: None,
            manual: None,
            sentiment: Box::new(LexiconAnalyzer::new()),
            analyzer: ExcerptAnalyzer::new(options.excerpt_seconds),
            options,
        }
    }

    pub fn with_excerpts(mut self, source: &'a dyn ExcerptSource) -> Self {
        self.excerpts = Some(source);
        self
    }

    /// Append a lyrics provider. Providers are queried in insertion order.
    pub fn with_lyrics_source(mut self, source: &'a dyn LyricsSource) -> Self {
        self.lyrics.push(source);
        self
    }

    pub fn with_tags(mut self, source: &'a dyn TagSource) -> Self {
        self.tags = Some(source);
        self
    }

    pub fn with_manual_lyrics(mut self, prompt: &'a dyn ManualLyrics) -> Self {
        self.manual = Some(prompt);
        self
    }

    pub fn with_sentiment(mut self, analyzer: Box<dyn SentimentAnalyzer + 'a>) -> Self {
        self.sentiment = analyzer;
        self
    }

    pub fn with_options(mut self, options: CollectorOptions) -> Self {
        self.analyzer = ExcerptAnalyzer::new(options.excerpt_seconds);
        self.options = options;
        self
    }

    pub fn options(&self) -> &CollectorOptions {
        &self.options
    }

    /// Top tracks truly performed by `artist`.
    ///
    /// Falls back to the unfiltered list when the filter would leave nothing.
    pub async fn artist_tracks(&self, artist: &ResolvedArtist) -> Result<Vec<Track>> {
        let tracks = self.catalog.top_tracks(&artist.id).await?;
        Ok(filter_performed_by(tracks, &artist.id))
    }

    /// Collect every signal. Audio and lyrics need a track; without one they
    /// stay [`Signal::NotAttempted`].
    pub async fn collect(&self, artist: &ResolvedArtist, track: Option<&Track>) -> SignalBundle {
        let tags = self.collect_tags(&artist.name).await;

        let (audio, lyrics) = match track {
            Some(track) => (
                self.collect_audio(artist, track).await,
                self.collect_lyrics(&artist.name, &track.name).await,
            ),
            None => (Signal::NotAttempted, Signal::NotAttempted),
        };

        SignalBundle {
            audio,
            lyrics,
            tags,
        }
    }

    /// Catalog descriptors first, then a locally analysed excerpt.
    pub async fn collect_audio(&self, artist: &ResolvedArtist, track: &Track) -> Signal<AudioSignal> {
        let mut failure: Option<String> = None;

        match self.catalog.audio_features(&track.id).await {
            Ok(Some(descriptors)) => {
                log::debug!("Catalog descriptors found for '{}'", track.name);
                return Signal::Present(AudioSignal::from_catalog(&descriptors));
            }
            Ok(None) => log::info!("No catalog descriptors for '{}', trying an excerpt", track.name),
            Err(e) => {
                log::warn!("Catalog descriptor lookup failed for '{}': {e}", track.name);
                failure = Some(e.to_string());
            }
        }

        let Some(excerpts) = self.excerpts else {
            return match failure {
                Some(reason) => Signal::Unavailable(reason),
                None => Signal::Absent,
            };
        };

        let performer = track.primary_performer().unwrap_or(&artist.name);
        let title = clean_title(&track.name);

        let matched_url = match excerpts.search_excerpts(performer, &title).await {
            Ok(candidates) => select_excerpt(&candidates, performer, &title)
                .map(|candidate| candidate.preview_url.clone()),
            Err(e) => {
                log::warn!("Excerpt search failed for '{performer} - {title}': {e}");
                failure = Some(e.to_string());
                None
            }
        };

        let Some(url) = matched_url.or_else(|| track.preview_url.clone()) else {
            log::info!("No excerpt available for '{}'", track.name);
            return match failure {
                Some(reason) => Signal::Unavailable(reason),
                None => Signal::Absent,
            };
        };

        let bytes = match excerpts.download(&url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Excerpt download failed: {e}");
                return Signal::Unavailable(e.to_string());
            }
        };

        match self.analyzer.analyze_bytes(&bytes) {
            Ok(analysis) => {
                let Some(centroid) = analysis.spectral_centroid else {
                    log::info!("Excerpt for '{}' is silent", track.name);
                    return Signal::Absent;
                };
                let tempo = analysis
                    .tempo
                    .map(|bpm| apply_half_time(&self.options.half_time_rules, &artist.genres, bpm));
                let mut signal = AudioSignal::from_excerpt(
                    tempo,
                    analysis.energy,
                    centroid,
                    analysis.dynamic_range,
                );
                signal.duration_ms = Some(track.duration_ms);
                Signal::Present(signal)
            }
            Err(e) => {
                log::warn!("Excerpt for '{}' could not be analysed: {e}", track.name);
                Signal::Absent
            }
        }
    }

    /// Lyrics by full performer name, then by its last word, then by prompt.
    pub async fn collect_lyrics(&self, performer: &str, title: &str) -> Signal<LyricSignal> {
        let title = clean_title(title);
        let mut names = vec![performer.trim()];
        if let Some(short) = short_performer(performer) {
            names.push(short);
        }

        let mut failures: Vec<String> = Vec::new();

        for name in names {
            for source in &self.lyrics {
                let provider = source.provider();
                match source.lyrics(name, &title).await {
                    Ok(Some(text)) => {
                        let origin = LyricOrigin::Retrieved {
                            provider: provider.clone(),
                        };
                        if let Some(signal) = self.lyric_signal(&text, origin) {
                            log::debug!("Lyrics for '{name} - {title}' found on {provider}");
                            return Signal::Present(signal);
                        }
                    }
                    Ok(None) => log::debug!("{provider} has no lyrics for '{name} - {title}'"),
                    Err(e) => {
                        log::warn!("{provider} lyrics lookup failed: {e}");
                        failures.push(format!("{provider}: {e}"));
                    }
                }
            }
        }

        if let Some(manual) = self.manual {
            log::info!("No lyrics retrieved for '{performer} - {title}', asking the user");
            if let Some(signal) = manual
                .prompt(performer, &title)
                .and_then(|text| self.lyric_signal(&text, LyricOrigin::Manual))
            {
                return Signal::Present(signal);
            }
        }

        if failures.is_empty() {
            Signal::Absent
        } else {
            Signal::Unavailable(failures.join("; "))
        }
    }

    fn lyric_signal(&self, text: &str, origin: LyricOrigin) -> Option<LyricSignal> {
        analyze_lyrics(
            text,
            origin,
            self.sentiment.as_ref(),
            self.options.lyric_preview_lines,
        )
    }

    /// Tag cloud and neighbours, deduplicated and ranked by weight.
    ///
    /// A source without data gives an empty profile, not an absent one.
    pub async fn collect_tags(&self, artist_name: &str) -> Signal<TagProfile> {
        let Some(source) = self.tags else {
            return Signal::NotAttempted;
        };

        let tags = match source.top_tags(artist_name).await {
            Ok(tags) => tags,
            Err(e) => {
                log::warn!("Tag lookup failed for '{artist_name}': {e}");
                return Signal::Unavailable(e.to_string());
            }
        };
        let neighbors = match source.neighbors(artist_name).await {
            Ok(neighbors) => neighbors,
            Err(e) => {
                log::warn!("Neighbour lookup failed for '{artist_name}': {e}");
                return Signal::Unavailable(e.to_string());
            }
        };

        Signal::Present(TagProfile {
            tags: rank_by_weight(tags, self.options.tag_limit),
            neighbors: rank_by_weight(neighbors, self.options.neighbor_limit),
        })
    }

    /// Benchmark record of one track, `None` without full catalog descriptors.
    pub async fn cohort_member(&self, track: &Track) -> Result<Option<CohortMember>> {
        let descriptors = self.catalog.audio_features(&track.id).await?;
        Ok(descriptors.and_then(|d| {
            CohortMember::from_signal(&AudioSignal::from_catalog(&d), track.popularity)
        }))
    }

    /// Reference tracks of `genre` that carry full descriptors.
    ///
    /// Members whose descriptor lookup fails are skipped; the caller decides
    /// what an empty cohort means.
    pub async fn collect_cohort(&self, genre: &str, size: u32) -> Result<Vec<CohortMember>> {
        let tracks = self.catalog.genre_tracks(genre, size).await?;
        let mut cohort = Vec::with_capacity(tracks.len());

        for track in &tracks {
            match self.cohort_member(track).await {
                Ok(Some(member)) => cohort.push(member),
                Ok(None) => log::trace!("No descriptors for cohort track '{}'", track.name),
                Err(e) => log::warn!("Skipping cohort track '{}': {e}", track.name),
            }
        }

        log::info!(
            "Cohort for '{genre}': {} of {} tracks usable",
            cohort.len(),
            tracks.len()
        );
        Ok(cohort)
    }
}

/// Keep tracks listing `artist_id` among their performers.
///
/// Returns `tracks` unchanged when none does.
pub fn filter_performed_by(tracks: Vec<Track>, artist_id: &str) -> Vec<Track> {
    let own: Vec<Track> = tracks
        .iter()
        .filter(|track| track.is_performed_by(artist_id))
        .cloned()
        .collect();
    if own.is_empty() {
        log::debug!("No track lists {artist_id} as performer, keeping all");
        tracks
    } else {
        own
    }
}

/// Drop parenthesised groups and anything after a hyphen.
///
/// `"Tout oublier (feat. Roméo Elvis) - Remix"` becomes `"Tout oublier"`.
/// A title that would end up empty is returned trimmed but otherwise intact.
pub fn clean_title(title: &str) -> String {
    let without_groups = PARENTHESISED.replace_all(title, "");
    let cleaned = without_groups.split('-').next().unwrap_or_default().trim();
    if cleaned.is_empty() {
        title.trim().to_string()
    } else {
        cleaned.to_string()
    }
}

/// Last word of a multi-word performer name.
pub fn short_performer(performer: &str) -> Option<&str> {
    let trimmed = performer.trim();
    trimmed
        .split_whitespace()
        .last()
        .filter(|last| *last != trimmed)
}

/// First excerpt whose performer and title both contain the query, compared
/// in normalised form; otherwise the top-ranked excerpt.
pub fn select_excerpt<'c>(
    candidates: &'c [ExcerptCandidate],
    performer: &str,
    title: &str,
) -> Option<&'c ExcerptCandidate> {
    let performer = normalize_name(performer);
    let title = normalize_name(title);

    candidates
        .iter()
        .find(|candidate| {
            normalize_name(&candidate.performer).contains(&performer)
                && normalize_name(&candidate.title).contains(&title)
        })
        .or_else(|| candidates.first())
}

/// A named item carrying a weight.
trait Weighted {
    fn key(&self) -> &str;
    fn weight(&self) -> f64;
}

impl Weighted for WeightedTag {
    fn key(&self) -> &str {
        &self.name
    }

    fn weight(&self) -> f64 {
        self.weight
    }
}

impl Weighted for Neighbor {
    fn key(&self) -> &str {
        &self.name
    }

    fn weight(&self) -> f64 {
        self.similarity
    }
}

/// Deduplicate case-insensitively (heaviest entry wins), sort by descending
/// weight keeping source order on ties, truncate to `limit`.
fn rank_by_weight<T: Weighted>(items: Vec<T>, limit: usize) -> Vec<T> {
    let mut kept: Vec<(String, T)> = Vec::with_capacity(items.len());

    for item in items {
        let key = item.key().trim().to_lowercase();
        if key.is_empty() {
            continue;
        }
        match kept.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, existing)) => {
                if item.weight() > existing.weight() {
                    *existing = item;
                }
            }
            None => kept.push((key, item)),
        }
    }

    let mut ranked: Vec<T> = kept.into_iter().map(|(_, item)| item).collect();
    ranked.sort_by(|a, b| b.weight().total_cmp(&a.weight()));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(name: &str, weight: f64) -> WeightedTag {
        WeightedTag {
            name: name.to_string(),
            weight,
        }
    }

    fn excerpt(performer: &str, title: &str) -> ExcerptCandidate {
        ExcerptCandidate {
            title: title.to_string(),
            performer: performer.to_string(),
            preview_url: format!("https://cdn.example/{title}.mp3"),
            cover_url: None,
        }
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("Balance ton quoi (Live)"), "Balance ton quoi");
        assert_eq!(clean_title("Tout oublier - Remix"), "Tout oublier");
        assert_eq!(
            clean_title("Tout oublier (feat. Roméo Elvis) - Remix"),
            "Tout oublier"
        );
        assert_eq!(clean_title("(Intro)"), "(Intro)");
        assert_eq!(clean_title("Flemme"), "Flemme");
    }

    #[test]
    fn test_short_performer() {
        assert_eq!(short_performer("Angèle"), None);
        assert_eq!(short_performer("Ibrahim Maalouf"), Some("Maalouf"));
        assert_eq!(short_performer("  Soprano "), None);
    }

    #[test]
    fn test_select_excerpt_prefers_matching_candidate() {
        let candidates = vec![
            excerpt("Tribute Band", "Alors on danse"),
            excerpt("Stromae", "Alors On Danse (Radio Edit)"),
        ];
        let chosen = select_excerpt(&candidates, "Stromae", "Alors on danse").unwrap();
        assert_eq!(chosen.performer, "Stromae");

        let chosen = select_excerpt(&candidates, "Nobody", "Nothing").unwrap();
        assert_eq!(chosen.performer, "Tribute Band");
        assert!(select_excerpt(&[], "Stromae", "Papaoutai").is_none());
    }

    #[test]
    fn test_rank_by_weight_dedupes_and_truncates() {
        let ranked = rank_by_weight(
            vec![
                tag("pop", 40.0),
                tag("French", 100.0),
                tag("POP", 60.0),
                tag("", 99.0),
                tag("belgian", 60.0),
                tag("chanson", 10.0),
            ],
            3,
        );
        let names: Vec<&str> = ranked.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["French", "POP", "belgian"]);
    }

    #[test]
    fn test_filter_performed_by_falls_back() {
        let mut own = crate::types::Track {
            id: "t1".to_string(),
            name: "Own".to_string(),
            album_name: "A".to_string(),
            album_art_url: None,
            duration_ms: 1000,
            popularity: 10,
            performer_ids: vec!["artist".to_string()],
            performer_names: vec!["Artist".to_string()],
            preview_url: None,
        };
        let mut guest = own.clone();
        guest.id = "t2".to_string();
        guest.performer_ids = vec!["other".to_string()];

        let filtered = filter_performed_by(vec![own.clone(), guest.clone()], "artist");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "t1");

        own.performer_ids = vec!["someone".to_string()];
        let unfiltered = filter_performed_by(vec![own, guest], "artist");
        assert_eq!(unfiltered.len(), 2);
    }
}
