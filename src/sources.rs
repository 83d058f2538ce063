use crate::types::{
    CandidateEntity, CatalogDescriptors, ExcerptCandidate, Neighbor, Release, Track, WeightedTag,
};
use crate::Result;
use async_trait::async_trait;

/// Catalog search, track and descriptor lookups.
///
/// Implementations must return typed, validated records; anything malformed
/// is reported as [`AtelierError::Parse`](crate::AtelierError::Parse).
///
/// # Mocking Support
///
/// When the `mock` feature is enabled, this crate provides `MockCatalogSource`
/// that implements this trait using the `mockall` library.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait CatalogSource {
    /// Free-text artist search, in the catalog's own ranking order.
    async fn search_artists(&self, query: &str, limit: u32) -> Result<Vec<CandidateEntity>>;

    /// Full record of one artist, `None` when the identifier is unknown.
    async fn artist(&self, artist_id: &str) -> Result<Option<CandidateEntity>>;

    /// Most popular tracks the artist appears on.
    async fn top_tracks(&self, artist_id: &str) -> Result<Vec<Track>>;

    /// Native audio descriptors of a track, `None` when the catalog has no usable record.
    async fn audio_features(&self, track_id: &str) -> Result<Option<CatalogDescriptors>>;

    /// Albums and singles of the artist.
    async fn artist_releases(&self, artist_id: &str) -> Result<Vec<Release>>;

    /// Tracks sharing a genre/style label, used as a benchmark cohort.
    async fn genre_tracks(&self, genre: &str, limit: u32) -> Result<Vec<Track>>;
}

/// Secondary catalog providing short downloadable audio excerpts.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait ExcerptSource {
    /// Excerpts matching a performer and a title, best ranked first.
    async fn search_excerpts(&self, performer: &str, title: &str)
        -> Result<Vec<ExcerptCandidate>>;

    /// Raw bytes of an excerpt file.
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}

/// A lyrics text provider.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait LyricsSource {
    /// Short provider name, recorded in [`LyricOrigin::Retrieved`](crate::LyricOrigin::Retrieved).
    fn provider(&self) -> String;

    /// Raw lyrics, or `None` when the provider explicitly has nothing.
    async fn lyrics(&self, performer: &str, title: &str) -> Result<Option<String>>;
}

/// Tag cloud and neighbour graph of an artist.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait(?Send)]
pub trait TagSource {
    /// Weighted public-perception tags. Empty when the source knows nothing.
    async fn top_tags(&self, artist_name: &str) -> Result<Vec<WeightedTag>>;

    /// Similar artists with a similarity weight. Empty when the source knows nothing.
    async fn neighbors(&self, artist_name: &str) -> Result<Vec<Neighbor>>;
}

/// Last-resort lyrics supplied by the user.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ManualLyrics {
    /// Ask for lyrics of `title` by `performer`; `None` when the user declines.
    fn prompt(&self, performer: &str, title: &str) -> Option<String>;
}
