//! HTTP implementations of the collaborator traits in [`crate::sources`].
//!
//! | Concern            | Client             |
//! |--------------------|--------------------|
//! | Catalog            | [`SpotifyClient`]  |
//! | Audio excerpts     | [`DeezerClient`]   |
//! | Lyrics             | [`LyricsOvhClient`], then [`GeniusClient`] |
//! | Tags and neighbours | [`LastFmClient`]  |

pub mod deezer;
pub mod genius;
pub mod http;
pub mod lastfm;
pub mod lyrics_ovh;
pub mod spotify;

pub use deezer::DeezerClient;
pub use genius::GeniusClient;
pub use http::{HttpResponse, HttpTransport};
pub use lastfm::LastFmClient;
pub use lyrics_ovh::LyricsOvhClient;
pub use spotify::SpotifyClient;

use crate::collector::SignalCollector;
use crate::config::{AppConfig, RetryConfig};
use http_client::HttpClient;
use std::sync::Arc;

/// Every collaborator client built from one configuration.
pub struct ClientSet {
    pub catalog: SpotifyClient,
    pub excerpts: DeezerClient,
    /// In fallback order
    pub lyrics: Vec<Box<dyn crate::LyricsSource>>,
    /// `None` without a Last.fm API key
    pub tags: Option<LastFmClient>,
}

impl ClientSet {
    pub fn new(
        config: &AppConfig,
        client: Arc<dyn HttpClient + Send + Sync>,
        retry: RetryConfig,
    ) -> Self {
        let transport = HttpTransport::new(client).with_retry_config(retry);

        let mut lyrics: Vec<Box<dyn crate::LyricsSource>> =
            vec![Box::new(LyricsOvhClient::new(transport.clone()))];
        if config.genius_enabled {
            lyrics.push(Box::new(GeniusClient::new(transport.clone())));
        }

        let tags = config.lastfm_api_key.as_deref().map(|key| {
            log::debug!("Last.fm tag source enabled");
            LastFmClient::new(transport.clone(), key)
        });

        Self {
            catalog: SpotifyClient::new(
                transport.clone(),
                &config.spotify_client_id,
                &config.spotify_client_secret,
            )
            .with_market(&config.market),
            excerpts: DeezerClient::new(transport),
            lyrics,
            tags,
        }
    }

    /// A collector wired to every configured client.
    pub fn collector(&self) -> SignalCollector<'_> {
        let mut collector = SignalCollector::new(&self.catalog).with_excerpts(&self.excerpts);
        for source in &self.lyrics {
            collector = collector.with_lyrics_source(source.as_ref());
        }
        if let Some(tags) = &self.tags {
            collector = collector.with_tags(tags);
        }
        collector
    }
}
