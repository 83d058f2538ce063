//! Spotify Web API catalog, authenticated with the client-credentials flow.

use super::http::HttpTransport;
use crate::sources::CatalogSource;
use crate::types::{CandidateEntity, CatalogDescriptors, Release, Track};
use crate::{AtelierError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const API_BASE: &str = "https://api.spotify.com/v1";
const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
/// Search endpoints refuse larger pages.
const MAX_PAGE: u32 = 50;
/// Refresh the token this long before Spotify says it expires.
const TOKEN_MARGIN: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub struct SpotifyClient {
    transport: HttpTransport,
    client_id: String,
    client_secret: String,
    market: String,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyClient {
    pub fn new(transport: HttpTransport, client_id: &str, client_secret: &str) -> Self {
        Self {
            transport,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            market: "FR".to_string(),
            token: Mutex::new(None),
        }
    }

    /// Market used for top tracks and releases.
    pub fn with_market(mut self, market: &str) -> Self {
        self.market = market.to_string();
        self
    }

    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.expires_at {
                return Ok(token.value.clone());
            }
        }

        log::debug!("Requesting a Spotify access token");
        let response = self
            .transport
            .post_form(
                TOKEN_URL,
                &[
                    ("grant_type", "client_credentials"),
                    ("client_id", self.client_id.as_str()),
                    ("client_secret", self.client_secret.as_str()),
                ],
                &[],
            )
            .await?;

        if !response.is_success() {
            return Err(AtelierError::Auth(format!(
                "Spotify token request rejected with status {}",
                response.status
            )));
        }

        let token: TokenResponse = response.json()?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_MARGIN);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(token.access_token)
    }

    /// Authenticated GET. `None` for the statuses listed in `missing`.
    async fn api_get(&self, path_and_query: &str, missing: &[u16]) -> Result<Option<String>> {
        let token = self.access_token().await?;
        let bearer = format!("Bearer {token}");
        let url = format!("{API_BASE}{path_and_query}");

        let response = self
            .transport
            .get(&url, &[("Authorization", bearer.as_str()), ("Accept", "application/json")])
            .await?;

        if response.status == 401 {
            *self.token.lock().await = None;
            return Err(AtelierError::Auth("Spotify token rejected".to_string()));
        }
        if missing.contains(&response.status) {
            log::debug!("Spotify returned {} for {path_and_query}", response.status);
            return Ok(None);
        }

        let response = response.error_for_status("Spotify request")?;
        response.text().map(Some)
    }
}

#[async_trait(?Send)]
impl CatalogSource for SpotifyClient {
    async fn search_artists(&self, query: &str, limit: u32) -> Result<Vec<CandidateEntity>> {
        let path = format!(
            "/search?q={}&type=artist&limit={}",
            urlencoding::encode(query),
            limit.clamp(1, MAX_PAGE)
        );
        match self.api_get(&path, &[]).await? {
            Some(body) => parse_artist_search(&body),
            None => Ok(Vec::new()),
        }
    }

    async fn artist(&self, artist_id: &str) -> Result<Option<CandidateEntity>> {
        let path = format!("/artists/{}", urlencoding::encode(artist_id));
        match self.api_get(&path, &[400, 404]).await? {
            Some(body) => parse_artist(&body).map(Some),
            None => Ok(None),
        }
    }

    async fn top_tracks(&self, artist_id: &str) -> Result<Vec<Track>> {
        let path = format!(
            "/artists/{}/top-tracks?market={}",
            urlencoding::encode(artist_id),
            self.market
        );
        match self.api_get(&path, &[404]).await? {
            Some(body) => parse_top_tracks(&body),
            None => Ok(Vec::new()),
        }
    }

    async fn audio_features(&self, track_id: &str) -> Result<Option<CatalogDescriptors>> {
        let path = format!("/audio-features/{}", urlencoding::encode(track_id));
        // 403 is what applications without access to this endpoint receive
        match self.api_get(&path, &[403, 404]).await? {
            Some(body) => parse_audio_features(&body),
            None => Ok(None),
        }
    }

    async fn artist_releases(&self, artist_id: &str) -> Result<Vec<Release>> {
        let path = format!(
            "/artists/{}/albums?include_groups=album,single&market={}&limit=20",
            urlencoding::encode(artist_id),
            self.market
        );
        match self.api_get(&path, &[404]).await? {
            Some(body) => parse_releases(&body),
            None => Ok(Vec::new()),
        }
    }

    async fn genre_tracks(&self, genre: &str, limit: u32) -> Result<Vec<Track>> {
        let query = format!("genre:\"{genre}\"");
        let path = format!(
            "/search?q={}&type=track&limit={}",
            urlencoding::encode(&query),
            limit.clamp(1, MAX_PAGE)
        );
        match self.api_get(&path, &[]).await? {
            Some(body) => parse_track_search(&body),
            None => Ok(Vec::new()),
        }
    }
}

// ================================================================================================
// RESPONSE RECORDS
// ================================================================================================

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expiry")]
    expires_in: u64,
}

fn default_expiry() -> u64 {
    3600
}

#[derive(Deserialize)]
struct Paging<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Deserialize)]
struct ArtistSearchResponse {
    artists: Paging<Option<ApiArtist>>,
}

#[derive(Deserialize)]
struct ApiImage {
    url: String,
}

#[derive(Deserialize)]
struct ApiFollowers {
    total: Option<u64>,
}

#[derive(Deserialize)]
struct ApiExternalUrls {
    spotify: Option<String>,
}

#[derive(Deserialize)]
struct ApiArtist {
    id: String,
    name: String,
    #[serde(default)]
    popularity: u8,
    followers: Option<ApiFollowers>,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    images: Vec<ApiImage>,
    external_urls: Option<ApiExternalUrls>,
}

impl From<ApiArtist> for CandidateEntity {
    fn from(artist: ApiArtist) -> Self {
        Self {
            id: artist.id,
            name: artist.name,
            popularity: artist.popularity.min(100),
            followers: artist.followers.and_then(|f| f.total).unwrap_or(0),
            genres: artist.genres,
            image_url: artist.images.into_iter().next().map(|i| i.url),
            external_url: artist.external_urls.and_then(|u| u.spotify),
        }
    }
}

#[derive(Deserialize)]
struct ApiArtistRef {
    id: Option<String>,
    name: String,
}

#[derive(Deserialize)]
struct ApiAlbumRef {
    name: String,
    #[serde(default)]
    images: Vec<ApiImage>,
}

#[derive(Deserialize)]
struct ApiTrack {
    id: Option<String>,
    name: String,
    album: ApiAlbumRef,
    duration_ms: u64,
    #[serde(default)]
    popularity: u8,
    #[serde(default)]
    artists: Vec<ApiArtistRef>,
    preview_url: Option<String>,
}

impl ApiTrack {
    /// Local files have no catalog id and are skipped.
    fn into_track(self) -> Option<Track> {
        let id = self.id?;
        let (performer_ids, performer_names): (Vec<String>, Vec<String>) = self
            .artists
            .into_iter()
            .map(|artist| (artist.id.unwrap_or_default(), artist.name))
            .unzip();
        Some(Track {
            id,
            name: self.name,
            album_name: self.album.name,
            album_art_url: self.album.images.into_iter().next().map(|i| i.url),
            duration_ms: self.duration_ms,
            popularity: self.popularity.min(100),
            performer_ids,
            performer_names,
            preview_url: self.preview_url,
        })
    }
}

#[derive(Deserialize)]
struct TopTracksResponse {
    tracks: Vec<ApiTrack>,
}

#[derive(Deserialize)]
struct TrackSearchResponse {
    tracks: Paging<Option<ApiTrack>>,
}

#[derive(Deserialize)]
struct ApiAudioFeatures {
    tempo: f64,
    energy: f64,
    danceability: f64,
    valence: f64,
    acousticness: f64,
    loudness: f64,
    duration_ms: u64,
}

#[derive(Deserialize)]
struct ApiAlbum {
    id: String,
    name: String,
    release_date: String,
    album_type: String,
}

fn parse<'de, T: Deserialize<'de>>(json: &'de str, what: &str) -> Result<T> {
    serde_json::from_str(json)
        .map_err(|e| AtelierError::Parse(format!("Invalid Spotify {what} response: {e}")))
}

pub fn parse_artist_search(json: &str) -> Result<Vec<CandidateEntity>> {
    let response: ArtistSearchResponse = parse(json, "artist search")?;
    Ok(response
        .artists
        .items
        .into_iter()
        .flatten()
        .map(CandidateEntity::from)
        .collect())
}

pub fn parse_artist(json: &str) -> Result<CandidateEntity> {
    let artist: ApiArtist = parse(json, "artist")?;
    Ok(artist.into())
}

pub fn parse_top_tracks(json: &str) -> Result<Vec<Track>> {
    let response: TopTracksResponse = parse(json, "top tracks")?;
    Ok(response
        .tracks
        .into_iter()
        .filter_map(ApiTrack::into_track)
        .collect())
}

pub fn parse_track_search(json: &str) -> Result<Vec<Track>> {
    let response: TrackSearchResponse = parse(json, "track search")?;
    Ok(response
        .tracks
        .items
        .into_iter()
        .flatten()
        .filter_map(ApiTrack::into_track)
        .collect())
}

/// `None` when the catalog answers `null` for the track.
pub fn parse_audio_features(json: &str) -> Result<Option<CatalogDescriptors>> {
    let features: Option<ApiAudioFeatures> = parse(json, "audio features")?;
    Ok(features.map(|f| CatalogDescriptors {
        tempo: f.tempo,
        energy: f.energy,
        danceability: f.danceability,
        valence: f.valence,
        acousticness: f.acousticness,
        loudness: f.loudness,
        duration_ms: f.duration_ms,
    }))
}

pub fn parse_releases(json: &str) -> Result<Vec<Release>> {
    let response: Paging<ApiAlbum> = parse(json, "albums")?;
    Ok(response
        .items
        .into_iter()
        .map(|album| Release {
            id: album.id,
            name: album.name,
            release_date: album.release_date,
            kind: album.album_type,
        })
        .collect())
}
