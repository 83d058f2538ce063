use super::http::HttpTransport;
use crate::sources::ExcerptSource;
use crate::types::ExcerptCandidate;
use crate::{AtelierError, Result};
use async_trait::async_trait;
use serde::Deserialize;

const SEARCH_URL: &str = "https://api.deezer.com/search";

/// Deezer public search, used for its 30-second MP3 previews.
///
/// No credentials are needed.
pub struct DeezerClient {
    transport: HttpTransport,
}

impl DeezerClient {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

/// Advanced-search query matching both fields.
pub fn excerpt_query(performer: &str, title: &str) -> String {
    format!(
        "artist:\"{}\" track:\"{}\"",
        performer.replace('"', ""),
        title.replace('"', "")
    )
}

#[async_trait(?Send)]
impl ExcerptSource for DeezerClient {
    async fn search_excerpts(
        &self,
        performer: &str,
        title: &str,
    ) -> Result<Vec<ExcerptCandidate>> {
        let url = format!(
            "{SEARCH_URL}?q={}",
            urlencoding::encode(&excerpt_query(performer, title))
        );
        let response = self
            .transport
            .get(&url, &[])
            .await?
            .error_for_status("Deezer search")?;
        parse_search(&response.text()?)
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .transport
            .get(url, &[])
            .await?
            .error_for_status("Excerpt download")?;
        log::debug!("Downloaded {} bytes of excerpt", response.body.len());
        Ok(response.body)
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchHit>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct SearchHit {
    title: String,
    #[serde(default)]
    preview: String,
    artist: HitArtist,
    album: Option<HitAlbum>,
}

#[derive(Deserialize)]
struct HitArtist {
    name: String,
}

#[derive(Deserialize)]
struct HitAlbum {
    cover_medium: Option<String>,
}

/// Hits without a preview URL are dropped.
pub fn parse_search(json: &str) -> Result<Vec<ExcerptCandidate>> {
    let response: SearchResponse = serde_json::from_str(json)
        .map_err(|e| AtelierError::Parse(format!("Invalid Deezer search response: {e}")))?;

    if let Some(error) = response.error {
        return Err(AtelierError::Http(format!("Deezer error: {}", error.message)));
    }

    Ok(response
        .data
        .into_iter()
        .filter(|hit| !hit.preview.is_empty())
        .map(|hit| ExcerptCandidate {
            title: hit.title,
            performer: hit.artist.name,
            preview_url: hit.preview,
            cover_url: hit.album.and_then(|album| album.cover_medium),
        })
        .collect())
}
