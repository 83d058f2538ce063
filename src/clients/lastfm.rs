use super::http::HttpTransport;
use crate::sources::TagSource;
use crate::types::{Neighbor, WeightedTag};
use crate::{AtelierError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer};

const API_BASE: &str = "https://ws.audioscrobbler.com/2.0/";

/// Last.fm error code for an unknown artist.
const ERROR_INVALID_PARAMETERS: u32 = 6;

/// Last.fm tag cloud and similar-artist graph.
pub struct LastFmClient {
    transport: HttpTransport,
    api_key: String,
}

impl LastFmClient {
    pub fn new(transport: HttpTransport, api_key: &str) -> Self {
        Self {
            transport,
            api_key: api_key.to_string(),
        }
    }

    async fn call(&self, method: &str, artist_name: &str) -> Result<String> {
        let url = format!(
            "{API_BASE}?method={method}&artist={}&autocorrect=1&api_key={}&format=json",
            urlencoding::encode(artist_name),
            urlencoding::encode(&self.api_key)
        );
        let response = self.transport.get(&url, &[]).await?;
        // Last.fm reports API errors with a JSON body and a 4xx status
        if !response.is_success() && response.status != 400 && response.status != 404 {
            return Err(AtelierError::Http(format!(
                "Last.fm {method} failed with status {}",
                response.status
            )));
        }
        response.text()
    }
}

#[async_trait(?Send)]
impl TagSource for LastFmClient {
    async fn top_tags(&self, artist_name: &str) -> Result<Vec<WeightedTag>> {
        let body = self.call("artist.gettoptags", artist_name).await?;
        parse_top_tags(&body)
    }

    async fn neighbors(&self, artist_name: &str) -> Result<Vec<Neighbor>> {
        let body = self.call("artist.getsimilar", artist_name).await?;
        parse_similar(&body)
    }
}

#[derive(Deserialize)]
struct ApiError {
    error: u32,
    #[serde(default)]
    message: String,
}

#[derive(Deserialize)]
struct TopTagsResponse {
    toptags: TopTags,
}

#[derive(Deserialize)]
struct TopTags {
    #[serde(default)]
    tag: Vec<ApiTag>,
}

#[derive(Deserialize)]
struct ApiTag {
    name: String,
    #[serde(default, deserialize_with = "lenient_number")]
    count: f64,
}

#[derive(Deserialize)]
struct SimilarResponse {
    similarartists: SimilarArtists,
}

#[derive(Deserialize)]
struct SimilarArtists {
    #[serde(default)]
    artist: Vec<ApiSimilar>,
}

#[derive(Deserialize)]
struct ApiSimilar {
    name: String,
    #[serde(default, rename = "match", deserialize_with = "lenient_number")]
    similarity: f64,
}

/// Last.fm serialises numbers either as JSON numbers or as strings.
fn lenient_number<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    Ok(match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(value) => value,
        NumberOrString::Text(text) => text.trim().parse().unwrap_or(0.0),
    })
}

/// `Ok(true)` when the body is the "unknown artist" error, `Err` for any other API error.
fn check_api_error(json: &str) -> Result<bool> {
    match serde_json::from_str::<ApiError>(json) {
        Ok(error) if error.error == ERROR_INVALID_PARAMETERS => {
            log::debug!("Last.fm has no such artist: {}", error.message);
            Ok(true)
        }
        Ok(error) => Err(AtelierError::Http(format!(
            "Last.fm error {}: {}",
            error.error, error.message
        ))),
        Err(_) => Ok(false),
    }
}

pub fn parse_top_tags(json: &str) -> Result<Vec<WeightedTag>> {
    if check_api_error(json)? {
        return Ok(Vec::new());
    }
    let response: TopTagsResponse = serde_json::from_str(json)
        .map_err(|e| AtelierError::Parse(format!("Invalid Last.fm tags response: {e}")))?;
    Ok(response
        .toptags
        .tag
        .into_iter()
        .map(|tag| WeightedTag {
            name: tag.name,
            weight: tag.count,
        })
        .collect())
}

pub fn parse_similar(json: &str) -> Result<Vec<Neighbor>> {
    if check_api_error(json)? {
        return Ok(Vec::new());
    }
    let response: SimilarResponse = serde_json::from_str(json)
        .map_err(|e| AtelierError::Parse(format!("Invalid Last.fm similar response: {e}")))?;
    Ok(response
        .similarartists
        .artist
        .into_iter()
        .map(|artist| Neighbor {
            name: artist.name,
            similarity: artist.similarity,
        })
        .collect())
}
