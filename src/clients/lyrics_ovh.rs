use super::http::HttpTransport;
use crate::sources::LyricsSource;
use crate::{AtelierError, Result};
use async_trait::async_trait;
use serde::Deserialize;

const API_BASE: &str = "https://api.lyrics.ovh/v1";

/// lyrics.ovh, a keyless lyrics API. Answers 404 when it has no lyrics.
pub struct LyricsOvhClient {
    transport: HttpTransport,
}

impl LyricsOvhClient {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait(?Send)]
impl LyricsSource for LyricsOvhClient {
    fn provider(&self) -> String {
        "lyrics.ovh".to_string()
    }

    async fn lyrics(&self, performer: &str, title: &str) -> Result<Option<String>> {
        let url = format!(
            "{API_BASE}/{}/{}",
            urlencoding::encode(performer),
            urlencoding::encode(title)
        );
        let response = self.transport.get(&url, &[]).await?;
        if response.status == 404 {
            return Ok(None);
        }
        let response = response.error_for_status("lyrics.ovh lookup")?;
        parse_lyrics(&response.text()?)
    }
}

#[derive(Deserialize)]
struct LyricsResponse {
    lyrics: Option<String>,
}

/// Blank lyrics count as none.
pub fn parse_lyrics(json: &str) -> Result<Option<String>> {
    let response: LyricsResponse = serde_json::from_str(json)
        .map_err(|e| AtelierError::Parse(format!("Invalid lyrics.ovh response: {e}")))?;
    Ok(response.lyrics.filter(|text| !text.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lyrics() {
        let json = r#"{"lyrics": "Paroles, paroles\r\nEncore des paroles"}"#;
        assert_eq!(
            parse_lyrics(json).unwrap().as_deref(),
            Some("Paroles, paroles\r\nEncore des paroles")
        );
        assert_eq!(parse_lyrics(r#"{"lyrics": "  \n"}"#).unwrap(), None);
        assert_eq!(parse_lyrics(r#"{"error": "No lyrics found"}"#).unwrap(), None);
        assert!(parse_lyrics("<html>").is_err());
    }
}
