use super::http::HttpTransport;
use crate::sources::LyricsSource;
use crate::{AtelierError, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;

const SEARCH_URL: &str = "https://genius.com/api/search/multi";

static LYRICS_CONTAINER: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"div[data-lyrics-container="true"]"#).expect("valid lyrics selector")
});

/// Genius lyrics, found through the public search endpoint and scraped from
/// the song page.
pub struct GeniusClient {
    transport: HttpTransport,
}

impl GeniusClient {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }
}

#[async_trait(?Send)]
impl LyricsSource for GeniusClient {
    fn provider(&self) -> String {
        "genius".to_string()
    }

    async fn lyrics(&self, performer: &str, title: &str) -> Result<Option<String>> {
        let query = format!("{performer} {title}");
        let url = format!("{SEARCH_URL}?q={}", urlencoding::encode(&query));
        let response = self
            .transport
            .get(&url, &[("Accept", "application/json")])
            .await?
            .error_for_status("Genius search")?;

        let Some(song_url) = parse_song_url(&response.text()?)? else {
            log::debug!("No Genius song for '{performer} - {title}'");
            return Ok(None);
        };

        let page = self
            .transport
            .get(&song_url, &[("Accept", "text/html")])
            .await?;
        if page.status == 404 {
            return Ok(None);
        }
        let page = page.error_for_status("Genius song page")?;
        Ok(extract_lyrics(&page.text()?))
    }
}

#[derive(Deserialize)]
struct SearchResponse {
    response: SearchSections,
}

#[derive(Deserialize)]
struct SearchSections {
    #[serde(default)]
    sections: Vec<SearchSection>,
}

#[derive(Deserialize)]
struct SearchSection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Deserialize)]
struct SearchHit {
    #[serde(rename = "type")]
    kind: String,
    result: HitResult,
}

#[derive(Deserialize)]
struct HitResult {
    url: Option<String>,
}

/// URL of the first song hit of a multi-search.
pub fn parse_song_url(json: &str) -> Result<Option<String>> {
    let response: SearchResponse = serde_json::from_str(json)
        .map_err(|e| AtelierError::Parse(format!("Invalid Genius search response: {e}")))?;

    Ok(response
        .response
        .sections
        .into_iter()
        .filter(|section| section.kind == "song" || section.kind == "top_hit")
        .flat_map(|section| section.hits)
        .filter(|hit| hit.kind == "song")
        .find_map(|hit| hit.result.url))
}

/// Lyrics text of a song page, `None` when the page has no lyrics block.
///
/// `<br>` becomes a line break; page furniture marked
/// `data-exclude-from-selection` is skipped.
pub fn extract_lyrics(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let mut text = String::new();
    for container in document.select(&LYRICS_CONTAINER) {
        if !text.is_empty() {
            text.push('\n');
        }
        collect_text(container, &mut text);
    }

    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            let value = child_element.value();
            if value.name() == "br" {
                out.push('\n');
            } else if value.attr("data-exclude-from-selection").is_none() {
                collect_text(child_element, out);
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_song_url() {
        let json = r#"{
            "meta": {"status": 200},
            "response": {
                "sections": [
                    {"type": "top_hit", "hits": [
                        {"type": "artist", "result": {"url": "https://genius.com/artists/Angele"}}
                    ]},
                    {"type": "song", "hits": [
                        {"type": "song", "result": {"url": "https://genius.com/Angele-balance-ton-quoi-lyrics", "title": "Balance ton quoi"}},
                        {"type": "song", "result": {"url": "https://genius.com/Angele-tout-oublier-lyrics"}}
                    ]},
                    {"type": "artist", "hits": []}
                ]
            }
        }"#;
        assert_eq!(
            parse_song_url(json).unwrap().as_deref(),
            Some("https://genius.com/Angele-balance-ton-quoi-lyrics")
        );

        let empty = r#"{"response": {"sections": [{"type": "song", "hits": []}]}}"#;
        assert_eq!(parse_song_url(empty).unwrap(), None);
    }

    #[test]
    fn test_extract_lyrics() {
        let html = r#"<html><body>
            <div data-lyrics-container="true"><div data-exclude-from-selection="true">12 Contributors</div>[Couplet 1]<br>Ils parlent tous comme des animaux<br><i>De toutes les chattes</i> ils parlent</div>
            <div data-lyrics-container="true">[Refrain]<br>Balance ton quoi</div>
        </body></html>"#;

        let lyrics = extract_lyrics(html).unwrap();
        assert_eq!(
            lyrics,
            "[Couplet 1]\nIls parlent tous comme des animaux\nDe toutes les chattes ils parlent\n[Refrain]\nBalance ton quoi"
        );
        assert!(!lyrics.contains("Contributors"));
    }

    #[test]
    fn test_extract_lyrics_missing_block() {
        assert_eq!(extract_lyrics("<html><body><p>Not found</p></body></html>"), None);
    }
}
