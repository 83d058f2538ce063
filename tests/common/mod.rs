#![allow(dead_code)]
use async_trait::async_trait;
use atelier_lucide::{
    AtelierError, CandidateEntity, CatalogDescriptors, CatalogSource, ExcerptCandidate,
    ExcerptSource, LyricsSource, ManualLyrics, Neighbor, Release, Result, TagSource, Track,
    WeightedTag,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::f32::consts::PI;
use std::io::Cursor;

pub const SAMPLE_RATE: u32 = 22_050;

pub fn track(id: &str, name: &str, performers: &[(&str, &str)]) -> Track {
    Track {
        id: id.to_string(),
        name: name.to_string(),
        album_name: "Brol".to_string(),
        album_art_url: None,
        duration_ms: 190_000,
        popularity: 60,
        performer_ids: performers.iter().map(|(id, _)| id.to_string()).collect(),
        performer_names: performers.iter().map(|(_, name)| name.to_string()).collect(),
        preview_url: None,
    }
}

pub fn descriptors(energy: f64, valence: f64) -> CatalogDescriptors {
    CatalogDescriptors {
        tempo: 118.0,
        energy,
        danceability: 0.7,
        valence,
        acousticness: 0.2,
        loudness: -6.5,
        duration_ms: 190_000,
    }
}

// ================================================================================================
// FAKE SOURCES
// ================================================================================================

#[derive(Default)]
pub struct FakeCatalog {
    pub candidates: Vec<CandidateEntity>,
    pub tracks: Vec<Track>,
    pub descriptors: HashMap<String, CatalogDescriptors>,
    pub genre_tracks: Vec<Track>,
    pub fail_features: bool,
}

#[async_trait(?Send)]
impl CatalogSource for FakeCatalog {
    async fn search_artists(&self, _query: &str, limit: u32) -> Result<Vec<CandidateEntity>> {
        Ok(self.candidates.iter().take(limit as usize).cloned().collect())
    }

    async fn artist(&self, artist_id: &str) -> Result<Option<CandidateEntity>> {
        Ok(self.candidates.iter().find(|c| c.id == artist_id).cloned())
    }

    async fn top_tracks(&self, _artist_id: &str) -> Result<Vec<Track>> {
        Ok(self.tracks.clone())
    }

    async fn audio_features(&self, track_id: &str) -> Result<Option<CatalogDescriptors>> {
        if self.fail_features {
            return Err(AtelierError::Http("catalog is down".to_string()));
        }
        Ok(self.descriptors.get(track_id).copied())
    }

    async fn artist_releases(&self, _artist_id: &str) -> Result<Vec<Release>> {
        Ok(Vec::new())
    }

    async fn genre_tracks(&self, _genre: &str, limit: u32) -> Result<Vec<Track>> {
        Ok(self.genre_tracks.iter().take(limit as usize).cloned().collect())
    }
}

#[derive(Default)]
pub struct FakeExcerpts {
    pub candidates: Vec<ExcerptCandidate>,
    pub audio: HashMap<String, Vec<u8>>,
    pub fail_download: bool,
    pub searches: RefCell<Vec<(String, String)>>,
    pub downloads: RefCell<Vec<String>>,
}

#[async_trait(?Send)]
impl ExcerptSource for FakeExcerpts {
    async fn search_excerpts(
        &self,
        performer: &str,
        title: &str,
    ) -> Result<Vec<ExcerptCandidate>> {
        self.searches
            .borrow_mut()
            .push((performer.to_string(), title.to_string()));
        Ok(self.candidates.clone())
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        self.downloads.borrow_mut().push(url.to_string());
        if self.fail_download {
            return Err(AtelierError::Http("connection reset".to_string()));
        }
        self.audio
            .get(url)
            .cloned()
            .ok_or_else(|| AtelierError::Http(format!("404 for {url}")))
    }
}

/// Lyrics keyed by performer name; unknown performers get `Ok(None)`.
pub struct FakeLyrics {
    pub name: &'static str,
    pub by_performer: HashMap<String, String>,
    pub fail: bool,
    pub calls: RefCell<Vec<String>>,
}

impl FakeLyrics {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            by_performer: HashMap::new(),
            fail: false,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with(mut self, performer: &str, text: &str) -> Self {
        self.by_performer
            .insert(performer.to_string(), text.to_string());
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait(?Send)]
impl LyricsSource for FakeLyrics {
    fn provider(&self) -> String {
        self.name.to_string()
    }

    async fn lyrics(&self, performer: &str, _title: &str) -> Result<Option<String>> {
        self.calls.borrow_mut().push(performer.to_string());
        if self.fail {
            return Err(AtelierError::Http("503 Service Unavailable".to_string()));
        }
        Ok(self.by_performer.get(performer).cloned())
    }
}

#[derive(Default)]
pub struct FakeTags {
    pub tags: Vec<WeightedTag>,
    pub neighbors: Vec<Neighbor>,
    pub fail: bool,
}

#[async_trait(?Send)]
impl TagSource for FakeTags {
    async fn top_tags(&self, _artist_name: &str) -> Result<Vec<WeightedTag>> {
        if self.fail {
            return Err(AtelierError::RateLimit { retry_after: 5 });
        }
        Ok(self.tags.clone())
    }

    async fn neighbors(&self, _artist_name: &str) -> Result<Vec<Neighbor>> {
        Ok(self.neighbors.clone())
    }
}

#[derive(Default)]
pub struct FakeManual {
    pub text: Option<String>,
    pub prompts: Cell<usize>,
}

impl ManualLyrics for FakeManual {
    fn prompt(&self, _performer: &str, _title: &str) -> Option<String> {
        self.prompts.set(self.prompts.get() + 1);
        self.text.clone()
    }
}

// ================================================================================================
// SYNTHETIC AUDIO
// ================================================================================================

fn wav_bytes(samples: &[f32]) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for sample in samples {
            writer
                .write_sample((sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                .unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Mono 16-bit WAV of a pure tone.
pub fn sine_wav(frequency: f32, seconds: f32) -> Vec<u8> {
    let count = (seconds * SAMPLE_RATE as f32) as usize;
    let samples: Vec<f32> = (0..count)
        .map(|i| 0.5 * (2.0 * PI * frequency * i as f32 / SAMPLE_RATE as f32).sin())
        .collect();
    wav_bytes(&samples)
}

/// Mono 16-bit WAV of short decaying clicks at a steady tempo.
pub fn click_wav(bpm: f32, seconds: f32) -> Vec<u8> {
    let count = (seconds * SAMPLE_RATE as f32) as usize;
    let period = (60.0 / bpm * SAMPLE_RATE as f32) as usize;
    let click_len = (0.01 * SAMPLE_RATE as f32) as usize;

    let samples: Vec<f32> = (0..count)
        .map(|i| {
            let offset = i % period;
            if offset < click_len {
                let t = offset as f32 / SAMPLE_RATE as f32;
                let decay = 1.0 - offset as f32 / click_len as f32;
                0.9 * decay * (2.0 * PI * 2000.0 * t).sin()
            } else {
                0.0
            }
        })
        .collect();
    wav_bytes(&samples)
}

/// Mono 16-bit WAV of digital silence.
pub fn silence_wav(seconds: f32) -> Vec<u8> {
    let count = (seconds * SAMPLE_RATE as f32) as usize;
    wav_bytes(&vec![0.0; count])
}
