pub mod analyze;
pub mod benchmark;
pub mod lyrics;
pub mod resolve;
pub mod tags;

use crate::clients::ClientSet;
use crate::config::Thresholds;
use crate::types::{Signal, Track};
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve an artist and show its overview
    ///
    /// Searches the catalog, picks the best matching artist and prints its
    /// card, popularity, genres and release timeline.
    ///
    /// Usage examples:
    /// # Resolve by name
    /// atelier resolve "Angèle"
    ///
    /// # Resolve by catalog URL
    /// atelier resolve "https://open.spotify.com/artist/3QVolfxko2UyCOtexhVTli"
    Resolve {
        /// Artist name or catalog URL
        query: String,
    },

    /// Collect and score the signals of one track
    ///
    /// Lists the artist's top tracks, then collects audio descriptors,
    /// lyrics sentiment and tags for the chosen track and reports the
    /// audio/lyrics dissonance.
    ///
    /// Usage examples:
    /// # Analyse the most popular track
    /// atelier analyze "Angèle"
    ///
    /// # Analyse the third track, with lyrics from a file if no provider has them
    /// atelier analyze "Angèle" --track 2 --lyrics-file paroles.txt
    Analyze {
        /// Artist name or catalog URL
        query: String,

        /// Index in the top-track list (0 = most popular)
        #[arg(long, default_value = "0")]
        track: usize,

        /// Lyrics to use when no provider has them
        #[arg(long)]
        lyrics_file: Option<PathBuf>,

        /// Paste lyrics on stdin when no provider has them
        #[arg(long, conflicts_with = "lyrics_file")]
        paste_lyrics: bool,
    },

    /// Show the public-perception tag cloud and similar artists
    ///
    /// Usage examples:
    /// atelier tags "Angèle" --limit 5
    Tags {
        /// Artist name or catalog URL
        query: String,

        /// Maximum number of tags and neighbours to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Compare a track to the average of a genre
    ///
    /// Usage examples:
    /// # Compare the most popular track to 30 "french pop" tracks
    /// atelier benchmark "Angèle" --genre "french pop"
    ///
    /// # Smaller cohort, second track
    /// atelier benchmark "Angèle" --genre "pop" --track 1 --cohort-size 10
    Benchmark {
        /// Artist name or catalog URL
        query: String,

        /// Genre whose tracks form the reference cohort
        #[arg(long)]
        genre: String,

        /// Index in the top-track list (0 = most popular)
        #[arg(long, default_value = "0")]
        track: usize,

        /// Number of reference tracks to request
        #[arg(long, default_value = "30")]
        cohort_size: u32,
    },
}

/// Execute the appropriate command handler based on the parsed command
pub async fn execute_command(
    command: Commands,
    clients: &ClientSet,
    thresholds: &Thresholds,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Resolve { query } => resolve::handle_resolve(clients, thresholds, &query).await,

        Commands::Analyze {
            query,
            track,
            lyrics_file,
            paste_lyrics,
        } => {
            let manual = match (lyrics_file, paste_lyrics) {
                (Some(path), _) => Some(lyrics::ManualSource::File(lyrics::FileLyrics::new(path))),
                (None, true) => Some(lyrics::ManualSource::Stdin(lyrics::StdinLyrics)),
                (None, false) => None,
            };
            analyze::handle_analyze(clients, thresholds, &query, track, manual.as_ref()).await
        }

        Commands::Tags { query, limit } => tags::handle_tags(clients, &query, limit).await,

        Commands::Benchmark {
            query,
            genre,
            track,
            cohort_size,
        } => {
            if cohort_size == 0 {
                return Err("--cohort-size must be at least 1".into());
            }
            benchmark::handle_benchmark(clients, thresholds, &query, &genre, track, cohort_size)
                .await
        }
    }
}

/// Pick the track at `index`, listing what is available when it is out of range.
fn pick_track(tracks: &[Track], index: usize) -> Result<&Track, Box<dyn std::error::Error>> {
    tracks.get(index).ok_or_else(|| {
        format!(
            "No track at index {index}: the artist has {} top tracks",
            tracks.len()
        )
        .into()
    })
}

fn print_track_list(tracks: &[Track], selected: usize) {
    println!("\n🎵 Top tracks:");
    for (i, track) in tracks.iter().enumerate() {
        let marker = if i == selected { "▶" } else { " " };
        println!("  {marker} [{i}] {track} ({:.0}s)", track.duration_secs());
    }
}

/// One-line rendering of a signal that is not present.
fn missing_reason<T>(signal: &Signal<T>) -> String {
    match signal {
        Signal::NotAttempted => "not collected".to_string(),
        Signal::Present(_) => "present".to_string(),
        Signal::Absent => "insufficient data".to_string(),
        Signal::Unavailable(reason) => format!("source unavailable ({reason})"),
    }
}
