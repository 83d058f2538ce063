use super::lyrics::ManualSource;
use super::resolve::{print_artist_card, resolve_or_report};
use super::{missing_reason, pick_track, print_track_list};
use crate::clients::ClientSet;
use crate::config::Thresholds;
use crate::fusion::{audio_labels, audio_mood, dissonance, text_valence};
use crate::session::Session;
use crate::types::{AudioOrigin, Signal, SignalBundle};

pub async fn handle_analyze(
    clients: &ClientSet,
    thresholds: &Thresholds,
    query: &str,
    track_index: usize,
    manual: Option<&ManualSource>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = Session::new();
    let Some(artist) = resolve_or_report(clients, query).await? else {
        return Ok(());
    };
    print_artist_card(&artist, thresholds);
    session.replace_artist(artist);

    let mut collector = clients.collector();
    if let Some(manual) = manual {
        collector = collector.with_manual_lyrics(manual);
    }

    let Some(artist) = session.artist().cloned() else {
        return Ok(());
    };
    session.set_tracks(collector.artist_tracks(&artist).await?);
    if session.tracks().is_empty() {
        println!("\n❌ The catalog lists no tracks for {}", artist.name);
        return Ok(());
    }
    print_track_list(session.tracks(), track_index);

    let track = pick_track(session.tracks(), track_index)?.clone();
    println!("\n⏳ Collecting signals for '{}'...", track.name);
    let bundle = collector.collect(&artist, Some(&track)).await;
    print_bundle(&bundle, thresholds);
    session.record_signals(&track.id, bundle);

    Ok(())
}

fn print_bundle(bundle: &SignalBundle, thresholds: &Thresholds) {
    println!("\n🔊 Audio");
    match &bundle.audio {
        Signal::Present(audio) => {
            let origin = match audio.origin {
                AudioOrigin::Catalog => "catalog descriptors",
                AudioOrigin::Excerpt => "analysed excerpt",
            };
            println!("  Source: {origin}");
            match audio.tempo {
                Some(bpm) => println!("  Tempo: {bpm:.1} BPM"),
                None => println!("  Tempo: no detectable pulse"),
            }
            for label in audio_labels(audio, &thresholds.labels) {
                println!("  • {label}");
            }
            if let Some(loudness) = audio.loudness_db {
                println!("  Loudness: {loudness:.1} dB");
            }
            match audio_mood(audio) {
                Some(mood) => println!("  Mood: {mood:.2}"),
                None => println!("  Mood: insufficient data"),
            }
        }
        other => println!("  {}", missing_reason(other)),
    }

    println!("\n📝 Lyrics");
    match &bundle.lyrics {
        Signal::Present(lyrics) => {
            println!("  Polarity: {:+.2}", lyrics.polarity);
            println!("  Subjectivity: {:.2}", lyrics.subjectivity);
            println!("  Text valence: {:.2}", text_valence(lyrics));
            println!("  Vocabulary: {} distinct words", lyrics.unique_tokens);
            for line in &lyrics.preview {
                println!("  │ {line}");
            }
        }
        other => println!("  {}", missing_reason(other)),
    }

    println!("\n🏷️  Tags");
    match &bundle.tags {
        Signal::Present(profile) if profile.is_empty() => println!("  No public perception data"),
        Signal::Present(profile) => {
            let names: Vec<&str> = profile.tags.iter().map(|t| t.name.as_str()).collect();
            println!("  {}", names.join(", "));
        }
        other => println!("  {}", missing_reason(other)),
    }

    println!("\n⚖️  Audio/lyrics dissonance");
    match dissonance(
        bundle.audio.present(),
        bundle.lyrics.present(),
        &thresholds.dissonance,
    ) {
        Some(result) => println!("  {:.3}: {}", result.score, result.band),
        None => println!("  insufficient data"),
    }
}
