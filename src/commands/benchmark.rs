use super::resolve::resolve_or_report;
use super::{pick_track, print_track_list};
use crate::benchmark::{benchmark, RADAR_AXES};
use crate::clients::ClientSet;
use crate::config::Thresholds;

pub async fn handle_benchmark(
    clients: &ClientSet,
    thresholds: &Thresholds,
    query: &str,
    genre: &str,
    track_index: usize,
    cohort_size: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(artist) = resolve_or_report(clients, query).await? else {
        return Ok(());
    };
    let collector = clients.collector();

    let tracks = collector.artist_tracks(&artist).await?;
    if tracks.is_empty() {
        println!("❌ The catalog lists no tracks for {}", artist.name);
        return Ok(());
    }
    print_track_list(&tracks, track_index);
    let track = pick_track(&tracks, track_index)?;

    let Some(target) = collector.cohort_member(track).await? else {
        println!("\n❌ No catalog descriptors for '{}': nothing to compare", track.name);
        return Ok(());
    };

    println!("\n📊 Building a '{genre}' cohort of up to {cohort_size} tracks...");
    let cohort = collector.collect_cohort(genre, cohort_size).await?;

    let report = match benchmark(&target, &cohort, &thresholds.benchmark) {
        Ok(report) => report,
        Err(e) => {
            println!("\n⚠️  {e}");
            return Ok(());
        }
    };

    println!(
        "\n📐 '{}' vs {} '{genre}' tracks",
        track.name, report.cohort.member_count
    );
    println!("  {:<14} {:>8} {:>8}", "axis", "cohort", "track");
    for (i, axis) in RADAR_AXES.iter().enumerate() {
        println!(
            "  {:<14} {:>8.2} {:>8.2}",
            axis, report.radar.cohort[i], report.radar.target[i]
        );
    }
    println!(
        "  {:<14} {:>7.0}s {:>7.0}s",
        "duration",
        report.cohort.duration_secs,
        report.target.duration_ms as f64 / 1000.0
    );

    println!("\n🩺 Diagnostics:");
    for diagnostic in &report.diagnostics {
        println!("  • {diagnostic}");
    }

    Ok(())
}
