use super::missing_reason;
use super::resolve::resolve_or_report;
use crate::clients::ClientSet;
use crate::config::CollectorOptions;
use crate::types::Signal;

pub async fn handle_tags(
    clients: &ClientSet,
    query: &str,
    limit: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    if clients.tags.is_none() {
        return Err("Tags need a Last.fm API key (set LASTFM_API_KEY)".into());
    }

    let Some(artist) = resolve_or_report(clients, query).await? else {
        return Ok(());
    };

    let collector = clients.collector().with_options(
        CollectorOptions::default()
            .with_tag_limit(limit)
            .with_neighbor_limit(limit),
    );

    println!("\n🏷️  Public perception of {}", artist.name);
    match collector.collect_tags(&artist.name).await {
        Signal::Present(profile) if profile.is_empty() => {
            println!("  No public perception data");
        }
        Signal::Present(profile) => {
            let max_weight = profile
                .tags
                .iter()
                .map(|t| t.weight)
                .fold(0.0_f64, f64::max);
            for tag in &profile.tags {
                let bar_len = if max_weight > 0.0 {
                    ((tag.weight / max_weight) * 20.0).round() as usize
                } else {
                    0
                };
                println!("  {:<20} {} {:.0}", tag.name, "█".repeat(bar_len), tag.weight);
            }

            if !profile.neighbors.is_empty() {
                println!("\n👥 Similar artists:");
                for neighbor in &profile.neighbors {
                    println!("  {:<30} {:.2}", neighbor.name, neighbor.similarity);
                }
            }
        }
        other => println!("  {}", missing_reason(&other)),
    }

    Ok(())
}
