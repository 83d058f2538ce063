use crate::clients::ClientSet;
use crate::config::Thresholds;
use crate::fusion::popularity_label;
use crate::resolver::{EntityResolver, Resolution};
use crate::sources::CatalogSource;
use crate::timeline::build_timeline;
use crate::types::ResolvedArtist;

/// Number of catalog candidates handed to the resolver.
const SEARCH_LIMIT: u32 = 10;

/// Search the catalog and resolve `query` to one artist.
///
/// `Ok(None)` when nothing matched.
pub async fn resolve_artist(
    catalog: &dyn CatalogSource,
    query: &str,
) -> Result<Option<ResolvedArtist>, Box<dyn std::error::Error>> {
    let resolver = EntityResolver::new();

    // URLs never go through the text search
    if let Resolution::ById(id) = resolver.resolve(query, &[]) {
        return Ok(catalog.artist(&id).await?.map(ResolvedArtist::from));
    }

    let candidates = catalog.search_artists(query, SEARCH_LIMIT).await?;
    log::debug!("{} candidates for '{query}'", candidates.len());
    Ok(resolver.resolve(query, &candidates).artist().cloned())
}

/// Resolve or print the "not found" message.
pub(crate) async fn resolve_or_report(
    clients: &ClientSet,
    query: &str,
) -> Result<Option<ResolvedArtist>, Box<dyn std::error::Error>> {
    println!("🔍 Resolving '{query}'...");
    let artist = resolve_artist(&clients.catalog, query).await?;
    if artist.is_none() {
        println!("❌ No artist found for '{query}'");
    }
    Ok(artist)
}

pub async fn handle_resolve(
    clients: &ClientSet,
    thresholds: &Thresholds,
    query: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let Some(artist) = resolve_or_report(clients, query).await? else {
        return Ok(());
    };

    print_artist_card(&artist, thresholds);

    match clients.catalog.artist_releases(&artist.id).await {
        Ok(releases) => {
            let timeline = build_timeline(releases);
            if timeline.is_empty() {
                println!("\n📅 No dated releases");
            } else {
                println!(
                    "\n📅 Releases ({} over {} years):",
                    timeline.entries.len(),
                    timeline.span_years()
                );
                for entry in &timeline.entries {
                    println!(
                        "  {}  {} ({})",
                        entry.date.format("%Y-%m-%d"),
                        entry.release.name,
                        entry.release.kind
                    );
                }
                let per_year = timeline
                    .releases_per_year()
                    .iter()
                    .map(|(year, count)| format!("{year}: {count}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                println!("  Per year: {per_year}");
            }
        }
        Err(e) => println!("\n⚠️  Release timeline unavailable: {e}"),
    }

    Ok(())
}

pub(crate) fn print_artist_card(artist: &ResolvedArtist, thresholds: &Thresholds) {
    let popularity = popularity_label(artist.popularity, &thresholds.labels);
    println!("\n🎤 {}", artist.name);
    println!("  Popularity: {}/100 ({})", artist.popularity, popularity);
    println!("  Followers: {}", artist.followers);
    if artist.genres.is_empty() {
        println!("  Genres: none listed");
    } else {
        println!(
            "  Genres: {} ({} in total)",
            artist.headline_genres(3).join(", "),
            artist.genre_count()
        );
    }
    if let Some(url) = &artist.external_url {
        println!("  Link: {url}");
    }
}
