use thiserror::Error;

/// Error types for collaborator and pipeline operations.
///
/// Every external call made by a collaborator (catalog, excerpt, lyrics or
/// tag source) reports its failure through this enum. The signal collector
/// never lets one of these abort the whole pipeline: a failing source only
/// turns its own signal into [`Signal::Unavailable`](crate::Signal::Unavailable).
///
/// Terminal outcomes of the core (an unresolvable query, an empty benchmark
/// cohort) are *not* errors of this type; they are modelled as
/// [`Resolution::NotFound`](crate::Resolution::NotFound) and
/// [`EmptyCohort`](crate::benchmark::EmptyCohort) so callers can match on them.
///
/// # Error Handling Examples
///
/// ```rust,no_run
/// use atelier_lucide::{AtelierError, CatalogSource};
///
/// # async fn example(catalog: &dyn CatalogSource) {
/// match catalog.search_artists("Angèle", 10).await {
///     Ok(candidates) => println!("{} candidates", candidates.len()),
///     Err(AtelierError::Auth(msg)) => eprintln!("Credentials rejected: {}", msg),
///     Err(AtelierError::RateLimit { retry_after }) => {
///         eprintln!("Rate limited, retry in {} seconds", retry_after);
///     }
///     Err(AtelierError::Http(msg)) => eprintln!("Network error: {}", msg),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # }
/// ```
#[derive(Error, Debug)]
pub enum AtelierError {
    /// HTTP/network related errors.
    ///
    /// This includes connection failures, timeouts, unexpected status codes
    /// and malformed URLs.
    #[error("HTTP error: {0}")]
    Http(String),

    /// A source rejected our credentials or the token exchange failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// A response could not be parsed into the expected record.
    ///
    /// Responses are validated at the boundary; anything that does not fit
    /// the typed record ends up here.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Rate limiting reported by a source.
    ///
    /// The `retry_after` field indicates how many seconds to wait before
    /// the next request attempt.
    #[error("Rate limited, retry after {retry_after} seconds")]
    RateLimit {
        /// Number of seconds to wait before retrying
        retry_after: u64,
    },

    /// An audio excerpt could not be decoded or analysed.
    #[error("Audio decoding failed: {0}")]
    Decode(String),

    /// Missing or invalid configuration (API keys, config file).
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system I/O errors.
    ///
    /// Mostly raised while writing audio excerpts to their scoped
    /// temporary file or reading manually supplied lyrics.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
