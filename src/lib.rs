pub mod analysis;
pub mod benchmark;
pub mod clients;
pub mod collector;
pub mod commands;
pub mod config;
pub mod error;
pub mod fusion;
pub mod resolver;
pub mod retry;
pub mod sentiment;
pub mod session;
pub mod sources;
pub mod timeline;
pub mod types;

pub use benchmark::{benchmark, BenchmarkReport, CohortMember, Diagnostic, EmptyCohort};
pub use collector::SignalCollector;
pub use config::{AppConfig, CollectorOptions, RetryConfig, Thresholds};
pub use error::AtelierError;
pub use fusion::{dissonance, Dissonance, DissonanceBand, QualitativeLabel};
pub use resolver::{EntityResolver, MatchTier, Resolution};
pub use sentiment::{LexiconAnalyzer, SentimentAnalyzer};
pub use session::Session;
pub use sources::{CatalogSource, ExcerptSource, LyricsSource, ManualLyrics, TagSource};
pub use timeline::{build_timeline, Timeline};
pub use types::{
    AudioOrigin, AudioSignal, CandidateEntity, CatalogDescriptors, ExcerptCandidate, LyricOrigin,
    LyricSignal, Neighbor, Release, ResolvedArtist, Signal, SignalBundle, TagProfile, Track,
    WeightedTag,
};

#[cfg(feature = "mock")]
pub use sources::{
    MockCatalogSource, MockExcerptSource, MockLyricsSource, MockManualLyrics, MockTagSource,
};

pub type Result<T> = std::result::Result<T, AtelierError>;
