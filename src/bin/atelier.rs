use atelier_lucide::clients::ClientSet;
use atelier_lucide::commands::{execute_command, Commands};
use atelier_lucide::{AppConfig, RetryConfig, Thresholds};
use clap::Parser;
use std::sync::Arc;

/// Artist resolution and audio/lyrics scoring over public music APIs
#[derive(Parser)]
#[command(
    name = "atelier",
    about = "Artist resolution and audio/lyrics scoring over public music APIs",
    long_about = None
)]
struct Cli {
    /// Show detailed debug information
    #[arg(long, global = true)]
    verbose: bool,

    /// Fail immediately on rate-limit responses instead of waiting
    #[arg(long, global = true, conflicts_with = "max_retries")]
    no_retry: bool,

    /// Retries after a rate-limit response
    #[arg(long, global = true)]
    max_retries: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();

    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Error: {e}");
            eprintln!();
            eprintln!("Please set the following environment variables:");
            eprintln!("  SPOTIFY_CLIENT_ID=your_spotify_client_id");
            eprintln!("  SPOTIFY_CLIENT_SECRET=your_spotify_client_secret");
            eprintln!("  LASTFM_API_KEY=your_lastfm_api_key   (optional, enables tags)");
            if let Ok(path) = AppConfig::config_path() {
                eprintln!();
                eprintln!("or store them in {}", path.display());
            }
            std::process::exit(1);
        }
    };

    let http_client = http_client::native::NativeClient::new();
    let retry = if args.no_retry {
        RetryConfig::disabled()
    } else {
        match args.max_retries {
            Some(max_retries) => RetryConfig::default().with_max_retries(max_retries),
            None => RetryConfig::default(),
        }
    };
    let clients = ClientSet::new(&config, Arc::new(http_client), retry);

    if let Err(e) = execute_command(args.command, &clients, &Thresholds::default()).await {
        eprintln!("❌ Command failed: {e}");
        std::process::exit(1);
    }

    Ok(())
}
