//! ph-scraper command line interface
//!
//! Collects a profile's videos into an optional cache file and prints them
//! as URLs or JSON. Logs go to stderr, results to stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgGroup, Args, Parser, Subcommand};
use ph_scraper_core::{
    Operation, OperationOutput, ProfileScraper, ScraperConfig, render_json, render_urls,
    to_json_pretty,
};
use tracing_subscriber::EnvFilter;

/// ph-scraper: incremental profile video collector
///
/// Walks a profile's video listing page by page and stops as soon as a page
/// holds nothing new, merging results into a JSON cache file.
#[derive(Parser, Debug)]
#[command(name = "ph-scraper")]
#[command(version)]
#[command(about = "Incremental profile video collector", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape a profile page
    Profile(ProfileArgs),
}

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("operation")
        .required(true)
        .args(["get_pub_videos", "get_url_info"]),
))]
struct ProfileArgs {
    /// Profile URL, e.g. https://www.pornhub.com/model/<name>
    url: String,

    /// JSON cache file; new videos are merged into it
    #[arg(short, long, value_name = "PATH")]
    cache: Option<PathBuf>,

    /// Ignore the existing cache content (results are still written)
    #[arg(long)]
    new_cache: bool,

    /// Maximum attempts per request
    #[arg(long, default_value_t = 10)]
    retries: u32,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    timeout: u64,

    /// Collect the profile's public videos
    #[arg(long)]
    get_pub_videos: bool,

    /// Print the resolved profile URL information
    #[arg(long)]
    get_url_info: bool,

    /// Print results as JSON
    #[arg(short = 'j', long, conflicts_with = "print_url")]
    print_json: bool,

    /// Print one URL per line (default)
    #[arg(short = 'u', long)]
    print_url: bool,
}

impl ProfileArgs {
    fn operation(&self) -> Operation {
        if self.get_url_info {
            Operation::UrlInfo
        } else {
            Operation::PublicVideos
        }
    }

    fn scraper_config(&self) -> ScraperConfig {
        let config = ScraperConfig::new(&self.url)
            .retries(self.retries)
            .timeout_secs(self.timeout)
            .discard_cache(self.new_cache);

        match &self.cache {
            Some(path) => config.cache_path(path),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    // Dropping the run on Ctrl-C abandons it before any cache write
    tokio::select! {
        result = run(cli.command) => match result {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::debug!("{:?}", e);
                eprintln!("error: {:#}", e);
                ExitCode::FAILURE
            }
        },
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("Interrupted, nothing was saved");
            ExitCode::from(130)
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` takes precedence over the flags.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if quiet {
            EnvFilter::new("error")
        } else {
            match verbose {
                0 => EnvFilter::new("warn"),
                1 => EnvFilter::new("ph_scraper_core=info,warn"),
                2 => EnvFilter::new("ph_scraper_core=debug,info"),
                _ => EnvFilter::new("trace"),
            }
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Profile(args) => handle_profile(args).await,
    }
}

/// Handles the `profile` subcommand
async fn handle_profile(args: ProfileArgs) -> anyhow::Result<()> {
    let config = args.scraper_config();
    let site = config.site.clone();
    tracing::debug!(json = args.print_json, urls = args.print_url, "output mode");

    let output = ProfileScraper::run(config, args.operation())
        .await
        .with_context(|| format!("Failed to scrape {}", args.url))?;

    match output {
        OperationOutput::UrlInfo(info) => {
            if args.print_json {
                println!("{}", to_json_pretty(&info)?);
            } else {
                println!("{}", info.profile_url);
            }
        }
        OperationOutput::Videos(videos) => {
            tracing::info!("{} videos", videos.len());
            if args.print_json {
                println!("{}", render_json(&site, &videos)?);
            } else if !videos.is_empty() {
                println!("{}", render_urls(&site, &videos));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<ProfileArgs, clap::Error> {
        let cli = Cli::try_parse_from(args)?;
        match cli.command {
            Command::Profile(args) => Ok(args),
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_profile_defaults() {
        let args = parse(&["ph-scraper", "profile", "https://www.pornhub.com/model/jane", "--get-pub-videos"]).unwrap();
        assert_eq!(args.operation(), Operation::PublicVideos);
        assert!(!args.print_json);

        let config = args.scraper_config();
        assert_eq!(config.client.max_attempts, 10);
        assert_eq!(config.client.timeout_secs, 5);
        assert_eq!(config.cache_path, None);
        assert!(!config.discard_cache);
    }

    #[test]
    fn test_profile_options_map_to_config() {
        let args = parse(&[
            "ph-scraper", "profile", "https://www.pornhub.com/model/jane",
            "--get-pub-videos", "-c", "jane.json", "--new-cache",
            "--retries", "3", "--timeout", "9", "-j",
        ])
        .unwrap();
        assert!(args.print_json);

        let config = args.scraper_config();
        assert_eq!(config.cache_path, Some(PathBuf::from("jane.json")));
        assert!(config.discard_cache);
        assert_eq!(config.client.max_attempts, 3);
        assert_eq!(config.client.timeout_secs, 9);
    }

    #[test]
    fn test_operation_is_required() {
        let result = parse(&["ph-scraper", "profile", "https://www.pornhub.com/model/jane"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_operations_are_exclusive() {
        let result = parse(&[
            "ph-scraper", "profile", "https://www.pornhub.com/model/jane",
            "--get-pub-videos", "--get-url-info",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_print_modes_are_exclusive() {
        let result = parse(&[
            "ph-scraper", "profile", "https://www.pornhub.com/model/jane",
            "--get-url-info", "-j", "-u",
        ]);
        assert!(result.is_err());
    }
}
