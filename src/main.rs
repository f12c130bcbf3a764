//! gh-crawler main entry point
//!
//! This is the command-line interface for the GitHub search crawler.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use gh_crawler::config::{CrawlerSettings, DetailFailurePolicy, DEFAULT_TIMEOUT_MS};
use gh_crawler::crawler::crawl;
use gh_crawler::output::{render_results, write_results};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// gh-crawler: crawl GitHub search results through random proxies
///
/// Reads a JSON (or TOML) file with `keywords`, `proxies` and `type`, queries
/// GitHub's search for that category and prints the results as JSON.
#[derive(Parser, Debug)]
#[command(name = "gh-crawler")]
#[command(version)]
#[command(about = "GitHub search crawler", long_about = None)]
struct Cli {
    /// Input file with search options
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// File to store the results in
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Timeout for each request, in milliseconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    timeout_ms: u64,

    /// What to do when a repository page returns an HTTP error
    #[arg(long, value_enum, default_value_t = DetailFailures::Abort)]
    detail_failures: DetailFailures,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DetailFailures {
    /// Abort the whole crawl
    Abort,
    /// Keep the result without extra data
    Skip,
}

impl From<DetailFailures> for DetailFailurePolicy {
    fn from(value: DetailFailures) -> Self {
        match value {
            DetailFailures::Abort => DetailFailurePolicy::Abort,
            DetailFailures::Skip => DetailFailurePolicy::Skip,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref()) {
        eprintln!("Failed to set up logging: {:#}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(cli).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr so stdout only carries the results.
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("gh_crawler=info,warn"),
            1 => EnvFilter::new("gh_crawler=debug,info"),
            2 => EnvFilter::new("gh_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false);

    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.with_writer(std::io::stderr).init(),
    }

    Ok(())
}

/// Runs the crawl and emits the results
async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = CrawlerSettings {
        timeout: Duration::from_millis(cli.timeout_ms),
        detail_failures: cli.detail_failures.into(),
        ..CrawlerSettings::default()
    };

    tracing::info!("Loading search options from: {}", cli.input.display());
    let results = crawl(&cli.input, settings)
        .await
        .context("crawl failed")?;

    let rendered = render_results(&results).context("cannot render results")?;
    println!("{}", rendered);

    if let Some(path) = &cli.output {
        write_results(&results, path)
            .with_context(|| format!("cannot write results to {}", path.display()))?;
    }

    Ok(())
}
