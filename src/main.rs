//! Sitegraph main entry point
//!
//! This is the command-line interface for the Sitegraph site mirror.

use anyhow::{bail, Context};
use clap::Parser;
use sitegraph::config::{
    clean_seed_values, load_config_with_hash, load_seeds_file, validate, Config,
};
use sitegraph::crawler::crawl;
use sitegraph::output::{
    print_statistics, print_summary, read_index, summarize_index, verify_index,
    write_missing_seeds,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Sitegraph: a bounded, single-origin site mirror
///
/// Sitegraph crawls a locally hosted HTML tree, stores every reachable page
/// exactly once under a deterministic path, and writes the discovered link
/// graph to an index file.
#[derive(Parser, Debug)]
#[command(name = "sitegraph")]
#[command(version)]
#[command(about = "A bounded, single-origin site mirror", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE", env = "SITEGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Start URL (repeatable); added to seeds from the config file
    #[arg(
        long = "start-url",
        value_name = "URL",
        env = "SITEGRAPH_START_URL",
        value_delimiter = ','
    )]
    start_urls: Vec<String>,

    /// File with one start URL per line ('#' starts a comment)
    #[arg(long, value_name = "FILE")]
    seeds_file: Option<PathBuf>,

    /// Host the crawl is confined to
    #[arg(long, env = "SITEGRAPH_HOST")]
    host: Option<String>,

    /// Port the crawl is confined to
    #[arg(long, env = "SITEGRAPH_PORT")]
    port: Option<u16>,

    /// Number of worker tasks
    #[arg(long, env = "SITEGRAPH_WORKERS")]
    workers: Option<u32>,

    /// Maximum concurrent HTTP requests
    #[arg(long, env = "SITEGRAPH_MAX_CONCURRENCY")]
    max_concurrency: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", env = "SITEGRAPH_TIMEOUT_SECS")]
    timeout: Option<u64>,

    /// Total attempts per URL on transient failures
    #[arg(long, env = "SITEGRAPH_RETRY_LIMIT")]
    retry: Option<u32>,

    /// Output root directory
    #[arg(short, long, value_name = "DIR", env = "SITEGRAPH_OUTPUT")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate configuration and show what would be crawled
    #[arg(long, conflicts_with_all = ["verify", "stats"])]
    dry_run: bool,

    /// Check stored pages against the index and write missing_seeds.txt
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    verify: bool,

    /// Summarize an existing index and exit
    #[arg(long, conflicts_with_all = ["dry_run", "verify"])]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.verify {
        handle_verify(&config)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else {
        handle_crawl(config).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbose: u8, quiet: bool) {
    let default_filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "sitegraph=info,warn",
            1 => "sitegraph=debug,info",
            2 => "sitegraph=trace,debug",
            _ => "trace",
        }
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Builds the effective configuration: file, then seeds, then flags
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    config.seeds.extend(clean_seed_values(&cli.start_urls));
    if let Some(path) = &cli.seeds_file {
        let seeds = load_seeds_file(path)
            .with_context(|| format!("Failed to read seeds file {}", path.display()))?;
        tracing::info!("Loaded {} seed(s) from {}", seeds.len(), path.display());
        config.seeds.extend(seeds);
    }

    if let Some(host) = &cli.host {
        config.origin.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.origin.port = port;
    }
    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(max_concurrency) = cli.max_concurrency {
        config.crawler.max_concurrency = max_concurrency;
    }
    if let Some(timeout) = cli.timeout {
        config.crawler.request_timeout_secs = timeout;
    }
    if let Some(retry) = cli.retry {
        config.crawler.retry_limit = retry;
    }
    if let Some(output) = &cli.output {
        config.output.root = output.display().to_string();
    }

    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the resolved configuration
fn handle_dry_run(config: &Config) {
    println!("=== Sitegraph Dry Run ===\n");

    println!("Origin: {}:{}", config.origin.host, config.origin.port);

    println!("\nCrawler Configuration:");
    println!("  Workers: {}", config.crawler.workers);
    println!("  Max concurrent requests: {}", config.crawler.max_concurrency);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Attempts per URL: {}", config.crawler.retry_limit);
    println!("  Retry base delay: {}ms", config.crawler.retry_base_delay_ms);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Root: {}", config.output.root);
    println!("  Index: {}", config.output.index_file);

    println!("\nSeeds ({}):", config.seeds.len());
    for seed in &config.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    if config.seeds.is_empty() {
        println!("✗ No seeds configured; a crawl would not start");
    } else {
        println!("✓ Would start crawling with {} seed URLs", config.seeds.len());
    }
}

/// Handles the --verify mode: checks stored pages against the index
fn handle_verify(config: &Config) -> anyhow::Result<()> {
    let root = Path::new(&config.output.root);
    let report = verify_index(root, &config.output.index_file)?;

    println!("Indexed pages: {}", report.total);
    println!("Missing files: {}", report.missing.len());

    if let Some(path) = write_missing_seeds(root, &report)? {
        println!("Missing URLs written to {}", path.display());
    }

    Ok(())
}

/// Handles the --stats mode: summarizes an existing index
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    let index_path = Path::new(&config.output.root).join(&config.output.index_file);
    let index = read_index(&index_path)?;

    println!("Index: {}", index_path.display());
    println!("Generated at: {}\n", index.generated_at);
    print_summary(&summarize_index(&index));

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    if config.seeds.is_empty() {
        bail!("No seed URLs given; use --start-url, --seeds-file, or `seeds` in the config");
    }

    let report = match crawl(config).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    println!();
    print_statistics(&report.statistics);
    println!("\nIndex: {}", report.index_path.display());

    Ok(())
}
