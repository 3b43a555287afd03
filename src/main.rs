//! Seekr main entry point
//!
//! This is the command-line interface for the Seekr canister crawler.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use seekr::config::{load_config_with_hash, validate, Config};
use seekr::crawler::{run_seek, SeekLists};
use seekr::output::{print_summary, FanoutSink, JsonLinesSink, ReportLevel, ResultSink, SqliteSink};
use seekr::Dictionary;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Seekr: seeks dictionary terms in canister front-ends
///
/// Seekr pages through the canister index, renders each canister's
/// front-end, looks for words and phrases from a fuzzy-expanded dictionary
/// and follows links into interesting domains.
#[derive(Parser, Debug)]
#[command(name = "seekr")]
#[command(version)]
#[command(about = "Seeks dictionary terms in canister front-ends", long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seek dictionary terms across the canister index
    Seek(SeekArgs),
}

#[derive(Args, Debug)]
struct SeekArgs {
    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// File with the words and phrases to look for
    #[arg(short = 'w', long, value_name = "FILE")]
    word_file: Option<PathBuf>,

    /// File with words removed from the expanded dictionary
    #[arg(short = 'x', long, value_name = "FILE")]
    excluded_words_file: Option<PathBuf>,

    /// Do not add edit-distance-1 variants of the words
    #[arg(short = 'X', long)]
    no_expansion: bool,

    /// Drop expanded variants shorter than this
    #[arg(long, value_name = "N")]
    min_word_length: Option<usize>,

    /// Longest phrase, in words, to look for
    #[arg(long, value_name = "N")]
    max_phrase_length: Option<usize>,

    /// File with the domains whose links are followed
    #[arg(short = 'i', long, value_name = "FILE")]
    interesting_domains_file: Option<PathBuf>,

    /// Maximum number of pages rendered at once
    #[arg(short = 'c', long, value_name = "N")]
    concurrency: Option<usize>,

    /// Per-page timeout in milliseconds
    #[arg(short = 't', long, value_name = "MS")]
    timeout: Option<u64>,

    /// Save a snapshot of every matched page
    #[arg(short = 'p', long)]
    pictures: bool,

    /// Directory for snapshots of matched pages
    #[arg(long, value_name = "DIR")]
    pictures_dir: Option<PathBuf>,

    /// Upstream index requests per second
    #[arg(short = 'r', long, value_name = "N")]
    rate: Option<u32>,

    /// Skip canisters whose ID sorts at or before this one
    #[arg(short = 'f', long, value_name = "CANISTER_ID")]
    fast_forward: Option<String>,

    /// Stop after this many canisters
    #[arg(short = 'n', long, value_name = "N")]
    stop_after: Option<u64>,

    /// Check each canister with a HEAD request before crawling it
    #[arg(long)]
    probe: bool,

    /// Which results are printed
    #[arg(long, value_enum)]
    report: Option<ReportLevel>,

    /// Also record results in this SQLite database
    #[arg(long, value_name = "FILE")]
    database: Option<PathBuf>,

    /// Log per-page decisions and failures
    #[arg(short = 'd', long)]
    debug: bool,

    /// Validate configuration and word lists without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Seek(args) => {
            let verbose = if args.debug { cli.verbose.max(1) } else { cli.verbose };
            setup_logging(verbose, cli.quiet);

            let (config, config_hash) = load_effective_config(&args)?;

            if args.dry_run {
                handle_dry_run(&config)
            } else {
                handle_seek(config, &config_hash).await
            }
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries the result stream.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("seekr=info,warn"),
            1 => EnvFilter::new("seekr=debug,info"),
            2 => EnvFilter::new("seekr=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file (if any) and applies command-line overrides
fn load_effective_config(args: &SeekArgs) -> Result<(Config, String)> {
    let (mut config, config_hash) = match &args.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, hash)
        }
        None => (Config::default(), "defaults".to_string()),
    };

    apply_overrides(&mut config, args);
    validate(&config).context("Invalid configuration after command-line overrides")?;

    Ok((config, config_hash))
}

fn apply_overrides(config: &mut Config, args: &SeekArgs) {
    if let Some(path) = &args.word_file {
        config.dictionary.word_file = path.clone();
    }
    if let Some(path) = &args.excluded_words_file {
        config.dictionary.excluded_words_file = path.clone();
    }
    if args.no_expansion {
        config.dictionary.expand = false;
    }
    if let Some(n) = args.min_word_length {
        config.dictionary.min_word_length = n;
    }
    if let Some(n) = args.max_phrase_length {
        config.dictionary.max_phrase_length = n;
    }
    if let Some(path) = &args.interesting_domains_file {
        config.crawler.interesting_domains_file = path.clone();
    }
    if let Some(n) = args.concurrency {
        config.crawler.max_concurrent_pages = n;
    }
    if let Some(ms) = args.timeout {
        config.crawler.request_timeout_ms = ms;
    }
    if args.pictures {
        config.crawler.capture_matches = true;
    }
    if let Some(dir) = &args.pictures_dir {
        config.crawler.capture_dir = dir.clone();
    }
    if let Some(rate) = args.rate {
        config.source.requests_per_second = rate;
    }
    if let Some(cutoff) = &args.fast_forward {
        config.source.resume_after = Some(cutoff.clone());
    }
    if let Some(n) = args.stop_after {
        config.source.stop_after = Some(n);
    }
    if args.probe {
        config.source.probe = true;
    }
    if let Some(report) = args.report {
        config.output.report = report;
    }
    if let Some(path) = &args.database {
        config.output.database_path = Some(path.clone());
    }
}

/// Handles the --dry-run mode: validates config and lists and shows what would run
fn handle_dry_run(config: &Config) -> Result<()> {
    let lists = SeekLists::load(config).context("Failed to load word lists")?;
    let expansion = config
        .dictionary
        .expand
        .then_some(config.dictionary.min_word_length);
    let dictionary = Dictionary::build(&lists.words, &lists.excluded, expansion);

    println!("=== Seekr Dry Run ===\n");

    println!("Dictionary:");
    println!(
        "  Words: {} from {}",
        lists.words.len(),
        config.dictionary.word_file.display()
    );
    println!(
        "  Excluded: {} from {}",
        lists.excluded.len(),
        config.dictionary.excluded_words_file.display()
    );
    println!("  Expansion: {}", if config.dictionary.expand { "on" } else { "off" });
    println!("  Effective terms: {}", dictionary.len());
    println!("  Max phrase length: {}", config.dictionary.max_phrase_length);

    println!("\nCrawler:");
    println!("  Max concurrent pages: {}", config.crawler.max_concurrent_pages);
    println!("  Request timeout: {}ms", config.crawler.request_timeout_ms);
    println!("  Link policy: {:?}", config.crawler.link_policy);
    if config.crawler.capture_matches {
        println!("  Capturing matches to: {}", config.crawler.capture_dir.display());
    }

    println!("\nInteresting Domains ({}):", lists.domains.len());
    for domain in &lists.domains {
        println!("  - {}", domain);
    }

    println!("\nSource:");
    println!("  Index: {}", config.source.base_url);
    println!("  Page size: {}", config.source.page_size);
    println!("  Requests per second: {}", config.source.requests_per_second);
    println!("  Candidate URLs: {}", config.source.url_template);
    if let Some(cutoff) = &config.source.resume_after {
        println!("  Resuming after: {}", cutoff);
    }
    if let Some(n) = config.source.stop_after {
        println!("  Stopping after: {} canisters", n);
    }

    println!("\n✓ Configuration is valid");

    Ok(())
}

/// Handles the main seek operation
async fn handle_seek(config: Config, config_hash: &str) -> Result<()> {
    let mut sinks: Vec<Arc<dyn ResultSink>> =
        vec![Arc::new(JsonLinesSink::stdout(config.output.report))];

    let database = match &config.output.database_path {
        Some(path) => {
            let db = SqliteSink::open(path, config_hash)
                .with_context(|| format!("Failed to open results database {}", path.display()))?;
            tracing::info!("Recording results in {} (run {})", path.display(), db.run_id());
            Some(Arc::new(db))
        }
        None => None,
    };

    if let Some(db) = &database {
        sinks.push(db.clone());
    }

    let sink = Arc::new(FanoutSink::new(sinks));

    match run_seek(config, sink).await {
        Ok(summary) => {
            if let Some(db) = &database {
                db.finish_run("completed")?;
            }
            tracing::info!("Seek completed successfully");
            print_summary(&summary);
            Ok(())
        }
        Err(e) => {
            if let Some(db) = &database {
                if let Err(db_err) = db.finish_run("failed") {
                    tracing::warn!("Failed to mark run as failed: {}", db_err);
                }
            }
            tracing::error!("Seek failed: {}", e);
            Err(e).context("Seek failed")
        }
    }
}
