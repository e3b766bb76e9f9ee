//! hashpool - Concurrent file hashing with a bounded worker pool.
//!
//! Usage:
//!   hashpool hash [PATH]        Hash every file under PATH
//!   hashpool compare [PATH]     Time the sequential baseline against the pool
//!   hashpool guestbook          Run the concurrent guestbook demo
//!   hashpool --help             Show help

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use tracing_subscriber::EnvFilter;

use hashpool_core::{DigestAlgorithm, DigestResult, HashOutcome, PipelineConfig};
use hashpool_hash::{Dispatcher, HashReport, hash_sequential};
use hashpool_ledger::{SharedLedger, SigningOptions, sign_concurrently};

#[derive(Parser)]
#[command(
    name = "hashpool",
    version,
    about = "Concurrent file hashing with a bounded worker pool",
    long_about = "hashpool walks a directory tree and hashes every regular file \
                  with a fixed pool of worker threads fed through bounded queues."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Hash every file under a directory
    Hash {
        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Compare the sequential baseline with the worker pool
    Compare {
        #[command(flatten)]
        pipeline: PipelineArgs,
    },

    /// Have concurrent signers sign a shared guestbook
    Guestbook {
        /// Number of concurrent signers
        #[arg(short, long, default_value = "100")]
        signers: usize,

        /// Upper bound of each signer's random delay, in milliseconds
        #[arg(long, default_value = "1000")]
        max_delay_ms: u64,
    },
}

#[derive(Args)]
struct PipelineArgs {
    /// Directory to hash (defaults to the config file's root, then ".")
    path: Option<PathBuf>,

    /// Number of hashing workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Digest algorithm (sha256, sha512, blake3)
    #[arg(short, long)]
    algorithm: Option<DigestAlgorithm>,

    /// Capacity of the work and result queues
    #[arg(short, long)]
    queue_capacity: Option<usize>,

    /// Include hidden files
    #[arg(long, overrides_with = "no_hidden")]
    hidden: bool,

    /// Skip hidden files
    #[arg(long, overrides_with = "hidden")]
    no_hidden: bool,

    /// Follow symbolic links
    #[arg(long)]
    follow_symlinks: bool,

    /// Maximum directory depth to descend
    #[arg(long)]
    max_depth: Option<usize>,

    /// TOML config file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl PipelineArgs {
    /// Merge the config file (if any) with the command-line flags.
    fn into_config(self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_toml_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(path) = self.path {
            config.root = path;
        }
        if let Some(workers) = self.workers {
            config.worker_count = workers;
        }
        if let Some(algorithm) = self.algorithm {
            config.digest_algorithm = algorithm;
        }
        if let Some(capacity) = self.queue_capacity {
            config.queue_capacity = capacity;
        }
        if self.hidden {
            config.include_hidden = true;
        }
        if self.no_hidden {
            config.include_hidden = false;
        }
        if self.follow_symlinks {
            config.follow_symlinks = true;
        }
        if self.max_depth.is_some() {
            config.max_depth = self.max_depth;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Hash { pipeline, format } => run_hash(pipeline.into_config()?, format)?,
        Command::Compare { pipeline } => run_compare(pipeline.into_config()?)?,
        Command::Guestbook {
            signers,
            max_delay_ms,
        } => run_guestbook(signers, Duration::from_millis(max_delay_ms))?,
    }

    Ok(())
}

/// Hash a tree, streaming one line per file.
fn run_hash(config: PipelineConfig, format: OutputFormat) -> Result<()> {
    eprintln!(
        "Hashing {} with {} workers ({})...",
        config.root.display(),
        config.worker_count,
        config.digest_algorithm
    );

    let dispatcher = Dispatcher::new(config);

    let report = match format {
        OutputFormat::Text => dispatcher.run_with(print_result),
        OutputFormat::Json => dispatcher.run(),
    }
    .context("Hashing failed")?;

    match format {
        OutputFormat::Text => print_summary(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(())
}

/// Run the sequential baseline and the pool over the same tree.
fn run_compare(config: PipelineConfig) -> Result<()> {
    eprintln!("Hashing {} sequentially...", config.root.display());
    let sequential = hash_sequential(&config).context("Sequential run failed")?;

    eprintln!("Hashing {} with {} workers...", config.root.display(), config.worker_count);
    let pooled = Dispatcher::new(config).run().context("Pooled run failed")?;

    println!();
    println!("{}", "─".repeat(60));
    println!(" {} - {} files", pooled.root.display(), pooled.total());
    println!("{}", "─".repeat(60));
    println!(
        " Sequential:        {:>10.3}s",
        sequential.duration.as_secs_f64()
    );
    println!(
        " Pool ({:>2} workers): {:>10.3}s",
        pooled.worker_count,
        pooled.duration.as_secs_f64()
    );

    let pooled_secs = pooled.duration.as_secs_f64();
    if pooled_secs > 0.0 {
        println!(
            " Speedup:           {:>10.2}x",
            sequential.duration.as_secs_f64() / pooled_secs
        );
    }
    println!();

    if !sequential.same_outcomes(&pooled) {
        bail!("Sequential and pooled runs produced different outcomes");
    }
    println!(" Both runs produced the same {} outcomes.", pooled.total());

    Ok(())
}

/// Run the concurrent guestbook demo.
fn run_guestbook(signers: usize, max_delay: Duration) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()
        .context("Failed to start async runtime")?;

    let ledger = Arc::new(SharedLedger::new());
    let options = SigningOptions::default()
        .with_signers(signers)
        .with_max_delay(max_delay);

    let snapshot = runtime.block_on(sign_concurrently(ledger, options));

    println!("Guestbook:{}", snapshot.render());
    println!();
    match snapshot.last_update {
        Some(at) => println!("Last signed: {}", at.to_rfc3339()),
        None => println!("Last signed: never"),
    }
    println!("Total signed: {}", snapshot.update_count);

    Ok(())
}

fn print_result(result: &DigestResult) {
    match &result.outcome {
        HashOutcome::Hashed(digest) => println!("{}  {}", digest, result.path.display()),
        HashOutcome::Failed(failure) => {
            println!("FAILED {}: {}", result.path.display(), failure)
        }
    }
}

fn print_summary(report: &HashReport) {
    println!();
    println!("{}", "─".repeat(60));
    println!(
        " {} - {} hashed ({}), {} failed",
        report.root.display(),
        report.hashed_count(),
        format_size(report.bytes_hashed),
        report.failed_count()
    );
    println!(
        " {} with {} workers in {:.2}s ({:.0} files/s, {}/s)",
        report.algorithm,
        report.worker_count,
        report.duration.as_secs_f64(),
        report.files_per_second(),
        format_size(report.bytes_per_second() as u64)
    );
    println!("{}", "─".repeat(60));

    let groups = report.duplicate_groups();
    if !groups.is_empty() {
        println!();
        println!(" {} duplicate group(s)", groups.len());
        for (i, group) in groups.iter().enumerate() {
            println!(
                " Group {} ({} files, {} redundant)",
                i + 1,
                group.count(),
                group.deletable_count()
            );
            for path in &group.paths {
                println!("   {}", path.display());
            }
        }
    }

    if report.has_warnings() {
        println!();
        println!("{} warning(s) during walk", report.warnings.len());
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
