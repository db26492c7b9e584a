//! dupsift - Decide which duplicate files to keep, remove or rename.
//!
//! Usage:
//!   dupsift plan [PATH]      List the action for every file
//!   dupsift summary [PATH]   Count actions and reclaimable space
//!   dupsift --help           Show help
//!
//! Nothing is ever deleted or renamed; the output is a plan.

mod logging;

use std::path::{Path, PathBuf};
use std::thread;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, eyre};

use dupsift_analyze::{ActionKind, Classifier, ClassifyReport, SiftConfig, TieBreak};
use dupsift_scan::{JwalkScanner, ScanConfig, ScanProgress};
use tokio::sync::broadcast::{self, error::RecvError};

#[derive(Parser)]
#[command(
    name = "dupsift",
    version,
    about = "Decide which duplicate files to keep, remove or rename",
    long_about = "dupsift walks a directory tree and assigns every file exactly one \
                  action: keep, remove (empty or a redundant copy) or keep-with-rename \
                  (distinct content that shares its name with another kept file).\n\n\
                  Nothing is modified on disk."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the action for every file
    Plan {
        #[command(flatten)]
        scan: ScanArgs,

        /// Only show actions of this kind (keep, remove, keep-with-rename)
        #[arg(long)]
        only: Option<ActionKind>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Print counts per action and reclaimable space
    Summary {
        #[command(flatten)]
        scan: ScanArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Args)]
struct ScanArgs {
    /// Directory to scan
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Only consider files whose name matches this regular expression
    #[arg(long)]
    filter: Option<String>,

    /// Skip entries matching this glob (repeatable)
    #[arg(long = "ignore", value_name = "GLOB")]
    ignore: Vec<String>,

    /// Skip hidden files and directories
    #[arg(long)]
    no_hidden: bool,

    /// Follow symbolic links
    #[arg(long)]
    follow_symlinks: bool,

    /// Descend into other filesystems
    #[arg(long)]
    cross_filesystems: bool,

    /// Maximum directory depth
    #[arg(long)]
    max_depth: Option<u32>,

    /// Worker threads for scanning and hashing (0 = all cores)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Which member of a group survives
    #[arg(long)]
    tie_break: Option<TieBreak>,

    /// Classifier settings file (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    match cli.command {
        Command::Plan { scan, only, format } => {
            let mut report = classify(&scan)?;
            if let Some(kind) = only {
                report.retain_kind(kind);
            }
            print_plan(&report, format)?;
        }
        Command::Summary { scan, format } => {
            let report = classify(&scan)?;
            print_summary(&report, &scan.path, format)?;
        }
    }

    Ok(())
}

/// Scan the tree and classify every file found.
fn classify(args: &ScanArgs) -> Result<ClassifyReport> {
    let root = args.path.canonicalize().context("Invalid path")?;

    let sift_config = load_sift_config(args)?;
    let scan_config = ScanConfig::builder()
        .root(&root)
        .filename_filter(args.filter.clone())
        .ignore_patterns(args.ignore.clone())
        .include_hidden(!args.no_hidden)
        .follow_symlinks(args.follow_symlinks)
        .cross_filesystems(args.cross_filesystems)
        .max_depth(args.max_depth)
        .threads(sift_config.threads)
        .build()
        .context("Invalid scan options")?;

    tracing::debug!(?sift_config, ?scan_config, "starting");
    eprintln!("Scanning {}...", root.display());

    let scanner = JwalkScanner::new();
    let progress = report_progress(scanner.subscribe());
    let result = Classifier::with_config(sift_config).classify_source(&scanner, &scan_config);

    // Closes the channel if the scan failed before its final snapshot.
    drop(scanner);
    let _ = progress.join();

    result.context("Scan failed")
}

/// Print scan progress to stderr until the final snapshot arrives or the
/// scanner goes away. Returns the last snapshot seen.
fn report_progress(
    mut rx: broadcast::Receiver<ScanProgress>,
) -> thread::JoinHandle<Option<ScanProgress>> {
    thread::spawn(move || {
        let mut last = None;
        loop {
            match rx.blocking_recv() {
                Ok(progress) => {
                    eprint!(
                        "\r {} files, {} ({:.0} files/s)   ",
                        progress.files_found,
                        format_size(progress.bytes_found),
                        progress.files_per_second()
                    );
                    let finished = progress.finished;
                    last = Some(progress);
                    if finished {
                        eprintln!();
                        break;
                    }
                }
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
        last
    })
}

/// Read the settings file, if any, and apply flag overrides.
fn load_sift_config(args: &ScanArgs) -> Result<SiftConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        }
        None => SiftConfig::default(),
    };

    if let Some(threads) = args.threads {
        config.threads = threads;
    }
    if let Some(tie_break) = args.tie_break {
        config.tie_break = tie_break;
    }

    config
        .validate()
        .map_err(|message| eyre!("Invalid classifier settings: {message}"))?;
    Ok(config)
}

fn print_plan(report: &ClassifyReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for action in &report.actions {
                let record = action.record();
                println!(
                    "[{}] {} ({}) {}",
                    action.kind(),
                    record.filename(),
                    format_size(record.size()),
                    record.path().display()
                );
            }
            for unresolved in &report.unresolved {
                eprintln!(
                    "warning: kept unverified {} ({})",
                    unresolved.record.path().display(),
                    unresolved.reason
                );
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
    }

    Ok(())
}

fn print_summary(report: &ClassifyReport, path: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(60));
            println!(" {}", path.display());
            println!(
                " {} files classified in {:.2}s",
                report.actions.len(),
                report.duration.as_secs_f64()
            );
            println!("{}", "─".repeat(60));
            println!();

            for (kind, count) in report.counts() {
                println!("   {:<18} {:>8}", kind.to_string(), count);
            }
            println!();
            println!(
                " Reclaimable: {}",
                format_size(report.reclaimable_bytes())
            );
            println!(
                " Duplicate groups: {} ({} empty files)",
                report.stats.duplicate_groups, report.stats.zero_length
            );
            println!(
                " Hashed: {} sampled, {} full",
                format_size(report.stats.chunk_bytes_read),
                format_size(report.stats.full_bytes_read)
            );

            if !report.unresolved.is_empty() {
                println!();
                println!(" {} file(s) could not be read and were kept:", report.unresolved.len());
                for unresolved in &report.unresolved {
                    println!("   {} ({})", unresolved.record.path().display(), unresolved.reason);
                }
            }

            if !report.scan_warnings.is_empty() {
                println!();
                println!("{} warning(s) during scan", report.scan_warnings.len());
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
    }

    Ok(())
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
