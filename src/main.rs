use anyhow::Result;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

use muzzle::config::{FilterConfig, FilterEngine};
use muzzle::scanner::{ChatLogScanner, ScanConfig};

#[derive(Parser, Debug)]
#[command(name = "muzzle")]
#[command(about = "Evasion-resistant content filter for game-server chat")]
#[command(version)]
struct Args {
    /// Filter configuration file (TOML); built-in defaults when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan chat-log files line by line and report flagged lines
    Scan {
        /// Chat log files to scan
        files: Vec<PathBuf>,

        /// Abort on first read error
        #[arg(long)]
        fail_fast: bool,

        /// Suppress console progress bars
        #[arg(long)]
        no_progress: bool,

        /// Findings output file path (JSON lines)
        #[arg(long, default_value = "findings.jsonl")]
        report_out: PathBuf,
    },
    /// Classify a single chat line
    Line {
        /// The message text
        text: String,
    },
    /// Validate a display name: alphabet coverage plus category scan
    Name {
        /// The display name
        name: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // WHY: structured JSON logging enables observability and debugging in production
    tracing_subscriber::fmt()
        .with_target(false)
        .json()
        .init();

    let args = Args::parse();

    info!("Starting muzzle");
    info!(?args, "Parsed CLI arguments");

    let config = match &args.config {
        Some(path) => {
            // WHY: validate the configuration path early to fail fast with clear error
            if !path.exists() {
                anyhow::bail!("Configuration file does not exist: {}", path.display());
            }
            FilterConfig::load(path)?
        }
        None => FilterConfig::default(),
    };
    let engine = config.compile()?;

    match args.command {
        Command::Scan {
            files,
            fail_fast,
            no_progress,
            report_out,
        } => scan(&engine, &files, fail_fast, no_progress, &report_out).await,
        Command::Line { text } => {
            classify_line(&engine, &text);
            Ok(())
        }
        Command::Name { name } => {
            check_name(&engine, &name);
            Ok(())
        }
    }
}

async fn scan(
    engine: &FilterEngine,
    files: &[PathBuf],
    fail_fast: bool,
    no_progress: bool,
    report_out: &PathBuf,
) -> Result<()> {
    if files.is_empty() {
        anyhow::bail!("No chat log files given");
    }
    for file in files {
        if !file.exists() {
            anyhow::bail!("Chat log does not exist: {}", file.display());
        }
    }

    let scan_config = ScanConfig {
        fail_fast,
        ..Default::default()
    };
    let scanner = ChatLogScanner::new(scan_config, &engine.classifier);

    let progress = if no_progress {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(files.len() as u64);
        bar.set_style(ProgressStyle::default_bar().template("{bar:40} {pos}/{len} {msg}")?);
        bar
    };

    let mut report = std::fs::File::create(report_out)?;
    let mut total_lines = 0u64;
    let mut total_flagged = 0u64;
    let mut failed_files = 0u64;

    for file in files {
        progress.set_message(file.display().to_string());
        let (findings, stats) = scanner.scan_file(file).await?;

        total_lines += stats.lines_read;
        total_flagged += stats.flagged;
        if stats.read_error.is_some() {
            failed_files += 1;
        }

        for finding in &findings {
            serde_json::to_writer(&mut report, finding)?;
            report.write_all(b"\n")?;
        }

        if let Some(ref error) = stats.read_error {
            info!("Issue with {}: {}", stats.file_path, error);
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    info!(
        total_lines,
        total_flagged, failed_files, "chat log scan completed"
    );

    println!("muzzle v{} - Scan complete", env!("CARGO_PKG_VERSION"));
    println!("Scanned {} files, {total_lines} lines", files.len());
    println!("Flagged lines: {total_flagged}");
    if failed_files > 0 {
        println!("Files with read issues: {failed_files}");
    }
    println!("Findings written to {}", report_out.display());

    Ok(())
}

fn classify_line(engine: &FilterEngine, text: &str) {
    let hit = engine
        .classifier
        .classify(text)
        .or_else(|| engine.classifier.classify_despaced(text));

    match hit {
        Some(hit) => {
            println!("FLAGGED: \"{}\" in \"{}\"", hit.category, hit.matched);
            if !hit.source.anomalies.is_empty() {
                let codes: Vec<String> = hit
                    .source
                    .anomalies
                    .iter()
                    .map(|a| format!("u+{} {:?}", a.code, a.character))
                    .collect();
                println!("Non-ASCII code points: {}", codes.join(", "));
            }
        }
        None => println!("clean"),
    }
}

fn check_name(engine: &FilterEngine, name: &str) {
    if !engine.alphabet.is_acceptable(name, engine.name_minimum) {
        println!(
            "REJECTED: fewer than {} recognizable characters",
            engine.name_minimum.max(1)
        );
        return;
    }
    match engine.classifier.classify_despaced(name) {
        Some(hit) => println!("FLAGGED: \"{}\" in \"{}\"", hit.category, hit.matched),
        None => println!("acceptable"),
    }
}
