//! Turn ExtLatency gateway log lines into latency trees.
//!
//! # Usage
//!
//! ```bash
//! # Every ExtLatency line of a log file
//! extlatency /var/log/gateway.log
//!
//! # From stdin, as JSON
//! grep ExtLatency gateway.log | extlatency --format json
//!
//! # A single line
//! extlatency --line 'ExtLatency: TS=0,HR=1,BS=3,TC=3 [/orders]'
//! ```

use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use extlatency::config::LatencyConfig;
use extlatency::latency::{
    self, Descriptions, EXTLATENCY_MARKER, LatencyRecord, ParseError, ParseOptions,
};
use extlatency::styling::{ERROR, ERROR_EMOJI, HINT, HINT_EMOJI, eprintln, println};

#[derive(Parser)]
#[command(name = "extlatency")]
#[command(about = "Turn ExtLatency gateway log lines into latency trees", long_about = None)]
#[command(version)]
struct Cli {
    /// Log file to read (`-` or omitted reads stdin)
    #[arg(conflicts_with = "line")]
    file: Option<PathBuf>,

    /// Parse this single line instead of reading a log
    #[arg(long)]
    line: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Tree)]
    format: Format,

    /// Keyword description table (JSON object of keyword to text)
    #[arg(long, value_name = "PATH")]
    descriptions: Option<PathBuf>,

    /// Config file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log more (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    /// Box-drawing tree with durations and descriptions
    Tree,
    /// Pretty-printed JSON, one document per line parsed
    Json,
    /// Keyword breakdown and slowest actions
    Summary,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            if let Some(err) = e.downcast_ref::<ParseError>() {
                eprintln!("{}", err.styled());
            } else {
                eprintln!("{ERROR_EMOJI} {ERROR}{e:#}{ERROR:#}");
            }
            process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Returns whether every ExtLatency line parsed.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let config = LatencyConfig::resolve(cli.config.as_deref())?;
    let descriptions = config.load_descriptions(cli.descriptions.as_deref())?;
    let options = ParseOptions::from(&config);

    if let Some(line) = &cli.line {
        let record = latency::parse_line(line, &descriptions, &options)?;
        print_record(&record, cli.format)?;
        return Ok(true);
    }

    let Some(input) = read_input(cli.file.as_deref())? else {
        eprintln!("Usage: extlatency <file> | extlatency < input");
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  extlatency /var/log/gateway.log");
        eprintln!("  grep ExtLatency gateway.log | extlatency --format summary");
        return Ok(false);
    };

    process_log(&input, &descriptions, &options, cli.format)
}

/// Read the log from a file or stdin. `None` when stdin is an interactive
/// terminal, which would otherwise block waiting for input.
///
/// Invalid UTF-8 is replaced rather than rejected; only ExtLatency lines need
/// to be readable.
fn read_input(file: Option<&Path>) -> anyhow::Result<Option<String>> {
    let bytes = match file {
        Some(path) if path != Path::new("-") => std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        _ => {
            if std::io::stdin().is_terminal() {
                return Ok(None);
            }
            let mut content = Vec::new();
            std::io::stdin()
                .lock()
                .read_to_end(&mut content)
                .context("Failed to read stdin")?;
            content
        }
    };
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

fn process_log(
    input: &str,
    descriptions: &Descriptions,
    options: &ParseOptions,
    format: Format,
) -> anyhow::Result<bool> {
    let mut found = 0usize;
    let mut failed = 0usize;

    for (index, line) in input.lines().enumerate() {
        let number = index + 1;
        if !line.contains(EXTLATENCY_MARKER) {
            log::debug!("Skipping line {number}: no {EXTLATENCY_MARKER} marker");
            continue;
        }
        found += 1;

        match latency::parse_line(line, descriptions, options) {
            Ok(record) => print_record(&record, format)?,
            Err(err) => {
                failed += 1;
                eprintln!("{ERROR}Line {number}:{ERROR:#}");
                eprintln!("{}", err.styled());
                eprintln!();
            }
        }
    }

    if found == 0 {
        eprintln!("{ERROR_EMOJI} {ERROR}No ExtLatency entries found in input.{ERROR:#}");
        eprintln!();
        eprintln!(
            "{HINT_EMOJI} {HINT}ExtLatency lines look like: ExtLatency: TS=0,HR=1,PS=1,XSL=4,PC=5,BS=6,TC=6 [https://host/path]{HINT:#}"
        );
        return Ok(false);
    }

    log::info!("Parsed {} of {found} ExtLatency lines", found - failed);
    Ok(failed == 0)
}

fn print_record(record: &LatencyRecord, format: Format) -> anyhow::Result<()> {
    match format {
        Format::Tree => println!("{}", latency::render_tree(record, true)),
        Format::Json => println!("{}", serde_json::to_string_pretty(record)?),
        Format::Summary => println!(
            "{}",
            latency::render_summary(&latency::analyze(record))
        ),
    }
    Ok(())
}
