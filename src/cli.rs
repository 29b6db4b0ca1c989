//! Command-line interface definitions for Skrapa.
//!
//! The binary is a thin consumer of the library: it picks a source, runs it
//! and prints the records as JSON on stdout. Diagnostics go to stderr.

use clap::{Parser, ValueEnum};

/// Which source(s) to scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Source {
    Yr,
    Klart,
    Gp,
    Aftonbladet,
    /// All four, concurrently.
    All,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Yr => "yr",
            Source::Klart => "klart",
            Source::Gp => "gp",
            Source::Aftonbladet => "aftonbladet",
            Source::All => "all",
        }
    }
}

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Weather from yr.no
/// skrapa yr
///
/// # GP articles, giving up after two minutes
/// skrapa gp --deadline-secs 120 --pretty
///
/// # Settings from a file, with one override
/// skrapa all --config skrapa.yaml --max-attempts 0
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Source to scrape
    #[arg(value_enum)]
    pub source: Source,

    /// Optional path to a YAML settings file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Attempts per page fetch, 0 for no limit
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Pause between article fetches in milliseconds
    #[arg(long)]
    pub rate_limit_ms: Option<u64>,

    /// Give up on a source after this many seconds
    #[arg(long)]
    pub deadline_secs: Option<u64>,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pub pretty: bool,
}
