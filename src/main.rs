//! # Skrapa
//!
//! Command-line consumer for the `skrapa` library: scrapes weather from yr.no
//! and klart.se and articles from gp.se and aftonbladet.se, and prints the
//! results as JSON.
//!
//! ## Usage
//!
//! ```sh
//! skrapa yr
//! skrapa all --deadline-secs 300 --pretty
//! RUST_LOG=skrapa=debug skrapa gp
//! ```

use clap::Parser;
use std::error::Error;
use tracing::{debug, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod output;

use cli::{Cli, Source};
use output::Envelope;
use skrapa::{Pipeline, Settings};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let settings = load_settings(&args)?;
    let pipeline = Pipeline::new(settings)?;
    info!(source = args.source.as_str(), settings = ?pipeline.settings(), "skrapa starting up");

    let envelopes = match args.source {
        Source::Yr => vec![Envelope::from_result("yr", pipeline.yr_weather().await)?],
        Source::Klart => vec![Envelope::from_result("klart", pipeline.klart_weather().await)?],
        Source::Gp => vec![Envelope::from_result("gp", pipeline.gp_articles().await)?],
        Source::Aftonbladet => vec![Envelope::from_result(
            "aftonbladet",
            pipeline.aftonbladet_articles().await,
        )?],
        Source::All => {
            let (yr, klart, gp, aftonbladet) = tokio::join!(
                pipeline.yr_weather(),
                pipeline.klart_weather(),
                pipeline.gp_articles(),
                pipeline.aftonbladet_articles(),
            );
            vec![
                Envelope::from_result("yr", yr)?,
                Envelope::from_result("klart", klart)?,
                Envelope::from_result("gp", gp)?,
                Envelope::from_result("aftonbladet", aftonbladet)?,
            ]
        }
    };

    output::print(&envelopes, args.pretty)?;

    let failed = envelopes.iter().filter(|e| e.is_error()).count();
    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        failed,
        "Execution complete"
    );

    if failed > 0 {
        return Err(format!("{failed} of {} sources failed", envelopes.len()).into());
    }
    Ok(())
}

/// Defaults, then the YAML file, then command-line overrides.
fn load_settings(args: &Cli) -> Result<Settings, Box<dyn Error>> {
    let mut settings = match &args.config {
        Some(path) => Settings::from_yaml_file(path)?,
        None => Settings::default(),
    };
    if let Some(n) = args.max_attempts {
        settings.retry.max_attempts = n;
    }
    if let Some(ms) = args.rate_limit_ms {
        settings.rate_limit_ms = ms;
    }
    if let Some(secs) = args.deadline_secs {
        settings.deadline_secs = Some(secs);
    }
    Ok(settings)
}
