//! librarian-quality
//!
//! Command-line front end for the release scoring engine. Results are
//! written to stdout as JSON; logs go to stderr.

mod cli;

use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use librarian_quality::config::{Config, LogFormat};
use librarian_quality::services::profile_catalog::ProfileCatalog;
use librarian_quality::services::quality_evaluator::{QualityEvaluator, ScoreOptions};
use librarian_quality::services::quality_profile::ScoringProfile;
use librarian_quality::services::release_ranker::Candidate;
use librarian_quality::services::upgrade::UpgradeOptions;

use crate::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    init_tracing(config.log_format);

    let formats = config.load_format_catalog()?;
    let profiles = config.load_profile_catalog(&formats)?;
    let evaluator = QualityEvaluator::new(formats.clone());

    let profile_key = cli.profile.as_deref().unwrap_or(&config.default_profile);

    match cli.command {
        Commands::Score { name, release } => {
            let options = ScoreOptions {
                stored: None,
                size_bytes: release.size_bytes,
                context: release.size_context(),
                protocol: release.protocol,
            };
            let profile = resolve_profile(&profiles, profile_key)?;
            let result = evaluator.score_release(&name, profile, &options)?;
            print_json(&result)
        }

        Commands::Compare {
            existing,
            candidate,
            min_improvement,
            allow_sidegrade,
        } => {
            let options = UpgradeOptions {
                minimum_improvement: min_improvement,
                allow_sidegrade,
            };
            let profile = resolve_profile(&profiles, profile_key)?;
            let result = evaluator.is_upgrade(&existing, &candidate, profile, &options)?;
            print_json(&result)
        }

        Commands::Rank { names } => {
            let candidates: Vec<Candidate> = names.into_iter().map(Candidate::new).collect();
            let profile = resolve_profile(&profiles, profile_key)?;
            let ranking = evaluator.rank_releases(&candidates, profile)?;
            print_json(&ranking)
        }

        Commands::Profiles => print_json(&profiles.all()),

        Commands::Formats => print_json(formats.as_ref()),
    }
}

fn resolve_profile<'a>(profiles: &'a ProfileCatalog, key: &str) -> Result<&'a ScoringProfile> {
    profiles.get(key).with_context(|| {
        let known: Vec<&str> = profiles.ids().collect();
        format!("Unknown quality profile '{}' (available: {})", key, known.join(", "))
    })
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "librarian_quality=info".into());

    let json = (format == LogFormat::Json)
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));
    let pretty = (format == LogFormat::Pretty)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .init();
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value).context("Failed to serialize output")?;
    writeln!(stdout)?;
    Ok(())
}
