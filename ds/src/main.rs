use std::path::PathBuf;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use tracing::{debug, info};

use docsync::cli::{Cli, Command};
use docsync::config::Config;
use docsync::event::{self, PullRequest};
use docsync::ledger::{Ledger, LedgerStore};
use docsync::pipeline::{self, Targets};

fn parse_level(level: &str) -> Option<tracing::Level> {
    match level.to_uppercase().as_str() {
        "TRACE" => Some(tracing::Level::TRACE),
        "DEBUG" => Some(tracing::Level::DEBUG),
        "INFO" => Some(tracing::Level::INFO),
        "WARN" | "WARNING" => Some(tracing::Level::WARN),
        "ERROR" => Some(tracing::Level::ERROR),
        _ => None,
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => parse_level(s).unwrap_or_else(|| {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
            tracing::Level::INFO
        }),
        None => tracing::Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre::eyre!("Failed to install subscriber: {}", e))?;

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    config.validate()?;

    info!("docsync starting");

    match cli.command {
        Command::Sync {
            event: event_arg,
            readme,
            ledger,
        } => {
            let env_value = std::env::var_os(&config.event.env_var);
            let Some(event_path) = event::locate(event_arg.as_deref(), env_value) else {
                println!("No event payload found; exiting without changes.");
                return Ok(());
            };

            let mut targets = Targets::from_config(&config);
            override_path(&mut targets.readme, readme);
            override_path(&mut targets.ledger, ledger);

            let pr = PullRequest::from_path(&event_path).context("Failed to read event payload")?;
            let report = pipeline::sync(&config, &targets, &pr, chrono::Utc::now())?;

            println!(
                "{} PR #{} tagged {} ({:+}%): progress {} → {}",
                "✓".green(),
                report.pr_number,
                report.classification.category.to_string().cyan(),
                report.classification.delta,
                report.previous_total,
                report.new_total.to_string().bold()
            );
            if let Some(goal) = report.goal {
                println!("  goal: {}", goal);
            }
        }
        Command::Regen { planning, readme } => {
            let mut targets = Targets::from_config(&config);
            override_path(&mut targets.planning, planning);
            override_path(&mut targets.readme, readme);

            let report = pipeline::regenerate(&config, &targets, chrono::Utc::now())?;
            println!(
                "{} README regenerated from {} ({} bytes)",
                "✓".green(),
                targets.planning.display(),
                report.bytes_written
            );
            println!("  Phase: {}", report.snapshot.phase_title.cyan());
            println!("  Milestones: {}", report.snapshot.milestones.len());
            println!("  Phases: {}", report.snapshot.phase_history.len());
            println!("  Issues: {}", report.snapshot.issue_history.len());
        }
        Command::Classify { text } => {
            let joined = text.join(" ");
            let c = docsync::classify(Some(joined.as_str()), None, None);
            println!("{} {:+}", c.category.to_string().cyan(), c.delta);
        }
        Command::Status { ledger, entries } => {
            let path = ledger.unwrap_or_else(|| config.paths.ledger.clone());
            let store = LedgerStore::new(&path);
            let ledger = store.load_or(Ledger::new(&config.project, config.ledger.default_progress))?;

            println!("Project: {}", ledger.project.cyan());
            println!("  Progress: {}%", ledger.total_progress.to_string().bold());
            println!("  Last update: {}", ledger.last_update.as_deref().unwrap_or("never"));
            println!("  Recorded changes: {}", ledger.history.len());
            for entry in ledger.history.iter().take(entries) {
                println!(
                    "  {} PR #{} {} ({:+}%) → {}",
                    entry.when.dimmed(),
                    entry.pr,
                    entry.keywords.to_string().yellow(),
                    entry.delta,
                    entry.total_after
                );
            }
        }
    }

    Ok(())
}

fn override_path(target: &mut PathBuf, value: Option<PathBuf>) {
    if let Some(path) = value {
        *target = path;
    }
}
