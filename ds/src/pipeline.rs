//! The two synchronization runs
//!
//! `sync` (event-driven patch):
//! event → classify → ledger apply → status line + history → README, ledger
//!
//! `regenerate` (full rebuild):
//! planning document → extract → build → README
//!
//! The README and the ledger are written one after the other with no
//! rollback; a failure between the two writes leaves them out of step.

use chrono::{DateTime, Utc};
use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::builder::build_document;
use crate::classify::{Classification, classify};
use crate::config::Config;
use crate::error::SyncError;
use crate::event::PullRequest;
use crate::extract::{PatternExtractor, PlanExtractor, PlanSnapshot};
use crate::history::{HistoryAppender, HistoryLine, extract_goal};
use crate::ledger::{ChangeMeta, Ledger, LedgerStore};
use crate::patch::{StatusLine, Trend, patch_section};

/// Resolved file locations for one run
#[derive(Debug, Clone)]
pub struct Targets {
    pub readme: PathBuf,
    pub ledger: PathBuf,
    pub planning: PathBuf,
}

impl Targets {
    pub fn from_config(config: &Config) -> Self {
        Self {
            readme: config.paths.readme.clone(),
            ledger: config.paths.ledger.clone(),
            planning: config.paths.planning.clone(),
        }
    }
}

/// Result of a `sync` run
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub pr_number: u64,
    pub classification: Classification,
    pub goal: Option<String>,
    pub previous_total: i32,
    pub new_total: i32,
}

/// Result of a `regenerate` run
#[derive(Debug, Clone)]
pub struct RegenReport {
    pub snapshot: PlanSnapshot,
    pub bytes_written: usize,
}

fn read_optional(path: &Path) -> Result<Option<String>, SyncError> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(SyncError::io(path, e)),
    }
}

/// Apply the patch-side edits to a README body
pub fn patch_readme(config: &Config, readme: &str, pr: &PullRequest, ledger: &Ledger, stamp: &str) -> String {
    let readme_cfg = &config.readme;
    let entry = ledger.history.first();
    let delta = entry.map(|e| e.delta).unwrap_or(0);

    let mut doc = if readme_cfg.reset_history {
        patch_section(readme, &readme_cfg.history_header, &readme_cfg.history_caption)
    } else {
        readme.to_string()
    };

    doc = StatusLine::new(&readme_cfg.status_label).patch(&doc, ledger.total_progress, Trend::from_delta(delta), stamp);

    if let Some(entry) = entry {
        let line = HistoryLine {
            stamp,
            pr: pr.number,
            title: pr.display_title(),
            delta: entry.delta,
            category: entry.keywords,
            goal: entry.goal.as_deref(),
        }
        .render();
        doc = HistoryAppender::new(
            &readme_cfg.history_header,
            &readme_cfg.history_caption,
            readme_cfg.history_limit,
        )
        .append(&doc, &line);
    }
    doc
}

/// Record one merged pull request in the ledger and the README
pub fn sync(config: &Config, targets: &Targets, pr: &PullRequest, now: DateTime<Utc>) -> Result<SyncReport> {
    let clock = config.clock.build()?;
    let stamp = clock.stamp(now);

    let classification = classify(Some(pr.title.as_str()), Some(pr.body.as_str()), None);
    let goal = extract_goal(&pr.body);
    info!(
        pr = pr.number,
        delta = classification.delta,
        tag = %classification.category,
        "Classified pull request"
    );

    let store = LedgerStore::new(&targets.ledger);
    let ledger = store
        .load_or(Ledger::new(&config.project, config.ledger.default_progress))
        .context("Failed to load ledger")?;
    let previous_total = ledger.total_progress;

    let ledger = ledger.apply(
        classification.delta,
        ChangeMeta {
            when: stamp.clone(),
            pr: pr.number,
            title: pr.title.clone(),
            category: classification.category,
            goal: goal.clone(),
        },
    );

    let readme = read_optional(&targets.readme)
        .context("Failed to read README")?
        .unwrap_or_else(|| format!("# {}\n", config.project));
    let patched = patch_readme(config, &readme, pr, &ledger, &stamp);

    fs::write(&targets.readme, &patched)
        .map_err(|e| SyncError::io(&targets.readme, e))
        .context("Failed to write README")?;
    debug!(path = %targets.readme.display(), "sync: README written");

    store.save(&ledger).context("Failed to save ledger")?;
    info!(from = previous_total, to = ledger.total_progress, "Progress updated");

    Ok(SyncReport {
        pr_number: pr.number,
        classification,
        goal,
        previous_total,
        new_total: ledger.total_progress,
    })
}

/// Rebuild the README from the planning document, discarding its old content
pub fn regenerate(config: &Config, targets: &Targets, now: DateTime<Utc>) -> Result<RegenReport> {
    let clock = config.clock.build()?;

    let planning = fs::read_to_string(&targets.planning)
        .map_err(|e| SyncError::io(&targets.planning, e))
        .context("Failed to read planning document")?;

    let snapshot = PatternExtractor::new(config.planning.clone()).extract(&planning);
    let document = build_document(&snapshot, &config.branding, &clock.date(now));

    fs::write(&targets.readme, &document)
        .map_err(|e| SyncError::io(&targets.readme, e))
        .context("Failed to write README")?;
    info!(
        path = %targets.readme.display(),
        phase = %snapshot.phase_title,
        "README regenerated"
    );

    Ok(RegenReport {
        snapshot,
        bytes_written: document.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Category;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 1, 30, 0).unwrap()
    }

    fn targets(temp: &TempDir) -> Targets {
        Targets {
            readme: temp.path().join("README.md"),
            ledger: temp.path().join("codex-progress.json"),
            planning: temp.path().join("CONTEXT_ENGINEERING.md"),
        }
    }

    fn pr(number: u64, title: &str, body: &str) -> PullRequest {
        PullRequest {
            number,
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn test_revert_scenario() {
        let temp = TempDir::new().unwrap();
        let targets = targets(&temp);
        let config = Config::default();
        LedgerStore::new(&targets.ledger)
            .save(&Ledger::new("Hub", 80))
            .unwrap();
        fs::write(&targets.readme, "# Hub\n\nIntro\n").unwrap();

        let report = sync(&config, &targets, &pr(42, "Revert feature X", "Goal: stability"), now()).unwrap();

        assert_eq!(report.classification.delta, -2);
        assert_eq!(report.classification.category, Category::Revert);
        assert_eq!(report.new_total, 78);

        let readme = fs::read_to_string(&targets.readme).unwrap();
        assert!(readme.contains("Total Progress: 🟩 ~78 % complete 🔻 (auto-updated 2025-05-01 09:30 SGT)"));
        assert!(readme.contains(
            "- 2025-05-01 09:30 SGT — PR #42: **Revert feature X** · delta `-2%` · tag `revert` · goal: _stability_"
        ));

        let ledger = LedgerStore::new(&targets.ledger).load_or(Ledger::new("x", 0)).unwrap();
        assert_eq!(ledger.total_progress, 78);
        assert_eq!(ledger.history[0].pr, 42);
        assert_eq!(ledger.history[0].goal.as_deref(), Some("stability"));
        assert_eq!(ledger.last_keywords, Some(Category::Revert));
    }

    #[test]
    fn test_fresh_repository() {
        let temp = TempDir::new().unwrap();
        let targets = targets(&temp);

        let report = sync(&Config::default(), &targets, &pr(1, "feat: pairing", ""), now()).unwrap();
        assert_eq!(report.previous_total, 70);
        assert_eq!(report.new_total, 74);

        let readme = fs::read_to_string(&targets.readme).unwrap();
        let lines: Vec<&str> = readme.lines().collect();
        assert_eq!(lines[0], "# Moncchichi BLE Hub");
        assert!(lines[1].starts_with("Total Progress: 🟩 ~74 %"));
        assert!(readme.contains("## 🚧 Issue History\n_Auto-maintained by Codex on each merge._\n- "));
    }

    #[test]
    fn test_repeated_syncs_accumulate() {
        let temp = TempDir::new().unwrap();
        let targets = targets(&temp);
        let config = Config::default();

        for n in 1..=12 {
            sync(&config, &targets, &pr(n, "chore: tidy", ""), now()).unwrap();
        }

        let readme = fs::read_to_string(&targets.readme).unwrap();
        assert_eq!(readme.matches("Total Progress:").count(), 1);
        assert_eq!(readme.lines().filter(|l| l.starts_with("- ")).count(), 10);
        assert!(readme.contains("PR #12:"));
        assert!(!readme.contains("PR #2:"));

        let ledger = LedgerStore::new(&targets.ledger).load_or(Ledger::new("x", 0)).unwrap();
        assert_eq!(ledger.history.len(), 12);
    }

    #[test]
    fn test_reset_history_keeps_single_entry() {
        let temp = TempDir::new().unwrap();
        let targets = targets(&temp);
        let mut config = Config::default();
        config.readme.reset_history = true;

        sync(&config, &targets, &pr(1, "fix: a", ""), now()).unwrap();
        sync(&config, &targets, &pr(2, "fix: b", ""), now()).unwrap();

        let readme = fs::read_to_string(&targets.readme).unwrap();
        let entries: Vec<&str> = readme.lines().filter(|l| l.starts_with("- ")).collect();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].contains("PR #2:"));
    }

    #[test]
    fn test_regenerate_overwrites_readme() {
        let temp = TempDir::new().unwrap();
        let targets = targets(&temp);
        fs::write(&targets.readme, "old content that must vanish\n").unwrap();
        fs::write(
            &targets.planning,
            "## ⚙️ ACTIVE DEVELOPMENT CONTEXT\nCURRENT_PHASE: Phase 2\nPHASE_OBJECTIVE: Telemetry\n| 1 | BLE | ✅ | Done |\n## 🧩 CODEX TASK ZONE\n",
        )
        .unwrap();

        let report = regenerate(&Config::default(), &targets, now()).unwrap();
        let readme = fs::read_to_string(&targets.readme).unwrap();

        assert_eq!(report.snapshot.phase_title, "Phase 2");
        assert_eq!(report.bytes_written, readme.len());
        assert!(!readme.contains("old content"));
        assert!(readme.contains("| 1 | BLE | ✅ | Done |"));
        assert!(readme.ends_with("_Last synchronized: 2025-05-01_"));

        regenerate(&Config::default(), &targets, now()).unwrap();
        assert_eq!(fs::read_to_string(&targets.readme).unwrap(), readme);
    }

    #[test]
    fn test_regenerate_missing_planning_is_an_error() {
        let temp = TempDir::new().unwrap();
        assert!(regenerate(&Config::default(), &targets(&temp), now()).is_err());
    }
}
