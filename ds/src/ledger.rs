//! Progress ledger
//!
//! A single JSON record holding the running progress percentage, a snapshot
//! of the latest change, and the full change history (newest first). The
//! ledger is a plain value: `load` it, `apply` one change, `save` it.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::classify::Category;
use crate::error::SyncError;

pub const MIN_PROGRESS: i32 = 0;
pub const MAX_PROGRESS: i32 = 100;

/// One recorded change; never modified after it is created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub when: String,
    pub pr: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    pub delta: i32,
    pub keywords: Category,
    pub goal: Option<String>,
    pub total_after: i32,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// The persisted ledger record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub total_progress: i32,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(default)]
    pub last_delta: Option<i32>,
    #[serde(default)]
    pub last_keywords: Option<Category>,
    #[serde(default)]
    pub last_goal: Option<String>,
    #[serde(default)]
    pub last_pr_number: Option<u64>,
    /// Keys this tool does not know about, kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Metadata describing the change being applied
#[derive(Debug, Clone)]
pub struct ChangeMeta {
    pub when: String,
    pub pr: u64,
    pub title: String,
    pub category: Category,
    pub goal: Option<String>,
}

/// Clamp a progress value into 0..=100
pub fn clamp_progress(value: i64) -> i32 {
    value.clamp(MIN_PROGRESS as i64, MAX_PROGRESS as i64) as i32
}

impl Ledger {
    /// Fresh ledger used when nothing has been persisted yet
    pub fn new(project: impl Into<String>, total_progress: i32) -> Self {
        Self {
            project: project.into(),
            total_progress,
            history: Vec::new(),
            last_update: None,
            last_delta: None,
            last_keywords: None,
            last_goal: None,
            last_pr_number: None,
            extra: Map::new(),
        }
    }

    /// Apply one change: clamp the new total, refresh the snapshot and
    /// prepend a history entry. History is never pruned.
    pub fn apply(mut self, delta: i32, meta: ChangeMeta) -> Self {
        let new_total = clamp_progress(self.total_progress as i64 + delta as i64);
        debug!(
            before = self.total_progress,
            delta,
            after = new_total,
            "Ledger::apply: computed new total"
        );

        self.total_progress = new_total;
        self.last_update = Some(meta.when.clone());
        self.last_delta = Some(delta);
        self.last_keywords = Some(meta.category);
        self.last_goal = meta.goal.clone();
        self.last_pr_number = Some(meta.pr);
        self.history.insert(
            0,
            HistoryEntry {
                when: meta.when,
                pr: meta.pr,
                title: meta.title,
                delta,
                keywords: meta.category,
                goal: meta.goal,
                total_after: new_total,
            },
        );
        self
    }

    /// Deterministic JSON rendering: fixed key order, two-space indent,
    /// trailing newline
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }
}

/// File-backed ledger location
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
}

impl LedgerStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored ledger, or `default` when the file does not exist
    pub fn load_or(&self, default: Ledger) -> Result<Ledger, SyncError> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "No ledger found, starting fresh");
            return Ok(default);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| SyncError::io(&self.path, e))?;
        let ledger: Ledger = serde_json::from_str(&content).map_err(|e| SyncError::json(&self.path, e))?;
        debug!(
            total = ledger.total_progress,
            entries = ledger.history.len(),
            "LedgerStore::load_or: loaded ledger"
        );
        Ok(ledger)
    }

    pub fn save(&self, ledger: &Ledger) -> Result<(), SyncError> {
        let content = ledger.to_json().map_err(|e| SyncError::json(&self.path, e))?;
        fs::write(&self.path, content).map_err(|e| SyncError::io(&self.path, e))?;
        debug!(path = %self.path.display(), "LedgerStore::save: written");
        Ok(())
    }
}
