//! Field extraction from the planning document
//!
//! The planning document has a fixed shape, so fields are pulled out with
//! header lookups and line patterns instead of a Markdown parser. Callers go
//! through `PlanExtractor` so the matching strategy can change without
//! touching them.
//!
//! ```text
//! ## ⚙️ ACTIVE DEVELOPMENT CONTEXT
//! CURRENT_PHASE: Phase 4 — Assistant
//! PHASE_OBJECTIVE: Ship offline replies
//! | 1 | BLE link | ✅ | Stable pairing |
//! ## 🧩 CODEX TASK ZONE
//! ...
//! ## 🧾 PHASE SUMMARY
//! **Phase 1** — Bootstrap
//! ...
//! | 2025-01-04 | Fixed reconnect loop | ✅ |
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const UNKNOWN_PHASE: &str = "Unknown";

/// Default number of issue rows kept (most recent)
pub const DEFAULT_ISSUE_LIMIT: usize = 5;

static PHASE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)CURRENT_PHASE:[ \t]*(.*)$").expect("phase pattern is valid"));
static OBJECTIVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)PHASE_OBJECTIVE:[ \t]*(.*)$").expect("objective pattern is valid"));
static MILESTONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\|[ \t]*(\d+)[ \t]*\|[ \t]*(.*?)[ \t]*\|[ \t]*(.*?)[ \t]*\|[ \t]*(.*?)[ \t]*\|")
        .expect("milestone pattern is valid")
});
static ISSUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\|[ \t]*(\d{4}-\d{2}-\d{2})[ \t]*\|[ \t]*(.*?)[ \t]*\|[ \t]*(.*?)[ \t]*\|")
        .expect("issue pattern is valid")
});
static PHASE_LINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\*(.*?)\*\*.*?—\s*(.*)$").expect("phase line pattern is valid"));

/// A row of the milestone table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub index: u32,
    pub name: String,
    pub status: String,
    pub summary: String,
}

/// A `**Phase** — description` line from the phase summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub label: String,
    pub description: String,
}

/// A dated row of the progress table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRecord {
    pub date: String,
    pub summary: String,
    pub status: String,
}

/// Everything the README regeneration needs from the planning document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSnapshot {
    pub phase_title: String,
    pub phase_objective: String,
    pub milestones: Vec<Milestone>,
    pub phase_history: Vec<PhaseRecord>,
    pub issue_history: Vec<IssueRecord>,
}

impl Default for PlanSnapshot {
    fn default() -> Self {
        Self {
            phase_title: UNKNOWN_PHASE.to_string(),
            phase_objective: String::new(),
            milestones: Vec::new(),
            phase_history: Vec::new(),
            issue_history: Vec::new(),
        }
    }
}

/// Pulls a `PlanSnapshot` out of planning Markdown
pub trait PlanExtractor {
    /// Never fails: missing parts yield placeholders
    fn extract(&self, markdown: &str) -> PlanSnapshot;
}

/// Header literals that bound the planning document's blocks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanMarkers {
    /// Start of the active development block
    #[serde(rename = "active-header")]
    pub active_header: String,

    /// Header that ends the active development block
    #[serde(rename = "active-end-header")]
    pub active_end_header: String,

    /// Start of the phase summary block
    #[serde(rename = "summary-header")]
    pub summary_header: String,

    /// Most recent issue rows to keep
    #[serde(rename = "issue-limit")]
    pub issue_limit: usize,
}

impl Default for PlanMarkers {
    fn default() -> Self {
        Self {
            active_header: "## ⚙️ ACTIVE DEVELOPMENT CONTEXT".to_string(),
            active_end_header: "## 🧩 CODEX TASK ZONE".to_string(),
            summary_header: "## 🧾 PHASE SUMMARY".to_string(),
            issue_limit: DEFAULT_ISSUE_LIMIT,
        }
    }
}

/// Pattern-based extractor
#[derive(Debug, Clone, Default)]
pub struct PatternExtractor {
    markers: PlanMarkers,
}

impl PatternExtractor {
    pub fn new(markers: PlanMarkers) -> Self {
        Self { markers }
    }

    /// Text strictly between the active header and its end header
    fn active_block<'a>(&self, markdown: &'a str) -> Option<&'a str> {
        let start = markdown.find(&self.markers.active_header)? + self.markers.active_header.len();
        let len = markdown[start..].find(&self.markers.active_end_header)?;
        Some(&markdown[start..start + len])
    }

    /// Lines after the summary header up to the next `##` line
    fn summary_block<'a>(&self, markdown: &'a str) -> Option<Vec<&'a str>> {
        let start = markdown.find(&self.markers.summary_header)? + self.markers.summary_header.len();
        Some(
            markdown[start..]
                .lines()
                .skip(1)
                .take_while(|line| !line.trim_start().starts_with("##"))
                .collect(),
        )
    }

    fn milestones(block: &str) -> Vec<Milestone> {
        MILESTONE_RE
            .captures_iter(block)
            .filter_map(|caps| {
                Some(Milestone {
                    index: caps[1].parse().ok()?,
                    name: caps[2].to_string(),
                    status: caps[3].to_string(),
                    summary: caps[4].to_string(),
                })
            })
            .collect()
    }

    fn phase_history(lines: &[&str]) -> Vec<PhaseRecord> {
        lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| line.starts_with("**"))
            .filter_map(|line| PHASE_LINE_RE.captures(line))
            .map(|caps| PhaseRecord {
                label: caps[1].trim().to_string(),
                description: caps[2].trim().to_string(),
            })
            .collect()
    }

    fn issues(&self, markdown: &str) -> Vec<IssueRecord> {
        let all: Vec<IssueRecord> = ISSUE_RE
            .captures_iter(markdown)
            .map(|caps| IssueRecord {
                date: caps[1].to_string(),
                summary: caps[2].to_string(),
                status: caps[3].to_string(),
            })
            .collect();
        let skip = all.len().saturating_sub(self.markers.issue_limit);
        all.into_iter().skip(skip).collect()
    }
}

impl PlanExtractor for PatternExtractor {
    fn extract(&self, markdown: &str) -> PlanSnapshot {
        let mut snapshot = PlanSnapshot::default();

        match self.active_block(markdown) {
            Some(block) => {
                if let Some(caps) = PHASE_RE.captures(block) {
                    snapshot.phase_title = caps[1].trim().to_string();
                }
                if let Some(caps) = OBJECTIVE_RE.captures(block) {
                    snapshot.phase_objective = caps[1].trim().to_string();
                }
                snapshot.milestones = Self::milestones(block);
            }
            None => warn!(
                header = %self.markers.active_header,
                "Active development block not found, using placeholders"
            ),
        }

        match self.summary_block(markdown) {
            Some(lines) => snapshot.phase_history = Self::phase_history(&lines),
            None => warn!(header = %self.markers.summary_header, "Phase summary not found"),
        }

        snapshot.issue_history = self.issues(markdown);

        debug!(
            phase = %snapshot.phase_title,
            milestones = snapshot.milestones.len(),
            phases = snapshot.phase_history.len(),
            issues = snapshot.issue_history.len(),
            "PatternExtractor::extract: done"
        );
        snapshot
    }
}
