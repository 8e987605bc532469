//! Full README regeneration from a planning snapshot
//!
//! Output depends only on the snapshot, the branding block and the
//! synchronization date passed in.

use serde::{Deserialize, Serialize};

use crate::extract::PlanSnapshot;

/// Fixed preamble of the regenerated README
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Branding {
    /// Top-level title, without the leading `#`
    pub title: String,

    /// Italic one-line tagline
    pub tagline: String,

    /// Overview paragraph
    pub overview: String,

    /// Bullet points listed under "It merges:"
    pub highlights: Vec<String>,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            title: "🧠 Moncchichi Hub".to_string(),
            tagline: "A companion control & AI interface for Even Realities G1 Smart Glasses.".to_string(),
            overview: "Moncchichi Hub connects the **Even Realities G1 Smart Glasses** with an **AI assistant** \
                       that delivers live telemetry, contextual replies, and on-device intelligence."
                .to_string(),
            highlights: vec![
                "🔗 **BLE Telemetry:** battery, firmware, and sensor data".to_string(),
                "💬 **AI Assistant:** GPT-4o-mini for contextual help and automation".to_string(),
                "🧱 **Offline Reliability:** cached responses when network is unavailable".to_string(),
                "🧩 **Minimal UI:** optimized for hands-free and field use".to_string(),
            ],
        }
    }
}

/// Render the complete README
pub fn build_document(snapshot: &PlanSnapshot, branding: &Branding, synced_on: &str) -> String {
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("# {}", branding.title));
    lines.push(format!("*{}*\n", branding.tagline));
    lines.push("## 📍 Project Overview".to_string());
    lines.push(branding.overview.clone());
    if !branding.highlights.is_empty() {
        lines.push("It merges:".to_string());
        let last = branding.highlights.len() - 1;
        for (i, highlight) in branding.highlights.iter().enumerate() {
            let sep = if i == last { "\n" } else { "" };
            lines.push(format!("- {}{}", highlight, sep));
        }
    }

    lines.push("## ⚙️ Development Progress".to_string());
    lines.push(format!("### Current Phase — {}", snapshot.phase_title));
    lines.push(format!("**Objective:** {}\n", snapshot.phase_objective));
    lines.push("| # | Milestone | Status | Summary |".to_string());
    lines.push("|---|------------|--------|---------|".to_string());
    for m in &snapshot.milestones {
        lines.push(format!("| {} | {} | {} | {} |", m.index, m.name, m.status, m.summary));
    }

    lines.push("\n## 🧩 Phase History (Chronological Overview)".to_string());
    lines.push("| Major Phase | Highlights | Status |".to_string());
    lines.push("|--------------|-------------|---------|".to_string());
    for phase in &snapshot.phase_history {
        lines.push(format!("| {} | {} | ✅ |", phase.label, phase.description));
    }

    lines.push("\n## 🧾 Issue History (latest 5)".to_string());
    lines.push("| Date | Summary | Status |".to_string());
    lines.push("|------|----------|---------|".to_string());
    for issue in &snapshot.issue_history {
        lines.push(format!("| {} | {} | {} |", issue.date, issue.summary, issue.status));
    }

    lines.push(format!("\n_Last synchronized: {}_", synced_on));
    lines.join("\n")
}
