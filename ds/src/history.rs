//! Newest-first history list under a README header
//!
//! Each merge adds one line directly below the section caption. Only the
//! `limit` most recent lines are kept visible; the ledger keeps the rest.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::classify::Category;
use crate::patch::{append_section, find_header, header_from_literal, join_lines, section_end};

/// Default number of entries shown under the history header
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

static GOAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t]*goal[ \t]*:[ \t]*(.+)$").expect("goal pattern is valid"));

/// Pull the `Goal:` annotation out of a PR body
pub fn extract_goal(body: &str) -> Option<String> {
    GOAL_RE
        .captures(body)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|goal| !goal.is_empty())
}

/// One line of the visible history
#[derive(Debug, Clone)]
pub struct HistoryLine<'a> {
    pub stamp: &'a str,
    pub pr: u64,
    pub title: &'a str,
    pub delta: i32,
    pub category: Category,
    pub goal: Option<&'a str>,
}

impl HistoryLine<'_> {
    pub fn render(&self) -> String {
        let mut line = format!(
            "- {} — PR #{}: **{}** · delta `{:+}%` · tag `{}`",
            self.stamp,
            self.pr,
            self.title.trim(),
            self.delta,
            self.category
        );
        if let Some(goal) = self.goal {
            line.push_str(&format!(" · goal: _{}_", goal));
        }
        line
    }
}

/// Inserts entries below a header and bounds the visible list
#[derive(Debug, Clone)]
pub struct HistoryAppender {
    header: String,
    caption: String,
    limit: usize,
}

impl HistoryAppender {
    pub fn new(header: impl Into<String>, caption: impl Into<String>, limit: usize) -> Self {
        Self {
            header: header.into(),
            caption: caption.into(),
            limit,
        }
    }

    /// Insert `entry` as the first line under the caption, creating the
    /// section if needed, then drop entries beyond the limit
    ///
    /// Only lines inside the section are trimmed. Trailing blank lines of the
    /// section and everything after it are left untouched.
    pub fn append(&self, document: &str, entry: &str) -> String {
        let header = header_from_literal(&self.header);
        let created;
        let document = if find_header(&document.lines().collect::<Vec<_>>(), &header).is_none() {
            debug!(header = %self.header, "HistoryAppender::append: creating section");
            created = append_section(document, &self.header, &self.caption);
            created.as_str()
        } else {
            document
        };

        let lines: Vec<&str> = document.lines().collect();
        let Some(start) = find_header(&lines, &header) else {
            return document.to_string();
        };
        let end = section_end(&lines, start, header.level);

        // Trailing blanks separate the section from what follows; keep them.
        let section = &lines[start + 1..end];
        let trailing_blanks = section.iter().rev().take_while(|l| l.trim().is_empty()).count();
        let content_end = end - trailing_blanks;

        // Blank lines and the caption ahead of the first entry are rewritten.
        let mut body_start = start + 1;
        while body_start < content_end && lines[body_start].trim().is_empty() {
            body_start += 1;
        }
        if body_start < content_end && lines[body_start].trim() == self.caption.trim() {
            body_start += 1;
            while body_start < content_end && lines[body_start].trim().is_empty() {
                body_start += 1;
            }
        }

        let entries = &lines[body_start..content_end];
        let kept = self.limit.saturating_sub(1).min(entries.len());
        debug!(
            existing = entries.len(),
            kept,
            dropped = entries.len() - kept,
            "HistoryAppender::append: trimming visible history"
        );

        let mut out: Vec<&str> = Vec::with_capacity(lines.len() + 2);
        out.extend_from_slice(&lines[..=start]);
        out.push(self.caption.as_str());
        if self.limit > 0 {
            out.push(entry);
        }
        out.extend_from_slice(&entries[..kept]);
        out.extend_from_slice(&lines[content_end..]);
        join_lines(&out)
    }
}
