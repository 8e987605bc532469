//! Keyword classification of pull request text
//!
//! Maps free-form text to a progress delta and a category tag. Rules are
//! checked in order and the first one with a matching keyword wins, so text
//! mentioning both "fix" and "feat" is a fix.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Category tag attached to a change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Revert,
    Fix,
    Feat,
    Perf,
    Refactor,
    Neutral,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Revert => "revert",
            Category::Fix => "fix",
            Category::Feat => "feat",
            Category::Perf => "perf",
            Category::Refactor => "refactor",
            Category::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of classifying one event's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub delta: i32,
    pub category: Category,
}

struct Rule {
    keywords: &'static [&'static str],
    delta: i32,
    category: Category,
}

// Order matters: reordering changes outcomes for overlapping keywords.
const RULES: &[Rule] = &[
    Rule {
        keywords: &["revert", "rollback"],
        delta: -2,
        category: Category::Revert,
    },
    Rule {
        keywords: &["fix", "hotfix", "bug"],
        delta: 2,
        category: Category::Fix,
    },
    Rule {
        keywords: &["feat", "add", "implement"],
        delta: 4,
        category: Category::Feat,
    },
    Rule {
        keywords: &["perf", "optimi"],
        delta: 1,
        category: Category::Perf,
    },
    Rule {
        keywords: &["refactor", "cleanup"],
        delta: 0,
        category: Category::Refactor,
    },
    Rule {
        keywords: &["docs", "ci", "chore"],
        delta: 0,
        category: Category::Neutral,
    },
];

/// Classify title, body and any extra text (e.g. commit messages)
///
/// Keywords match as substrings of the lower-cased, space-joined text.
pub fn classify(title: Option<&str>, body: Option<&str>, extra: Option<&str>) -> Classification {
    let text = [title, body, extra]
        .iter()
        .map(|part| part.unwrap_or(""))
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();

    for rule in RULES {
        if let Some(keyword) = rule.keywords.iter().find(|k| text.contains(**k)) {
            debug!(%keyword, category = %rule.category, delta = rule.delta, "classify: rule matched");
            return Classification {
                delta: rule.delta,
                category: rule.category,
            };
        }
    }

    debug!("classify: no rule matched, neutral");
    Classification {
        delta: 0,
        category: Category::Neutral,
    }
}
