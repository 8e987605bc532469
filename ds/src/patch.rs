//! In-place patches of a Markdown document
//!
//! Two primitives, both idempotent:
//! - the status line (`Total Progress: ...`) is rewritten where it stands, or
//!   inserted below the title when missing
//! - a named section is reset to its header plus a caption, or appended
//!
//! A section runs from its header line up to the next header of the same or a
//! higher level (fewer `#`), or the end of the document.

use tracing::debug;

/// Direction of the latest progress change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    pub fn from_delta(delta: i32) -> Self {
        match delta {
            d if d > 0 => Trend::Up,
            d if d < 0 => Trend::Down,
            _ => Trend::Flat,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Trend::Up => "🔺",
            Trend::Down => "🔻",
            Trend::Flat => "➖",
        }
    }
}

/// A Markdown ATX header: level (number of `#`) and title text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub level: usize,
    pub title: String,
}

impl Header {
    /// Parse `line` as a header; `None` for anything else
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim_start();
        let level = trimmed.chars().take_while(|c| *c == '#').count();
        if level == 0 || level > 6 {
            return None;
        }
        let rest = &trimmed[level..];
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return None;
        }
        Some(Self {
            level,
            title: rest.trim().to_string(),
        })
    }

    /// Same level and same title, ignoring case and surrounding spaces
    pub fn matches(&self, line: &str) -> bool {
        Header::parse(line)
            .map(|h| h.level == self.level && h.title.to_lowercase() == self.title.to_lowercase())
            .unwrap_or(false)
    }
}

/// Index of the first line matching `header`
pub(crate) fn find_header(lines: &[&str], header: &Header) -> Option<usize> {
    lines.iter().position(|line| header.matches(line))
}

/// End (exclusive) of the section whose header sits at `start`
pub(crate) fn section_end(lines: &[&str], start: usize, level: usize) -> usize {
    lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, line)| Header::parse(line).is_some_and(|h| h.level <= level))
        .map(|(idx, _)| idx)
        .unwrap_or(lines.len())
}

/// Join lines with a single trailing newline
pub(crate) fn join_lines<S: AsRef<str>>(lines: &[S]) -> String {
    let mut out = lines.iter().map(|l| l.as_ref()).collect::<Vec<_>>().join("\n");
    out.push('\n');
    out
}

/// Rewrites the labeled status line of a document
#[derive(Debug, Clone)]
pub struct StatusLine {
    label: String,
}

impl StatusLine {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into() }
    }

    /// Render the line for a percentage, trend and timestamp
    pub fn render(&self, percent: i32, trend: Trend, stamp: &str) -> String {
        format!(
            "{}: 🟩 ~{} % complete {} (auto-updated {})",
            self.label,
            percent,
            trend.symbol(),
            stamp
        )
    }

    fn is_status_line(&self, line: &str) -> bool {
        let prefix = format!("{}:", self.label.to_lowercase());
        line.to_lowercase().starts_with(&prefix)
    }

    /// Replace every status line with a fresh one, or insert one below a
    /// leading title (at the very top when there is no title)
    pub fn patch(&self, document: &str, percent: i32, trend: Trend, stamp: &str) -> String {
        let replacement = self.render(percent, trend, stamp);
        let mut lines: Vec<&str> = document.lines().collect();

        let mut replaced = 0usize;
        for line in lines.iter_mut() {
            if self.is_status_line(line) {
                *line = replacement.as_str();
                replaced += 1;
            }
        }

        if replaced == 0 {
            let insert_at = match lines.first() {
                Some(first) if first.starts_with('#') => 1,
                _ => 0,
            };
            debug!(insert_at, "StatusLine::patch: no status line, inserting");
            lines.insert(insert_at, replacement.as_str());
        } else {
            debug!(replaced, "StatusLine::patch: replaced status line(s)");
        }

        join_lines(&lines)
    }
}

/// Reset the section under `header_line` to header + caption, or append it
///
/// The header literal is parsed as a Markdown header; a literal without
/// leading `#` is treated as a level-2 header.
pub fn patch_section(document: &str, header_line: &str, caption: &str) -> String {
    let header = header_from_literal(header_line);
    let lines: Vec<&str> = document.lines().collect();

    match find_header(&lines, &header) {
        Some(start) => {
            let end = section_end(&lines, start, header.level);
            debug!(start, end, "patch_section: replacing section body");

            let mut out: Vec<&str> = Vec::with_capacity(lines.len());
            out.extend_from_slice(&lines[..start]);
            out.push(lines[start]);
            out.push(caption);
            if end < lines.len() {
                out.push("");
                out.extend_from_slice(&lines[end..]);
            }
            join_lines(&out)
        }
        None => {
            debug!("patch_section: section absent, appending");
            append_section(document, &header_text(&header), caption)
        }
    }
}

/// Append header + caption after a blank separator
pub(crate) fn append_section(document: &str, header_line: &str, caption: &str) -> String {
    let body = document.trim();
    if body.is_empty() {
        format!("{}\n{}\n", header_line, caption)
    } else {
        format!("{}\n\n{}\n{}\n", body, header_line, caption)
    }
}

pub(crate) fn header_from_literal(literal: &str) -> Header {
    Header::parse(literal).unwrap_or_else(|| Header {
        level: 2,
        title: literal.trim().to_string(),
    })
}

pub(crate) fn header_text(header: &Header) -> String {
    format!("{} {}", "#".repeat(header.level), header.title)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HISTORY: &str = "## 🚧 Issue History";
    const CAPTION: &str = "_Auto-maintained by Codex on each merge._";

    fn status() -> StatusLine {
        StatusLine::new("Total Progress")
    }

    #[test]
    fn test_trend_from_delta() {
        assert_eq!(Trend::from_delta(4), Trend::Up);
        assert_eq!(Trend::from_delta(-2), Trend::Down);
        assert_eq!(Trend::from_delta(0), Trend::Flat);
        assert_eq!(Trend::Down.symbol(), "🔻");
    }

    #[test]
    fn test_header_parse() {
        assert_eq!(
            Header::parse("##  🚧 Issue History  "),
            Some(Header {
                level: 2,
                title: "🚧 Issue History".to_string()
            })
        );
        assert_eq!(Header::parse("#hashtag"), None);
        assert_eq!(Header::parse("plain"), None);
        assert!(Header::parse(HISTORY).unwrap().matches("## 🚧 ISSUE HISTORY"));
        assert!(!Header::parse(HISTORY).unwrap().matches("### 🚧 Issue History"));
    }

    #[test]
    fn test_status_inserted_below_title() {
        let doc = "# Hub\n\nSome intro\n";
        let out = status().patch(doc, 72, Trend::Up, "2025-01-01 09:00 SGT");

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "# Hub");
        assert_eq!(
            lines[1],
            "Total Progress: 🟩 ~72 % complete 🔺 (auto-updated 2025-01-01 09:00 SGT)"
        );
        assert_eq!(lines[3], "Some intro");
    }

    #[test]
    fn test_status_inserted_at_top_without_title() {
        let out = status().patch("intro\n", 70, Trend::Flat, "t");
        assert!(out.starts_with("Total Progress: 🟩 ~70 % complete ➖ (auto-updated t)\nintro\n"));

        let out = status().patch("", 70, Trend::Flat, "t");
        assert_eq!(out, "Total Progress: 🟩 ~70 % complete ➖ (auto-updated t)\n");
    }

    #[test]
    fn test_status_replaced_case_insensitively() {
        let doc = "# Hub\ntotal progress: 🟩 ~10 % complete 🔺 (auto-updated old)\nbody\n";
        let out = status().patch(doc, 78, Trend::Down, "new");

        assert_eq!(out, "# Hub\nTotal Progress: 🟩 ~78 % complete 🔻 (auto-updated new)\nbody\n");
    }

    #[test]
    fn test_status_patch_is_idempotent() {
        let doc = "# Hub\n\nintro\n";
        let once = status().patch(doc, 74, Trend::Up, "t1");
        let twice = status().patch(&once, 74, Trend::Up, "t2");

        assert_eq!(twice.matches("Total Progress:").count(), 1);
        assert_eq!(twice, once.replace("t1", "t2"));
    }

    #[test]
    fn test_status_not_matched_mid_line() {
        let doc = "# Hub\nSee Total Progress: below\n";
        let out = status().patch(doc, 70, Trend::Flat, "t");
        assert_eq!(out.matches("Total Progress:").count(), 2);
        assert!(out.contains("See Total Progress: below"));
    }

    #[test]
    fn test_section_appended_when_absent() {
        let out = patch_section("# Hub\nintro\n\n\n", HISTORY, CAPTION);
        assert_eq!(out, format!("# Hub\nintro\n\n{}\n{}\n", HISTORY, CAPTION));
    }

    #[test]
    fn test_section_body_replaced_up_to_next_header() {
        let doc = format!(
            "# Hub\n{}\n{}\n- old entry\n- older entry\n\n## Next\nkept\n",
            HISTORY, CAPTION
        );
        let out = patch_section(&doc, HISTORY, CAPTION);

        assert_eq!(out, format!("# Hub\n{}\n{}\n\n## Next\nkept\n", HISTORY, CAPTION));
    }

    #[test]
    fn test_section_keeps_deeper_headers_inside() {
        let doc = format!("{}\nx\n### Sub\ny\n# Top\nz\n", HISTORY);
        let out = patch_section(&doc, HISTORY, CAPTION);

        assert_eq!(out, format!("{}\n{}\n\n# Top\nz\n", HISTORY, CAPTION));
    }

    #[test]
    fn test_section_patch_is_idempotent() {
        let doc = format!("# Hub\n{}\n- a\n## After\n", HISTORY);
        let once = patch_section(&doc, HISTORY, CAPTION);
        let twice = patch_section(&once, HISTORY, CAPTION);
        assert_eq!(once, twice);

        let once = patch_section("# Hub\n", HISTORY, CAPTION);
        assert_eq!(patch_section(&once, HISTORY, CAPTION), once);
    }
}
