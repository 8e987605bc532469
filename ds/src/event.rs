//! Pull request event payload
//!
//! The payload is the JSON document a CI runner drops on disk for the
//! triggering event. Only `pull_request.{title, body, number}` are read.

use serde::Deserialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::SyncError;

/// The fields of a pull request this tool cares about
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Default, Deserialize)]
struct Payload {
    #[serde(default)]
    pull_request: Option<RawPullRequest>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPullRequest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    number: Option<u64>,
    #[serde(default)]
    id: Option<u64>,
}

impl PullRequest {
    /// Decode a payload file; absent or null fields fall back to empty / zero
    pub fn from_path(path: &Path) -> Result<Self, SyncError> {
        let content = fs::read_to_string(path).map_err(|e| SyncError::io(path, e))?;
        let pr = Self::from_json(&content).map_err(|e| SyncError::json(path, e))?;
        debug!(number = pr.number, title = %pr.title, "PullRequest::from_path: decoded payload");
        Ok(pr)
    }

    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let payload: Payload = serde_json::from_str(content)?;
        let raw = payload.pull_request.unwrap_or_default();
        Ok(Self {
            number: raw.number.filter(|n| *n != 0).or(raw.id).unwrap_or(0),
            title: raw.title.unwrap_or_default(),
            body: raw.body.unwrap_or_default(),
        })
    }

    /// Title as shown in the README
    pub fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() { "No title" } else { title }
    }
}

/// Resolve where the event payload lives
///
/// An explicit path wins over the environment value. Returns `None` when
/// neither is given or the named file does not exist; callers treat that as
/// "nothing to do".
pub fn locate(explicit: Option<&Path>, env_value: Option<OsString>) -> Option<PathBuf> {
    let candidate = match explicit {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(env_value.filter(|v| !v.is_empty())?),
    };

    if candidate.is_file() {
        Some(candidate)
    } else {
        debug!(path = %candidate.display(), "locate: event payload does not exist");
        None
    }
}
