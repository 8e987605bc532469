//! docsync - README and progress ledger synchronization
//!
//! Keeps two derived Markdown artifacts in step with their sources:
//!
//! - `sync`: a merged pull request is classified into a progress delta,
//!   recorded in the JSON ledger, and reflected in the README's status line
//!   and issue history section (patched in place)
//! - `regen`: the README is rebuilt from the planning document
//!
//! # Example
//!
//! ```ignore
//! use docsync::config::Config;
//! use docsync::event::PullRequest;
//! use docsync::pipeline::{self, Targets};
//!
//! let config = Config::load(None)?;
//! let pr = PullRequest::from_path("event.json".as_ref())?;
//! let report = pipeline::sync(&config, &Targets::from_config(&config), &pr, chrono::Utc::now())?;
//! println!("{} -> {}", report.previous_total, report.new_total);
//! ```

pub mod builder;
pub mod classify;
pub mod cli;
pub mod clock;
pub mod config;
pub mod error;
pub mod event;
pub mod extract;
pub mod history;
pub mod ledger;
pub mod patch;
pub mod pipeline;

pub use classify::{Category, Classification, classify};
pub use error::SyncError;
pub use extract::{PatternExtractor, PlanExtractor, PlanSnapshot};
pub use ledger::{Ledger, LedgerStore};
