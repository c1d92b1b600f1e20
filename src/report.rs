//! Per-file outcomes of a run and the sink that receives them as they happen.

use crate::rule::Rule;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// What happened to one matched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// The file was moved into its destination directory.
    Moved,
    /// Dry run: the file would be moved.
    WouldMove,
    /// The destination directory could not be created.
    DestinationUnavailable,
    /// Something already exists at the destination path.
    DestinationConflict,
    /// The rename itself failed.
    MoveFailed,
}

impl Status {
    pub fn is_success(self) -> bool {
        matches!(self, Self::Moved | Self::WouldMove)
    }
}

/// Outcome for one file under one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    pub file: String,
    pub rule: Rule,
    /// Destination path relative to the working directory.
    pub destination: String,
    pub status: Status,
    /// Error text for failed outcomes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Receives run events for rendering. The core never formats user-facing
/// text itself; it hands everything to one of these.
pub trait Diagnostics {
    /// A rule matched `matched` files and processing is about to start.
    fn rule_started(&mut self, rule: &Rule, matched: usize);

    /// No file in the working directory matched the rule.
    fn no_matches(&mut self, rule: &Rule);

    fn outcome(&mut self, outcome: &FileOutcome);

    fn rule_finished(&mut self, rule: &Rule);
}

/// A sink that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn rule_started(&mut self, _rule: &Rule, _matched: usize) {}
    fn no_matches(&mut self, _rule: &Rule) {}
    fn outcome(&mut self, _outcome: &FileOutcome) {}
    fn rule_finished(&mut self, _rule: &Rule) {}
}

/// Summary of a whole run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub dry_run: bool,
    pub outcomes: Vec<FileOutcome>,
    /// Rules for which no file matched.
    pub unmatched: Vec<Rule>,
}

impl RunReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            started_at: Utc::now(),
            dry_run,
            outcomes: Vec::new(),
            unmatched: Vec::new(),
        }
    }

    /// Number of files moved, or that would be moved in a dry run.
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.status.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Outcomes with the given status.
    pub fn with_status(&self, status: Status) -> impl Iterator<Item = &FileOutcome> {
        self.outcomes.iter().filter(move |o| o.status == status)
    }

    /// A run succeeds if anything was moved or nothing failed.
    ///
    /// A run with no matching files at all is a success.
    pub fn is_success(&self) -> bool {
        self.succeeded() > 0 || self.failed() == 0
    }

    /// Successful file counts keyed by rule directory.
    pub fn counts_by_directory(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for outcome in self.outcomes.iter().filter(|o| o.status.is_success()) {
            *counts.entry(outcome.rule.directory()).or_insert(0) += 1;
        }
        counts
    }
}
