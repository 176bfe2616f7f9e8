use std::fmt;

use crate::Listing;

/// Recoverable problem categories. Fatal failures never reach a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// The page held bytes invalid for its encoding; they were replaced and parsing went on.
    Decode,
    /// A table row was malformed and skipped.
    ParseRow,
    /// Reading the last record or a history column failed; history was assumed empty.
    StoreRead,
    /// An append failed. The batch fell back to single rows, or a single row was dropped.
    StoreWrite,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::Decode => write!(f, "page decoded lossily"),
            IssueKind::ParseRow => write!(f, "row skipped"),
            IssueKind::StoreRead => write!(f, "store read failed"),
            IssueKind::StoreWrite => write!(f, "store write failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunIssue {
    pub kind: IssueKind,
    pub detail: String,
}

impl RunIssue {
    pub fn new(kind: IssueKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

/// How the parse ended relative to the stop marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StopOutcome {
    /// No marker was known; the whole page was scanned.
    #[default]
    NoMarker,
    /// The marker row was found and the scan stopped there.
    Reached,
    /// A marker was known but never appeared on the page.
    NotFound,
}

/// Everything one sync run did, for the binary to print and tests to assert on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunReport {
    pub source_url: String,
    pub stop_marker: Option<Listing>,
    pub stop: StopOutcome,
    pub rows_seen: usize,
    pub candidates: usize,
    pub suppressed: usize,
    pub appended: Vec<Listing>,
    pub dropped: Vec<Listing>,
    pub used_row_fallback: bool,
    pub issues: Vec<RunIssue>,
}

impl RunReport {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            ..Self::default()
        }
    }

    pub fn push_issue(&mut self, kind: IssueKind, detail: impl Into<String>) {
        self.issues.push(RunIssue::new(kind, detail));
    }

    pub fn issues_of(&self, kind: IssueKind) -> impl Iterator<Item = &RunIssue> {
        self.issues.iter().filter(move |issue| issue.kind == kind)
    }

    pub fn has_issue(&self, kind: IssueKind) -> bool {
        self.issues_of(kind).next().is_some()
    }

    pub fn store_mutated(&self) -> bool {
        !self.appended.is_empty()
    }

    /// Human-readable account of the run, one line per step.
    pub fn narrative(&self) -> Vec<String> {
        let mut lines = Vec::new();
        lines.push(format!("Source: {}", self.source_url));
        match &self.stop_marker {
            Some(marker) => lines.push(format!("Most recent stored listing: {marker}")),
            None => lines.push("Store has no previous listings".to_string()),
        }
        let stop = match self.stop {
            StopOutcome::NoMarker => "scanned the full table",
            StopOutcome::Reached => "stopped at the most recent stored listing",
            StopOutcome::NotFound => "stored listing not found on page; scanned the full table",
        };
        lines.push(format!(
            "Parsed {} rows, {} candidates ({stop})",
            self.rows_seen, self.candidates
        ));
        if self.suppressed > 0 {
            lines.push(format!("Skipped {} already known listings", self.suppressed));
        }
        for issue in &self.issues {
            lines.push(format!("  {}: {}", issue.kind, issue.detail));
        }
        if self.used_row_fallback {
            lines.push("Batch append failed; appended rows one at a time".to_string());
        }
        if self.appended.is_empty() {
            lines.push("No new listings to add".to_string());
        } else {
            lines.push(format!("Added {} new listings:", self.appended.len()));
            for listing in &self.appended {
                lines.push(format!("  + {listing}"));
            }
        }
        for listing in &self.dropped {
            lines.push(format!("  ! dropped {listing}"));
        }
        lines
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.narrative() {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
