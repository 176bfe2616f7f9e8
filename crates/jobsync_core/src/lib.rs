//! Jobsync core: listing model and the pure incremental-sync decisions.
mod history;
mod listing;
mod report;
mod select;

pub use history::{DuplicateReason, History};
pub use listing::{Listing, StopMarker};
pub use report::{IssueKind, RunIssue, RunReport, StopOutcome};
pub use select::{select_new_listings, Selection, Suppressed};
