use std::slice;
use std::time::Duration;

use jobsync_core::{
    select_new_listings, History, IssueKind, Listing, RunReport, StopMarker, StopOutcome,
};
use jobsync_logging::{jobsync_info, jobsync_warn};
use serde::{Deserialize, Serialize};

use crate::{decode_markup, Column, FetchError, Fetcher, ListingParser, ListingStore};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Pause after a successful batch append, to stay under the store's rate limit.
    pub post_write_delay: Duration,
    /// Pause before each single-row append when the batch append failed.
    pub row_retry_delay: Duration,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            post_write_delay: Duration::from_secs(1),
            row_retry_delay: Duration::from_secs(1),
        }
    }
}

impl SyncSettings {
    pub fn without_delays() -> Self {
        Self {
            post_write_delay: Duration::ZERO,
            row_retry_delay: Duration::ZERO,
        }
    }
}

/// Failures that abort a run. Everything else is recorded in the [`RunReport`].
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("could not fetch listings: {0}")]
    Network(#[from] FetchError),
}

/// One incremental sync of a listing page into a store.
pub struct SyncEngine<'a> {
    fetcher: &'a dyn Fetcher,
    store: &'a dyn ListingStore,
    parser: ListingParser,
    settings: SyncSettings,
}

impl<'a> SyncEngine<'a> {
    pub fn new(fetcher: &'a dyn Fetcher, store: &'a dyn ListingStore, settings: SyncSettings) -> Self {
        Self {
            fetcher,
            store,
            parser: ListingParser::new(),
            settings,
        }
    }

    pub async fn run(&self, source_url: &str) -> Result<RunReport, SyncError> {
        let mut report = RunReport::new(source_url);

        let marker = self.stop_marker(&mut report).await;
        report.stop_marker = marker.listing().cloned();

        let output = self.fetcher.fetch(source_url).await?;
        let markup = decode_markup(&output.bytes, output.metadata.content_type.as_deref());
        if markup.had_replacements {
            jobsync_warn!("Page is not valid {}; invalid bytes replaced", markup.encoding);
            report.push_issue(
                IssueKind::Decode,
                format!("page is not valid {}; invalid bytes replaced", markup.encoding),
            );
        }
        let page = self.parser.parse(&markup.text, &marker);

        report.rows_seen = page.rows_seen;
        report.candidates = page.listings.len();
        report.stop = match (marker.is_absent(), page.reached_marker) {
            (true, _) => StopOutcome::NoMarker,
            (false, true) => StopOutcome::Reached,
            (false, false) => StopOutcome::NotFound,
        };
        if report.stop == StopOutcome::NotFound {
            jobsync_warn!("Stop marker not found on page; relying on duplicate filter");
        }
        for skipped in &page.skipped {
            report.push_issue(
                IssueKind::ParseRow,
                format!("row {}: {}", skipped.row, skipped.error),
            );
        }

        let history = self.history(&mut report).await;
        let selection = select_new_listings(page.listings, &history);
        report.suppressed = selection.suppressed.len();

        if selection.new.is_empty() {
            jobsync_info!("No new listings");
        } else {
            self.persist(selection.new, &mut report).await;
        }
        Ok(report)
    }

    async fn stop_marker(&self, report: &mut RunReport) -> StopMarker {
        match self.store.read_last_record().await {
            Ok(last) => StopMarker::from(last),
            Err(err) => {
                jobsync_warn!("Reading last record failed, scanning whole page: {}", err);
                report.push_issue(IssueKind::StoreRead, format!("last record: {err}"));
                StopMarker::absent()
            }
        }
    }

    async fn history(&self, report: &mut RunReport) -> History {
        let roles = self.store.read_column(Column::Role).await;
        let links = match roles {
            Ok(_) => self.store.read_column(Column::Link).await,
            Err(_) => Ok(Vec::new()),
        };
        match (roles, links) {
            (Ok(roles), Ok(links)) => History::from_columns(roles, links),
            (Err(err), _) | (_, Err(err)) => {
                jobsync_warn!("Reading history failed, assuming none: {}", err);
                report.push_issue(IssueKind::StoreRead, format!("history: {err}"));
                History::empty()
            }
        }
    }

    async fn persist(&self, rows: Vec<Listing>, report: &mut RunReport) {
        match self.store.append_rows(&rows).await {
            Ok(()) => {
                jobsync_info!("Appended {} new listings", rows.len());
                report.appended = rows;
                tokio::time::sleep(self.settings.post_write_delay).await;
            }
            Err(err) => {
                jobsync_warn!("Batch append failed, falling back to single rows: {}", err);
                report.push_issue(
                    IssueKind::StoreWrite,
                    format!("batch of {} rows: {err}", rows.len()),
                );
                report.used_row_fallback = true;
                for row in rows {
                    tokio::time::sleep(self.settings.row_retry_delay).await;
                    match self.store.append_rows(slice::from_ref(&row)).await {
                        Ok(()) => report.appended.push(row),
                        Err(err) => {
                            jobsync_warn!("Dropping {}: {}", row, err);
                            report.push_issue(IssueKind::StoreWrite, format!("{row}: {err}"));
                            report.dropped.push(row);
                        }
                    }
                }
            }
        }
    }
}
