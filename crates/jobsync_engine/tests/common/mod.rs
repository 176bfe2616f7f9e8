#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use jobsync_core::Listing;
use jobsync_engine::{
    Column, FailureKind, FetchError, FetchOutput, Fetcher, ListingStore, StoreError,
};

pub const SOURCE_URL: &str = "https://listings.example/internships";

pub fn init_logging() {
    jobsync_logging::initialize_for_tests();
}

/// Builds a listings table; each tuple is `(role, link)` and gets company/location filler.
pub fn table(rows: &[(&str, &str)]) -> String {
    let mut html = String::from(
        "<html><body><table><thead><tr><th>Company</th><th>Role</th><th>Location</th><th>Application</th></tr></thead><tbody>",
    );
    for (role, link) in rows {
        html.push_str(&row(role, link));
    }
    html.push_str("</tbody></table></body></html>");
    html
}

pub fn row(role: &str, link: &str) -> String {
    format!(
        "<tr><td>Acme</td><td> {role} </td><td>Remote</td><td><a href=\"{link}\">Apply</a></td></tr>"
    )
}

/// Serves one fixed page, or fails every time.
pub struct StaticFetcher {
    page: Result<Vec<u8>, FetchError>,
}

impl StaticFetcher {
    pub fn page(html: impl Into<String>) -> Self {
        Self::raw(html.into().into_bytes())
    }

    /// Serves `body` labelled as UTF-8 without checking it.
    pub fn raw(body: Vec<u8>) -> Self {
        Self { page: Ok(body) }
    }

    pub fn unreachable() -> Self {
        Self {
            page: Err(FetchError::new(FailureKind::Network, "connection refused")),
        }
    }
}

#[async_trait::async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchOutput, FetchError> {
        self.page
            .clone()
            .map(|body| FetchOutput::from_utf8_bytes(url, body))
    }
}

/// Failure switches for [`MemoryStore`].
#[derive(Default)]
pub struct Faults {
    pub last_record: bool,
    pub link_column: bool,
    /// Outcome of upcoming `append_rows` calls, consumed front to back. `true` fails the call.
    pub appends: VecDeque<bool>,
}

#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Listing>>,
    faults: Mutex<Faults>,
    append_calls: Mutex<Vec<usize>>,
}

impl MemoryStore {
    pub fn with_rows(rows: &[(&str, &str)]) -> Self {
        let store = Self::default();
        *store.rows.lock().unwrap() = rows
            .iter()
            .map(|(role, link)| Listing::new(*role, *link))
            .collect();
        store
    }

    pub fn set_faults(&self, faults: Faults) {
        *self.faults.lock().unwrap() = faults;
    }

    pub fn rows(&self) -> Vec<Listing> {
        self.rows.lock().unwrap().clone()
    }

    /// Batch size of each `append_rows` call, in call order.
    pub fn append_calls(&self) -> Vec<usize> {
        self.append_calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ListingStore for MemoryStore {
    async fn read_last_record(&self) -> Result<Option<Listing>, StoreError> {
        if self.faults.lock().unwrap().last_record {
            return Err(StoreError::Denied("credentials expired".into()));
        }
        Ok(self.rows.lock().unwrap().last().cloned())
    }

    async fn read_column(&self, column: Column) -> Result<Vec<String>, StoreError> {
        if column == Column::Link && self.faults.lock().unwrap().link_column {
            return Err(StoreError::Transport("connection reset".into()));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .map(|row| match column {
                Column::Role => row.role.clone(),
                Column::Link => row.link.clone(),
            })
            .collect())
    }

    async fn append_rows(&self, rows: &[Listing]) -> Result<(), StoreError> {
        self.append_calls.lock().unwrap().push(rows.len());
        let fail = self
            .faults
            .lock()
            .unwrap()
            .appends
            .pop_front()
            .unwrap_or(false);
        if fail {
            return Err(StoreError::Status {
                status: 429,
                message: "rate limited".into(),
            });
        }
        self.rows.lock().unwrap().extend_from_slice(rows);
        Ok(())
    }
}
