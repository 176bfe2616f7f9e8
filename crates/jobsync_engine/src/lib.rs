//! Jobsync engine: fetching, parsing, stores and the incremental sync run.
mod auth;
mod decode;
mod fetch;
mod file_store;
mod parse;
mod persist;
mod sheets;
mod store;
mod sync;
mod types;

pub use auth::{
    request_access_token, AccessToken, AuthError, ServiceAccountKey, REQUIRED_KEY_FIELDS, SCOPES,
};
pub use decode::{decode_markup, DecodedMarkup};
pub use fetch::{FetchSettings, Fetcher, ReqwestFetcher, DEFAULT_MAX_PAGE_BYTES};
pub use file_store::FileStore;
pub use parse::{ListingParser, ParseRowError, ParsedPage, SkippedRow};
pub use persist::{ensure_parent_dir, write_atomically, PersistError};
pub use sheets::{GoogleEndpoints, SheetsConnection, SheetsStore, SpreadsheetFile};
pub use store::{Column, ListingStore, StoreError};
pub use sync::{SyncEngine, SyncError, SyncSettings};
pub use types::{FailureKind, FetchError, FetchMetadata, FetchOutput};
