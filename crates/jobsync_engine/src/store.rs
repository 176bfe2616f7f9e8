use jobsync_core::Listing;

/// The two columns of the listing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Role,
    Link,
}

impl Column {
    /// One-based position in the table.
    pub fn index(self) -> usize {
        match self {
            Column::Role => 1,
            Column::Link => 2,
        }
    }

    /// Spreadsheet column letter.
    pub fn letter(self) -> char {
        match self {
            Column::Role => 'A',
            Column::Link => 'B',
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store not found: {0}")]
    NotFound(String),
    #[error("access denied: {0}")]
    Denied(String),
    #[error("store request failed with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("store transport error: {0}")]
    Transport(String),
    #[error("unexpected store response: {0}")]
    Malformed(String),
    #[error("auth error: {0}")]
    Auth(#[from] crate::AuthError),
    #[error("persist error: {0}")]
    Persist(#[from] crate::PersistError),
}

/// Append-only two-column table of previously accepted listings.
#[async_trait::async_trait]
pub trait ListingStore: Send + Sync {
    /// The last row, or `None` if the table is empty.
    async fn read_last_record(&self) -> Result<Option<Listing>, StoreError>;

    /// Every value in `column`, top to bottom.
    async fn read_column(&self, column: Column) -> Result<Vec<String>, StoreError>;

    /// Append `rows` in order as one operation.
    async fn append_rows(&self, rows: &[Listing]) -> Result<(), StoreError>;
}
