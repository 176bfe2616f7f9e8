use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use jobsync_core::Listing;
use jobsync_logging::jobsync_info;
use serde::{Deserialize, Serialize};

use crate::persist::write_atomically;
use crate::{Column, ListingStore, StoreError};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PersistedTable {
    rows: Vec<Listing>,
}

/// A listing table kept in a local RON file.
///
/// A missing file reads as an empty table; the file is created on first append.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self { path: path.into() };
        // Surface a corrupt file at open time, where failure is fatal.
        store.load()?;
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<PersistedTable, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(PersistedTable::default());
            }
            Err(err) => {
                return Err(StoreError::Transport(format!(
                    "{}: {err}",
                    self.path.display()
                )))
            }
        };
        ron::from_str(&content)
            .map_err(|err| StoreError::Malformed(format!("{}: {err}", self.path.display())))
    }

    fn save(&self, table: &PersistedTable) -> Result<(), StoreError> {
        let pretty = ron::ser::PrettyConfig::new();
        let content = ron::ser::to_string_pretty(table, pretty)
            .map_err(|err| StoreError::Malformed(err.to_string()))?;
        write_atomically(&self.path, &content)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl ListingStore for FileStore {
    async fn read_last_record(&self) -> Result<Option<Listing>, StoreError> {
        Ok(self.load()?.rows.pop())
    }

    async fn read_column(&self, column: Column) -> Result<Vec<String>, StoreError> {
        let rows = self.load()?.rows;
        Ok(rows
            .into_iter()
            .map(|row| match column {
                Column::Role => row.role,
                Column::Link => row.link,
            })
            .collect())
    }

    async fn append_rows(&self, rows: &[Listing]) -> Result<(), StoreError> {
        let mut table = self.load()?;
        table.rows.extend_from_slice(rows);
        self.save(&table)?;
        jobsync_info!("Appended {} rows to {:?}", rows.len(), self.path);
        Ok(())
    }
}
