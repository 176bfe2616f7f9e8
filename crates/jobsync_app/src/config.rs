use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jobsync_engine::{FetchSettings, SyncSettings};
use jobsync_logging::{jobsync_info, jobsync_warn};
use serde::{Deserialize, Serialize};

/// Optional override file, looked up in the working directory.
pub const CONFIG_FILENAME: &str = "jobsync.ron";

pub const DEFAULT_SOURCE_URL: &str = "https://github.com/SimplifyJobs/Summer2025-Internships";
pub const DEFAULT_SPREADSHEET_TITLE: &str = "2025 Internships";
pub const DEFAULT_CREDENTIALS_PATH: &str = "credentials.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreTarget {
    /// First worksheet of the Google spreadsheet with this title.
    Sheet { title: String },
    /// Local RON table.
    File { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub source_url: String,
    pub store: StoreTarget,
    pub credentials_path: PathBuf,
    pub store_timeout: Duration,
    pub fetch: FetchSettings,
    pub sync: SyncSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            store: StoreTarget::Sheet {
                title: DEFAULT_SPREADSHEET_TITLE.to_string(),
            },
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            store_timeout: Duration::from_secs(30),
            fetch: FetchSettings::default(),
            sync: SyncSettings::default(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Read(#[from] io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
}

impl AppConfig {
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        ron::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Read `path` if it exists. Returns `Ok(None)` when there is no file.
    pub fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_ron(&content).map(Some),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Defaults overridden by `path`. A bad file is logged and ignored.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::read(path) {
            Ok(Some(config)) => {
                jobsync_info!("Loaded config from {:?}", path);
                config
            }
            Ok(None) => Self::default(),
            Err(err) => {
                jobsync_warn!("Ignoring config at {:?}: {}", path, err);
                Self::default()
            }
        }
    }
}
