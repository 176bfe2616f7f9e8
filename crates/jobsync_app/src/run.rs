use anyhow::Context;
use jobsync_core::RunReport;
use jobsync_engine::{
    FileStore, GoogleEndpoints, ListingStore, ReqwestFetcher, ServiceAccountKey, SheetsConnection,
    SyncEngine,
};
use jobsync_logging::jobsync_info;

use crate::{AppConfig, StoreTarget};

/// Open the configured store. Any failure here is fatal for the run.
pub async fn open_store(config: &AppConfig) -> anyhow::Result<Box<dyn ListingStore>> {
    match &config.store {
        StoreTarget::Sheet { title } => {
            let key = ServiceAccountKey::load(&config.credentials_path)
                .context("loading service account credentials")?;
            let connection =
                SheetsConnection::authorize(&key, GoogleEndpoints::default(), config.store_timeout)
                    .await
                    .context("authorizing with Google")?;
            let store = connection
                .open_by_title(title)
                .await
                .with_context(|| format!("opening spreadsheet '{title}'"))?;
            Ok(Box::new(store))
        }
        StoreTarget::File { path } => {
            let store = FileStore::open(path)
                .with_context(|| format!("opening listing file {}", path.display()))?;
            Ok(Box::new(store))
        }
    }
}

/// One complete sync against the configured source and store.
pub async fn run_once(config: &AppConfig) -> anyhow::Result<RunReport> {
    let store = open_store(config).await?;
    let fetcher = ReqwestFetcher::new(config.fetch.clone());
    let engine = SyncEngine::new(&fetcher, store.as_ref(), config.sync.clone());
    let report = engine
        .run(&config.source_url)
        .await
        .context("sync run aborted")?;
    jobsync_info!(
        "Run finished: {} appended, {} dropped, {} issues",
        report.appended.len(),
        report.dropped.len(),
        report.issues.len()
    );
    Ok(report)
}
