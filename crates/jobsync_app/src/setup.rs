//! Pre-flight checks behind `jobsync_check`.

use std::fmt;
use std::path::Path;

use jobsync_engine::{
    AuthError, FileStore, GoogleEndpoints, ServiceAccountKey, SheetsConnection, StoreError,
};

use crate::{AppConfig, StoreTarget};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SetupReport {
    pub lines: Vec<String>,
    pub failed: bool,
}

impl SetupReport {
    fn pass(&mut self, line: impl Into<String>) {
        self.lines.push(format!("[ok]   {}", line.into()));
    }

    fn fail(&mut self, line: impl Into<String>) {
        self.failed = true;
        self.lines.push(format!("[fail] {}", line.into()));
    }

    fn note(&mut self, line: impl Into<String>) {
        self.lines.push(format!("       {}", line.into()));
    }

    pub fn passed(&self) -> bool {
        !self.failed
    }
}

impl fmt::Display for SetupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

/// Validate the service-account key file and summarize it.
pub fn check_credentials(path: &Path, report: &mut SetupReport) -> Option<ServiceAccountKey> {
    match ServiceAccountKey::load(path) {
        Ok(key) => {
            report.pass(format!("{} found and appears valid", path.display()));
            report.note(format!("Project ID: {}", key.project_id));
            report.note(format!("Client Email: {}", key.client_email));
            Some(key)
        }
        Err(AuthError::Read { .. }) => {
            report.fail(format!("{} not found", path.display()));
            report.note("Create a service account key in the Google Cloud console:");
            report.note("enable the Sheets and Drive APIs, add a JSON key to a service account,");
            report.note(format!("and save it as {}", path.display()));
            None
        }
        Err(err) => {
            report.fail(format!("{}: {err}", path.display()));
            None
        }
    }
}

/// List visible spreadsheets and try to open `title`.
pub async fn check_spreadsheet(connection: &SheetsConnection, title: &str, report: &mut SetupReport) {
    match connection.list_spreadsheets().await {
        Ok(files) if files.is_empty() => report.note("No spreadsheets are shared with this account"),
        Ok(files) => {
            report.note("Spreadsheets visible to this account:");
            for file in files {
                report.note(format!("  {}", file.name));
            }
        }
        Err(err) => {
            report.fail(format!("Listing spreadsheets failed: {err}"));
            return;
        }
    }

    match connection.open_by_title(title).await {
        Ok(store) => {
            report.pass(format!("Opened '{title}'"));
            report.note(format!("Sheet ID: {}", store.spreadsheet().id));
            report.note(format!("URL: {}", store.spreadsheet_url()));
        }
        Err(StoreError::NotFound(_)) => {
            report.fail(format!("Spreadsheet '{title}' not found"));
            report.note(format!("Create a Google Sheet named '{title}', share it with the"));
            report.note("service account email above and give it Editor permissions");
        }
        Err(err) => report.fail(format!("Opening '{title}' failed: {err}")),
    }
}

/// Every check for `config`, in order.
pub async fn run_checks(config: &AppConfig) -> SetupReport {
    let mut report = SetupReport::default();
    match &config.store {
        StoreTarget::File { path } => match FileStore::open(path) {
            Ok(_) => report.pass(format!("Listing file {} is usable", path.display())),
            Err(err) => report.fail(format!("Listing file {}: {err}", path.display())),
        },
        StoreTarget::Sheet { title } => {
            let Some(key) = check_credentials(&config.credentials_path, &mut report) else {
                return report;
            };
            match SheetsConnection::authorize(&key, GoogleEndpoints::default(), config.store_timeout)
                .await
            {
                Ok(connection) => {
                    report.pass("Authenticated with Google");
                    check_spreadsheet(&connection, title, &mut report).await;
                }
                Err(err) => report.fail(format!("Authentication failed: {err}")),
            }
        }
    }
    report
}
