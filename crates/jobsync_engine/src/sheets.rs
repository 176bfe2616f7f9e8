//! Google Sheets adapter: the listing table is the first worksheet of a spreadsheet.

use std::time::Duration;

use jobsync_core::Listing;
use jobsync_logging::{jobsync_debug, jobsync_info};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::auth::{request_access_token, AccessToken, AuthError, ServiceAccountKey};
use crate::{Column, ListingStore, StoreError};

const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// Base URLs of the two Google APIs the adapter talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleEndpoints {
    pub sheets: String,
    pub drive: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            sheets: "https://sheets.googleapis.com/v4".to_string(),
            drive: "https://www.googleapis.com/drive/v3".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SpreadsheetFile {
    pub id: String,
    pub name: String,
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<SpreadsheetFile>,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// An authorized client for one run. Built once and handed to the store.
#[derive(Debug, Clone)]
pub struct SheetsConnection {
    client: reqwest::Client,
    token: AccessToken,
    endpoints: GoogleEndpoints,
}

impl SheetsConnection {
    pub async fn authorize(
        key: &ServiceAccountKey,
        endpoints: GoogleEndpoints,
        timeout: Duration,
    ) -> Result<Self, AuthError> {
        let client = build_client(timeout).map_err(|err| AuthError::Transport(err.to_string()))?;
        let token = request_access_token(&client, key).await?;
        Ok(Self {
            client,
            token,
            endpoints,
        })
    }

    /// Use a token obtained elsewhere.
    pub fn with_token(
        token: AccessToken,
        endpoints: GoogleEndpoints,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = build_client(timeout).map_err(|err| StoreError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            token,
            endpoints,
        })
    }

    /// Every spreadsheet shared with the authorized account.
    pub async fn list_spreadsheets(&self) -> Result<Vec<SpreadsheetFile>, StoreError> {
        self.find_spreadsheets(format!("mimeType='{SPREADSHEET_MIME}' and trashed=false"))
            .await
    }

    /// Open the first worksheet of the spreadsheet named `title`.
    pub async fn open_by_title(&self, title: &str) -> Result<SheetsStore, StoreError> {
        let query = format!(
            "mimeType='{SPREADSHEET_MIME}' and trashed=false and name='{}'",
            escape_query_literal(title)
        );
        let file = self
            .find_spreadsheets(query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("spreadsheet '{title}'")))?;

        let url = self.url(&self.endpoints.sheets, &["spreadsheets", file.id.as_str()])?;
        let meta: SpreadsheetMeta = self
            .send_json(
                self.client
                    .get(url)
                    .query(&[("fields", "sheets.properties.title")]),
            )
            .await?;
        let sheet_title = meta
            .sheets
            .into_iter()
            .next()
            .map(|sheet| sheet.properties.title)
            .ok_or_else(|| StoreError::Malformed(format!("spreadsheet '{title}' has no worksheets")))?;

        jobsync_info!("Opened spreadsheet '{}' ({}), worksheet '{}'", file.name, file.id, sheet_title);
        Ok(SheetsStore {
            connection: self.clone(),
            spreadsheet: file,
            sheet_title,
        })
    }

    async fn find_spreadsheets(&self, query: String) -> Result<Vec<SpreadsheetFile>, StoreError> {
        let url = self.url(&self.endpoints.drive, &["files"])?;
        let list: FileList = self
            .send_json(
                self.client
                    .get(url)
                    .query(&[("q", query.as_str()), ("fields", "files(id,name)")]),
            )
            .await?;
        Ok(list.files)
    }

    fn url(&self, base: &str, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = Url::parse(base).map_err(|err| StoreError::Malformed(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| StoreError::Malformed(format!("{base} cannot be a base url")))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, StoreError> {
        let response = request
            .bearer_auth(&self.token.token)
            .send()
            .await
            .map_err(|err| StoreError::Transport(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map(|parsed| parsed.error.message)
            .unwrap_or(body);
        Err(match status {
            StatusCode::NOT_FOUND => StoreError::NotFound(message),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Denied(message),
            other => StoreError::Status {
                status: other.as_u16(),
                message,
            },
        })
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, StoreError> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|err| StoreError::Malformed(err.to_string()))
    }
}

fn build_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}

fn escape_query_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// A1 range covering whole columns of one worksheet.
fn column_range(sheet_title: &str, first: Column, last: Column) -> String {
    format!(
        "'{}'!{}:{}",
        sheet_title.replace('\'', "''"),
        first.letter(),
        last.letter()
    )
}

#[derive(Debug, Clone)]
pub struct SheetsStore {
    connection: SheetsConnection,
    spreadsheet: SpreadsheetFile,
    sheet_title: String,
}

impl SheetsStore {
    pub fn spreadsheet(&self) -> &SpreadsheetFile {
        &self.spreadsheet
    }

    pub fn sheet_title(&self) -> &str {
        &self.sheet_title
    }

    pub fn spreadsheet_url(&self) -> String {
        format!("https://docs.google.com/spreadsheets/d/{}", self.spreadsheet.id)
    }

    async fn read_range(&self, range: &str, major_dimension: &str) -> Result<Vec<Vec<String>>, StoreError> {
        let conn = &self.connection;
        let url = conn.url(
            &conn.endpoints.sheets,
            &["spreadsheets", self.spreadsheet.id.as_str(), "values", range],
        )?;
        let values: ValueRange = conn
            .send_json(conn.client.get(url).query(&[("majorDimension", major_dimension)]))
            .await?;
        Ok(values.values)
    }
}

#[async_trait::async_trait]
impl ListingStore for SheetsStore {
    async fn read_last_record(&self) -> Result<Option<Listing>, StoreError> {
        let last_row = self.read_column(Column::Role).await?.len();
        if last_row == 0 {
            return Ok(None);
        }
        let range = format!(
            "'{}'!{}{last_row}:{}{last_row}",
            self.sheet_title.replace('\'', "''"),
            Column::Role.letter(),
            Column::Link.letter()
        );
        let mut cells = self
            .read_range(&range, "ROWS")
            .await?
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter();
        let role = cells.next().unwrap_or_default();
        let link = cells.next().unwrap_or_default();
        Ok(Some(Listing::new(role, link)))
    }

    async fn read_column(&self, column: Column) -> Result<Vec<String>, StoreError> {
        let range = column_range(&self.sheet_title, column, column);
        let values = self.read_range(&range, "COLUMNS").await?;
        let column_values = values.into_iter().next().unwrap_or_default();
        jobsync_debug!("Read {} values from column {}", column_values.len(), column.letter());
        Ok(column_values)
    }

    async fn append_rows(&self, rows: &[Listing]) -> Result<(), StoreError> {
        let conn = &self.connection;
        let range = column_range(&self.sheet_title, Column::Role, Column::Link);
        let target = format!("{range}:append");
        let url = conn.url(
            &conn.endpoints.sheets,
            &["spreadsheets", self.spreadsheet.id.as_str(), "values", target.as_str()],
        )?;
        let body = json!({
            "values": rows
                .iter()
                .map(|row| [row.role.as_str(), row.link.as_str()])
                .collect::<Vec<_>>(),
        });
        conn.send(
            conn.client
                .post(url)
                .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
                .json(&body),
        )
        .await?;
        jobsync_info!("Appended {} rows to '{}'", rows.len(), self.spreadsheet.name);
        Ok(())
    }
}
