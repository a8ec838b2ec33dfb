//! Google Sheets client authenticated with a service account.
//!
//! The spreadsheet is looked up by name through the Drive API and created
//! through the Sheets API if it does not exist. Its first worksheet stores the
//! transactions.

use std::time::Duration;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use time::OffsetDateTime;

use crate::{
    Error,
    config::{ServiceAccountKey, SheetConfig},
    sheet::{CellValue, SheetGateway, Worksheet, column_letter, ensure_header},
};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";
const SCOPES: &str =
    "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const SPREADSHEET_MIME_TYPE: &str = "application/vnd.google-apps.spreadsheet";
const TOKEN_LIFETIME_SECONDS: i64 = 3600;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Opens the configured Google spreadsheet.
///
/// Each call to [SheetGateway::acquire] loads the credentials and requests a
/// new access token; only the HTTP connection pool is shared between calls.
#[derive(Debug, Clone)]
pub struct GoogleSheetGateway {
    config: SheetConfig,
    client: Client,
}

impl GoogleSheetGateway {
    /// Create a gateway for the spreadsheet described by `config`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: SheetConfig) -> Result<Self, Error> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self { config, client })
    }

    async fn open(&self) -> Result<GoogleWorksheet, Error> {
        let key = self.config.credentials.load()?;
        let token = request_access_token(&self.client, &key).await?;

        let spreadsheet = match self.find_spreadsheet_id(&token).await? {
            Some(id) => self.get_spreadsheet(&token, &id).await?,
            None => {
                tracing::info!(
                    "Spreadsheet \"{}\" not found, creating it",
                    self.config.sheet_name
                );
                self.create_spreadsheet(&token).await?
            }
        };

        let properties = spreadsheet
            .sheets
            .into_iter()
            .next()
            .map(|sheet| sheet.properties)
            .ok_or_else(|| {
                Error::Sheet(format!(
                    "spreadsheet {} has no worksheets",
                    spreadsheet.spreadsheet_id
                ))
            })?;

        Ok(GoogleWorksheet {
            client: self.client.clone(),
            token,
            spreadsheet_id: spreadsheet.spreadsheet_id,
            sheet_id: properties.sheet_id,
            title: properties.title,
        })
    }

    async fn find_spreadsheet_id(&self, token: &str) -> Result<Option<String>, Error> {
        let query = format!(
            "name = '{}' and mimeType = '{SPREADSHEET_MIME_TYPE}' and trashed = false",
            escape_query_literal(&self.config.sheet_name)
        );

        let files: FileList = self
            .client
            .get(DRIVE_FILES_API)
            .bearer_auth(token)
            .query(&[("q", query.as_str()), ("fields", "files(id)"), ("pageSize", "1")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(files.files.into_iter().next().map(|file| file.id))
    }

    async fn get_spreadsheet(&self, token: &str, id: &str) -> Result<Spreadsheet, Error> {
        let url = api_url(SHEETS_API, &[id])?;

        Ok(self
            .client
            .get(url)
            .bearer_auth(token)
            .query(&[("fields", "spreadsheetId,sheets.properties(sheetId,title)")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    async fn create_spreadsheet(&self, token: &str) -> Result<Spreadsheet, Error> {
        Ok(self
            .client
            .post(SHEETS_API)
            .bearer_auth(token)
            .json(&json!({ "properties": { "title": self.config.sheet_name } }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }
}

#[async_trait]
impl SheetGateway for GoogleSheetGateway {
    async fn acquire(&self) -> Result<Box<dyn Worksheet>, Error> {
        let worksheet = self
            .open()
            .await
            .map_err(|error| Error::GatewayUnavailable(error.to_string()))?;

        ensure_header(&worksheet, &self.config.header)
            .await
            .map_err(|error| Error::GatewayUnavailable(error.to_string()))?;

        Ok(Box::new(worksheet))
    }
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Exchange a signed JWT assertion for an OAuth access token.
async fn request_access_token(client: &Client, key: &ServiceAccountKey) -> Result<String, Error> {
    let issued_at = OffsetDateTime::now_utc().unix_timestamp();
    let claims = Claims {
        iss: &key.client_email,
        scope: SCOPES,
        aud: &key.token_uri,
        iat: issued_at,
        exp: issued_at + TOKEN_LIFETIME_SECONDS,
    };

    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|error| Error::Credentials(format!("invalid private key: {error}")))?;
    let assertion = encode(&Header::new(Algorithm::RS256), &claims, &signing_key)
        .map_err(|error| Error::Credentials(format!("could not sign token request: {error}")))?;

    let response: TokenResponse = client
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(response.access_token)
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Spreadsheet {
    spreadsheet_id: String,
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// The first worksheet of an opened spreadsheet.
struct GoogleWorksheet {
    client: Client,
    token: String,
    spreadsheet_id: String,
    sheet_id: i64,
    title: String,
}

impl GoogleWorksheet {
    /// An A1 range on this worksheet, e.g. `'Sheet1'!A2`.
    fn range(&self, a1: &str) -> String {
        let title = self.title.replace('\'', "''");

        if a1.is_empty() {
            format!("'{title}'")
        } else {
            format!("'{title}'!{a1}")
        }
    }

    fn values_url(&self, range: &str) -> Result<Url, Error> {
        api_url(SHEETS_API, &[&self.spreadsheet_id, "values", range])
    }

    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>, Error> {
        let values: ValueRange = self
            .client
            .get(self.values_url(range)?)
            .bearer_auth(&self.token)
            .query(&[
                ("majorDimension", "ROWS"),
                ("valueRenderOption", "UNFORMATTED_VALUE"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(values
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn put_values(&self, range: &str, cells: Vec<CellValue>) -> Result<(), Error> {
        self.client
            .put(self.values_url(range)?)
            .bearer_auth(&self.token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "values": [cells] }))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    async fn batch_update(&self, request: Value) -> Result<(), Error> {
        let url = api_url(
            SHEETS_API,
            &[&format!("{}:batchUpdate", self.spreadsheet_id)],
        )?;

        self.client
            .post(url)
            .bearer_auth(&self.token)
            .json(&json!({ "requests": [request] }))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    fn row_span(&self, row: usize) -> Result<Value, Error> {
        let start = row
            .checked_sub(1)
            .ok_or_else(|| Error::Sheet(format!("invalid row {row}")))?;

        Ok(json!({
            "sheetId": self.sheet_id,
            "dimension": "ROWS",
            "startIndex": start,
            "endIndex": row,
        }))
    }
}

#[async_trait]
impl Worksheet for GoogleWorksheet {
    async fn all_values(&self) -> Result<Vec<Vec<String>>, Error> {
        self.get_values(&self.range("")).await
    }

    async fn row_values(&self, row: usize) -> Result<Vec<String>, Error> {
        let rows = self.get_values(&self.range(&format!("{row}:{row}"))).await?;

        Ok(rows.into_iter().next().unwrap_or_default())
    }

    async fn append_row(&self, cells: Vec<CellValue>) -> Result<(), Error> {
        let url = self.values_url(&format!("{}:append", self.range("A1")))?;

        self.client
            .post(url)
            .bearer_auth(&self.token)
            .query(&[
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&json!({ "values": [cells] }))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    async fn insert_row(&self, cells: Vec<CellValue>, row: usize) -> Result<(), Error> {
        self.batch_update(json!({
            "insertDimension": {
                "range": self.row_span(row)?,
                "inheritFromBefore": false,
            }
        }))
        .await?;

        self.put_values(&self.range(&format!("A{row}")), cells).await
    }

    async fn update_cell(&self, row: usize, col: usize, cell: CellValue) -> Result<(), Error> {
        let range = self.range(&format!("{}{row}", column_letter(col)));

        self.put_values(&range, vec![cell]).await
    }

    async fn delete_row(&self, row: usize) -> Result<(), Error> {
        self.batch_update(json!({
            "deleteDimension": { "range": self.row_span(row)? }
        }))
        .await
    }

    async fn find_row(
        &self,
        col: usize,
        value: &str,
        from_row: usize,
    ) -> Result<Option<usize>, Error> {
        let letter = column_letter(col);
        let column = self.get_values(&self.range(&format!("{letter}:{letter}"))).await?;

        Ok(column
            .iter()
            .enumerate()
            .skip(from_row.saturating_sub(1))
            .find(|(_, cells)| cells.first().is_some_and(|cell| cell == value))
            .map(|(index, _)| index + 1))
    }
}

/// Build an API URL from percent-encoded path segments.
fn api_url(base: &str, segments: &[&str]) -> Result<Url, Error> {
    let mut url = Url::parse(base).map_err(|error| Error::Sheet(error.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| Error::Sheet(format!("{base} cannot be a base URL")))?
        .extend(segments);

    Ok(url)
}

/// The text of a cell read with `UNFORMATTED_VALUE`.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        Value::Bool(true) => "TRUE".to_owned(),
        Value::Bool(false) => "FALSE".to_owned(),
        other => other.to_string(),
    }
}

/// Escape a string for use inside a single-quoted Drive query literal.
fn escape_query_literal(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "\\'")
}
