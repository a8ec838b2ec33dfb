//! Configuration for the spreadsheet gateway and the service account credentials.

use std::{env, fs, path::PathBuf};

use serde::Deserialize;

use crate::Error;

/// The name of the spreadsheet used when none is configured.
pub const DEFAULT_SHEET_NAME: &str = "Financial Tracker";

/// The environment variable checked for a service account JSON blob when none is configured.
pub const DEFAULT_CREDENTIALS_ENV: &str = "GOOGLE_CREDENTIALS";

/// The credential file used when the environment variable is not set.
pub const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";

/// The column names of the worksheet, in order.
pub const HEADER: [&str; 7] = ["id", "date", "type", "detail", "price", "qty", "total_price"];

/// Everything the gateway needs to open the worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetConfig {
    /// The title of the spreadsheet to open, or create if it does not exist.
    pub sheet_name: String,

    /// The expected first row of the worksheet.
    pub header: Vec<String>,

    /// Where to find the service account key.
    pub credentials: CredentialSource,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_owned(),
            header: HEADER.iter().map(|column| column.to_string()).collect(),
            credentials: CredentialSource::default(),
        }
    }
}

/// Service account credentials are read from an environment variable holding
/// the JSON key, falling back to a JSON key file.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialSource {
    /// The name of the environment variable that may hold the JSON key.
    pub env_var: String,

    /// The path of the JSON key file.
    pub file: PathBuf,
}

impl Default for CredentialSource {
    fn default() -> Self {
        Self {
            env_var: DEFAULT_CREDENTIALS_ENV.to_owned(),
            file: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
        }
    }
}

impl CredentialSource {
    /// Load the service account key.
    ///
    /// # Errors
    /// Returns [Error::Credentials] if neither the environment variable nor
    /// the file hold a valid service account key.
    pub fn load(&self) -> Result<ServiceAccountKey, Error> {
        self.load_with(|name| env::var(name).ok())
    }

    /// Load the service account key, looking up environment variables with `get_var`.
    ///
    /// # Errors
    /// Returns [Error::Credentials] if neither the environment variable nor
    /// the file hold a valid service account key.
    pub fn load_with<F>(&self, get_var: F) -> Result<ServiceAccountKey, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        match get_var(&self.env_var) {
            Some(json) if !json.trim().is_empty() => ServiceAccountKey::from_json(&json),
            _ => {
                let json = fs::read_to_string(&self.file).map_err(|error| {
                    Error::Credentials(format!(
                        "${} is not set and {} could not be read: {error}",
                        self.env_var,
                        self.file.display()
                    ))
                })?;

                ServiceAccountKey::from_json(&json)
            }
        }
    }
}

/// The subset of a Google service account key used to request access tokens.
#[derive(Clone, Deserialize, PartialEq)]
pub struct ServiceAccountKey {
    /// The service account's email address, used as the JWT issuer.
    pub client_email: String,

    /// The PEM encoded RSA private key.
    pub private_key: String,

    /// The OAuth token endpoint.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_owned()
}

impl ServiceAccountKey {
    /// Parse a service account key from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        serde_json::from_str(json).map_err(|error| Error::Credentials(error.to_string()))
    }
}

// Keep the private key out of the logs.
impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"********")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}
