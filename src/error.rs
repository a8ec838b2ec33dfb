//! Defines the app level error type and its conversion to JSON error responses.
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The spreadsheet could not be reached, e.g. the credentials are missing,
    /// the access token request was refused or the spreadsheet could not be
    /// opened or created.
    ///
    /// The string describes the underlying cause and should only be logged on
    /// the server.
    #[error("could not connect to the spreadsheet: {0}")]
    GatewayUnavailable(String),

    /// The service account credentials could not be loaded or parsed.
    #[error("invalid service account credentials: {0}")]
    Credentials(String),

    /// A call to the spreadsheet failed after the worksheet was opened.
    #[error("spreadsheet request failed: {0}")]
    Sheet(String),

    /// The requested resource was not found.
    ///
    /// For the transaction endpoints, no row has an ID cell equal to the
    /// requested ID.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An export was requested but the worksheet only contains the header row.
    #[error("there are no transactions to export")]
    EmptyExport,

    /// The export workbook could not be written.
    #[error("could not write the export workbook: {0}")]
    Export(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),
}

impl From<rust_xlsxwriter::XlsxError> for Error {
    fn from(value: rust_xlsxwriter::XlsxError) -> Self {
        Error::Export(value.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::Sheet(value.to_string())
    }
}

impl Error {
    /// The status code of the response for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::EmptyExport => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The message shown to the client.
    ///
    /// Server errors get a generic message, the details are only logged.
    pub fn client_message(&self) -> &'static str {
        match self {
            Error::NotFound => "Not found",
            Error::EmptyExport => "No data to export",
            Error::GatewayUnavailable(_) | Error::Credentials(_) => {
                "Could not connect to Google Sheets"
            }
            _ => "An unexpected error occurred, check the server logs for more details.",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!("An unexpected error occurred: {self}");
        }

        (status, Json(json!({ "error": self.client_message() }))).into_response()
    }
}
