//! The health check used by the hosting platform.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    AppState,
    timezone::{format_timestamp, now_local},
};

/// The body of a health check response.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthStatus {
    /// Always "healthy" while the server is accepting requests.
    pub status: String,
    /// The server's local time, `YYYY-MM-DD HH:MM:SS`.
    pub timestamp: String,
}

/// Responds with 200 OK and the current time.
///
/// The worksheet is not checked, so this stays fast and always succeeds.
pub async fn get_health(State(state): State<AppState>) -> Json<HealthStatus> {
    let now = now_local(&state.local_timezone).unwrap_or_else(|_| OffsetDateTime::now_utc());

    Json(HealthStatus {
        status: "healthy".to_owned(),
        timestamp: format_timestamp(now),
    })
}
