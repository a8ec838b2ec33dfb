use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    Error,
    timezone::{format_timestamp, now_local},
    transaction::{
        TransactionState,
        core::{TransactionForm, create_transaction},
    },
};

/// A route handler for creating a new transaction, responds with 201 Created.
///
/// The `total_price` is stored as sent, it is not checked against `price * qty`.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Json(form): Json<TransactionForm>,
) -> Result<Response, Error> {
    let worksheet = state.gateway.acquire().await?;
    let date = format_timestamp(now_local(&state.local_timezone)?);

    let id = create_transaction(worksheet.as_ref(), &form, &date).await?;
    tracing::debug!("Created transaction {id}");

    Ok((StatusCode::CREATED, Json(json!({ "status": "success" }))).into_response())
}
