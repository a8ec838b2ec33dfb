use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    Error,
    transaction::{
        TransactionState,
        core::{TransactionList, list_transactions},
    },
};

/// A route handler that responds with every transaction, newest first, and the balance.
///
/// On failure the response still has an empty `transactions` list so the
/// front end can render it.
pub async fn list_transactions_endpoint(State(state): State<TransactionState>) -> Response {
    match load_transactions(&state).await {
        Ok(list) => Json(list).into_response(),
        Err(error) => {
            tracing::error!("Could not list transactions: {error}");
            (
                error.status_code(),
                Json(json!({ "transactions": [], "error": error.client_message() })),
            )
                .into_response()
        }
    }
}

async fn load_transactions(state: &TransactionState) -> Result<TransactionList, Error> {
    let worksheet = state.gateway.acquire().await?;

    list_transactions(worksheet.as_ref()).await
}
