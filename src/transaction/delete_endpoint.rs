use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::{
    Error,
    transaction::{TransactionState, core::delete_transaction},
};

/// A route handler for deleting a transaction.
pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<Value>, Error> {
    let worksheet = state.gateway.acquire().await?;

    delete_transaction(worksheet.as_ref(), &transaction_id).await?;
    tracing::debug!("Deleted transaction {transaction_id}");

    Ok(Json(json!({ "status": "deleted" })))
}
