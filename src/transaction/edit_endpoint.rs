use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::{
    Error,
    transaction::{
        TransactionState,
        core::{TransactionForm, update_transaction},
    },
};

/// A route handler for editing a transaction's type, detail and amounts.
///
/// The ID and date of the transaction are never changed. The cells are
/// written one at a time, so a failure part way through leaves the earlier
/// cells updated.
pub async fn edit_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<String>,
    Json(form): Json<TransactionForm>,
) -> Result<Json<Value>, Error> {
    let worksheet = state.gateway.acquire().await?;

    update_transaction(worksheet.as_ref(), &transaction_id, &form).await?;

    Ok(Json(json!({ "status": "updated" })))
}
