use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Map, Value};

use crate::{
    Error,
    transaction::{TransactionState, core::get_transaction},
};

/// A route handler that responds with a single transaction keyed by the worksheet's header.
pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<Map<String, Value>>, Error> {
    let worksheet = state.gateway.acquire().await?;

    get_transaction(worksheet.as_ref(), &transaction_id)
        .await
        .map(Json)
}
