use std::sync::Arc;

use axum::extract::FromRef;

use crate::{AppState, sheet::SheetGateway};

/// The state needed by the transaction endpoints.
#[derive(Clone)]
pub struct TransactionState {
    /// Opens the worksheet that stores the transactions.
    pub gateway: Arc<dyn SheetGateway>,

    /// The canonical timezone used to timestamp new transactions.
    pub local_timezone: String,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            gateway: state.gateway.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}
