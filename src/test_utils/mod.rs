#![allow(missing_docs)]

pub(crate) mod http;

use std::sync::Arc;

use crate::{AppState, sheet::MemorySheetGateway, transaction::TransactionState};

pub(crate) use http::{assert_content_type, get_header, parse_body_bytes, parse_json_body};

pub(crate) const TEST_TIMEZONE: &str = "Etc/UTC";

/// The transaction endpoint state backed by `gateway`'s worksheet.
pub(crate) fn transaction_state(gateway: &MemorySheetGateway) -> TransactionState {
    TransactionState {
        gateway: Arc::new(gateway.clone()),
        local_timezone: TEST_TIMEZONE.to_owned(),
    }
}

/// The app state backed by `gateway`'s worksheet, serving static files from `static_dir`.
pub(crate) fn app_state(gateway: &MemorySheetGateway, static_dir: &std::path::Path) -> AppState {
    AppState::new(gateway.clone(), TEST_TIMEZONE, static_dir).expect("could not create test state")
}
