//! Implements a struct that holds the state of the REST server.

use std::{path::PathBuf, sync::Arc};

use crate::{Error, sheet::SheetGateway, timezone::get_local_offset};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState {
    /// Opens the worksheet that stores the transactions.
    pub gateway: Arc<dyn SheetGateway>,

    /// The local timezone as a canonical timezone name, e.g. "Asia/Jakarta".
    pub local_timezone: String,

    /// The directory holding `index.html`, `service-worker.js` and the other static files.
    pub static_dir: PathBuf,
}

impl AppState {
    /// Create a new [AppState].
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Asia/Jakarta".
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezone] if `local_timezone` is not a known timezone.
    pub fn new(
        gateway: impl SheetGateway + 'static,
        local_timezone: &str,
        static_dir: impl Into<PathBuf>,
    ) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezone(local_timezone.to_owned()));
        }

        Ok(Self {
            gateway: Arc::new(gateway),
            local_timezone: local_timezone.to_owned(),
            static_dir: static_dir.into(),
        })
    }
}
