//! The API endpoints URIs.

/// The root route which serves the single page app.
pub const ROOT: &str = "/";
/// The service worker script, which must be served from the root scope.
pub const SERVICE_WORKER: &str = "/service-worker.js";
/// The route for static files.
pub const STATIC: &str = "/static";
/// The health check route.
pub const HEALTH: &str = "/health";
/// The route to access transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// The route to access a single transaction.
pub const TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to download all transactions as an Excel workbook.
pub const EXPORT: &str = "/api/export";
