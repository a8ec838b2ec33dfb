//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the `TransactionForm` clients send
//! - Functions for reading and writing transaction rows of the worksheet
//! - The JSON route handlers for the transaction API

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod get_endpoint;
mod list_endpoint;
mod state;

pub use core::{
    Transaction, TransactionForm, TransactionList, TransactionType, create_transaction,
    delete_transaction, get_transaction, list_transactions, parse_amount, update_transaction,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use get_endpoint::get_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use state::TransactionState;
