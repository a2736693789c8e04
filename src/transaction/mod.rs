//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and `TransactionBuilder` for creating transactions
//! - Database functions for storing, querying, and managing transactions
//! - Validation of client requests and the operations built on top of it
//! - Route handlers for the JSON API

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod list_endpoint;
mod request;
mod service;
mod summary;

pub use core::{
    Transaction, TransactionBuilder, TransactionFilter, TransactionPatch, TransactionType,
    create_transaction, create_transaction_table,
};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use list_endpoint::{get_summary_endpoint, list_transactions_endpoint};
pub use summary::{Summary, summarize};
