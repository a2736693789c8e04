//! The transaction operations exposed over HTTP.
//!
//! Each operation validates its input before touching the database and then
//! makes a single call to the database functions in [super::core].

use rusqlite::Connection;

use crate::{
    Error,
    database_id::TransactionId,
    transaction::{
        Summary, Transaction, TransactionFilter,
        core::{create_transaction, delete_transaction, list_transactions, update_transaction},
        request::TransactionPayload,
        summarize,
    },
};

/// Get the transactions matching `filter`, newest first.
///
/// # Errors
/// Returns [Error::SqlError] if the database query fails.
pub fn list(filter: &TransactionFilter, connection: &Connection) -> Result<Vec<Transaction>, Error> {
    list_transactions(filter, connection)
}

/// Validate `payload` and store it as a new transaction.
///
/// # Errors
/// Returns an [Error::Validation] if the payload is invalid, in which case the
/// database is not touched, or an [Error::SqlError] if the insert fails.
pub fn create(payload: TransactionPayload, connection: &Connection) -> Result<Transaction, Error> {
    let builder = payload.into_builder()?;

    create_transaction(builder, connection)
}

/// Validate `payload` and apply it to the transaction with `id`.
///
/// # Errors
/// Returns an [Error::Validation] if the payload is invalid, an
/// [Error::NotFound] if `id` does not exist, or an [Error::SqlError] if the
/// update fails.
pub fn update(
    id: TransactionId,
    payload: TransactionPayload,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let patch = payload.into_patch()?;

    update_transaction(id, patch, connection)
}

/// Permanently remove the transaction with `id`.
///
/// # Errors
/// Returns an [Error::NotFound] if `id` does not exist or an
/// [Error::SqlError] if the delete fails.
pub fn delete(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    delete_transaction(id, connection)
}

/// Total up the transactions matching `filter`.
///
/// Also returns how many transactions went into the totals.
///
/// # Errors
/// Returns [Error::SqlError] if the database query fails.
pub fn summary(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<(Summary, usize), Error> {
    let transactions = list_transactions(filter, connection)?;

    Ok((summarize(&transactions), transactions.len()))
}
