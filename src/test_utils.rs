#![allow(missing_docs)]

use axum::{body::Body, http::Response};
use rusqlite::Connection;
use serde_json::Value;

use crate::{
    db::initialize,
    transaction::{Transaction, TransactionType, create_transaction},
};

pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("could not create in-memory SQLite database");
    initialize(&connection).expect("could not initialize test DB");
    connection
}

#[track_caller]
pub(crate) fn must_create_transaction(
    connection: &Connection,
    transaction_type: TransactionType,
    category: &str,
    amount: f64,
) -> Transaction {
    create_transaction(
        Transaction::build(transaction_type, category, amount),
        connection,
    )
    .expect("could not create test transaction")
}

pub(crate) async fn parse_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("could not read response body");

    serde_json::from_slice(&body).expect("response body is not JSON")
}
