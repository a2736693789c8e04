//! Defines the endpoint for creating a new transaction.
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::{FromRef, State},
    http::StatusCode,
    response::Response,
};
use rusqlite::Connection;

use crate::{
    AppState, ApiResponse, Error, db,
    transaction::{Transaction, request::parse_payload, service},
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for creating a new transaction from a JSON body.
///
/// The body is read as raw bytes so that a missing or wrong content type, or
/// malformed JSON, is reported in the same JSON envelope as other errors.
/// Responds with 201 Created and the stored transaction on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    body: Bytes,
) -> Response {
    match create_from_body(&state, &body) {
        Ok(transaction) => ApiResponse::success(transaction)
            .with_message("Transaction created successfully")
            .into_response_with(StatusCode::CREATED),
        Err(error) => error.into_json_response("Failed to create transaction"),
    }
}

fn create_from_body(state: &CreateTransactionState, body: &[u8]) -> Result<Transaction, Error> {
    let payload = parse_payload(body)?;
    let connection = db::lock(&state.db_connection)?;

    service::create(payload, &connection)
}
