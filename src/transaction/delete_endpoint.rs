//! Defines the endpoint for deleting a transaction.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, ApiResponse, Error, db,
    transaction::{request::IdQuery, service},
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for deleting the transaction given by the `id` query parameter.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    query: IdQuery,
) -> Response {
    let result = query.transaction_id().map_err(Error::from).and_then(|id| {
        let connection = db::lock(&state.db_connection)?;
        service::delete(id, &connection)
    });

    match result {
        Ok(()) => ApiResponse::acknowledge("Transaction deleted successfully").into_response(),
        Err(error) => error.into_json_response("Failed to delete transaction"),
    }
}
