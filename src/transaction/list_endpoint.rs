//! Defines the endpoints for listing transactions and summarising them.
use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, ApiResponse, Error, db,
    transaction::{request::FilterQuery, service},
};

/// The state needed to read transactions.
#[derive(Debug, Clone)]
pub struct ListTransactionsState {
    /// The database connection for reading transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ListTransactionsState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for listing transactions, newest first.
///
/// Supports the optional query parameters `type`, `category` and `limit`.
pub async fn list_transactions_endpoint(
    State(state): State<ListTransactionsState>,
    query: FilterQuery,
) -> Response {
    let result = query.into_filter().map_err(Error::from).and_then(|filter| {
        let connection = db::lock(&state.db_connection)?;
        service::list(&filter, &connection)
    });

    match result {
        Ok(transactions) => {
            let count = transactions.len();
            ApiResponse::success(transactions)
                .with_count(count)
                .into_response()
        }
        Err(error) => error.into_json_response("Failed to fetch transactions"),
    }
}

/// A route handler for the income, expense and balance totals of the
/// transactions matching the same query parameters as
/// [list_transactions_endpoint].
pub async fn get_summary_endpoint(
    State(state): State<ListTransactionsState>,
    query: FilterQuery,
) -> Response {
    let result = query.into_filter().map_err(Error::from).and_then(|filter| {
        let connection = db::lock(&state.db_connection)?;
        service::summary(&filter, &connection)
    });

    match result {
        Ok((summary, count)) => ApiResponse::success(summary)
            .with_count(count)
            .into_response(),
        Err(error) => error.into_json_response("Failed to summarize transactions"),
    }
}
