//! A personal finance tracker for recording income and expenses.
//!
//! This library provides a JSON REST API for creating, listing, editing and
//! deleting transactions, and for summarising them into income, expense and
//! balance totals. Transactions are stored in a SQLite database.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use tokio::signal;

mod api_response;
mod app_state;
mod database_id;
mod db;
mod endpoints;
mod logging;
mod not_found;
mod routing;
mod transaction;

#[cfg(test)]
mod test_utils;

pub use api_response::ApiResponse;
pub use app_state::AppState;
pub use database_id::{DatabaseId, TransactionId};
pub use db::{close as close_db, initialize as initialize_db};
pub use logging::{LOG_BODY_LENGTH_LIMIT, REQUEST_BODY_LIMIT, logging_middleware};
pub use routing::build_router;
pub use transaction::{
    Summary, Transaction, TransactionBuilder, TransactionFilter, TransactionPatch,
    TransactionType, create_transaction, summarize,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`. If a signal handler cannot be
/// installed the error is logged and the server is shut down immediately.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("Could not install the Ctrl+C handler: {error}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => tracing::error!("Could not install the terminate handler: {error}"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
        },
    }

    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}

/// Reasons why a request's input was rejected before reaching the database.
///
/// The display text of each variant is shown to the client as is.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more of `type`, `category` and `amount` was missing or empty
    /// when creating a transaction.
    #[error("Missing required fields: type, category, and amount are required")]
    MissingRequiredFields,

    /// The transaction type was not one of "income" or "expense".
    #[error("Invalid type. Must be either \"income\" or \"expense\"")]
    InvalidType,

    /// The amount was not a number, or was zero or negative.
    #[error("Amount must be a positive number")]
    InvalidAmount,

    /// The category was given as something other than a string.
    #[error("Category must be a string")]
    CategoryNotString,

    /// The category in an update was empty or not a string.
    #[error("Category must be a non-empty string")]
    EmptyCategory,

    /// The description was given as something other than a string or null.
    #[error("Description must be a string or null")]
    InvalidDescription,

    /// The `id` query parameter was not provided.
    #[error("Transaction ID is required")]
    MissingId,

    /// The `id` query parameter could not be parsed as an integer.
    #[error("Transaction ID must be an integer")]
    InvalidId,

    /// The `limit` query parameter could not be parsed as a non-negative integer.
    #[error("Limit must be a non-negative integer")]
    InvalidLimit,

    /// The request body could not be parsed as a JSON object.
    #[error("Request body must be valid JSON")]
    InvalidJson,

    /// The query string could not be decoded.
    #[error("Query string is malformed")]
    InvalidQuery,
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The client sent invalid input. Always detected before touching the database.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The requested transaction was not found.
    ///
    /// Internally, this error may occur when a query returns no rows or when
    /// an update or delete affects zero rows.
    #[error("the requested transaction could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// The database connection could not be closed because it is still shared.
    #[error("the database connection is still in use")]
    DatabaseInUse,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl Error {
    /// Convert the error into a JSON error response.
    ///
    /// Validation errors become a 400 and missing transactions a 404. Any
    /// other error is logged and becomes a 500 whose body only contains
    /// `failure_message`, so internal details are never sent to the client.
    pub fn into_json_response(self, failure_message: &str) -> Response {
        match self {
            Error::Validation(error) => {
                ApiResponse::error(error.to_string()).into_response_with(StatusCode::BAD_REQUEST)
            }
            Error::NotFound => {
                ApiResponse::error("Transaction not found").into_response_with(StatusCode::NOT_FOUND)
            }
            error => {
                tracing::error!("{failure_message}: {error}");
                ApiResponse::error(failure_message)
                    .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        self.into_json_response("Something went wrong")
    }
}
