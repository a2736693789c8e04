//! Defines the endpoint for editing an existing transaction.
use std::sync::{Arc, Mutex};

use axum::{
    body::Bytes,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;

use crate::{
    AppState, ApiResponse, Error, db,
    transaction::{
        Transaction,
        request::{IdQuery, parse_payload},
        service,
    },
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The database connection for managing transactions.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// A route handler for partially updating the transaction given by the `id`
/// query parameter.
///
/// Only the keys present in the JSON body are changed. Responds with the full
/// updated transaction on success.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    query: IdQuery,
    body: Bytes,
) -> Response {
    match edit_from_body(&state, &query, &body) {
        Ok(transaction) => ApiResponse::success(transaction)
            .with_message("Transaction updated successfully")
            .into_response(),
        Err(error) => error.into_json_response("Failed to update transaction"),
    }
}

fn edit_from_body(
    state: &EditTransactionState,
    query: &IdQuery,
    body: &[u8],
) -> Result<Transaction, Error> {
    let transaction_id = query.transaction_id()?;
    let payload = parse_payload(body)?;
    let connection = db::lock(&state.db_connection)?;

    service::update(transaction_id, payload, &connection)
}

#[cfg(test)]
mod test {
    use std::sync::{Arc, Mutex};

    use axum::{
        body::Bytes,
        extract::State,
        http::StatusCode,
    };
    use serde_json::{Value, json};

    use crate::{
        test_utils::{get_test_connection, must_create_transaction, parse_json},
        transaction::{
            Transaction, TransactionType,
            core::get_transaction,
            edit_endpoint::{EditTransactionState, edit_transaction_endpoint},
            request::IdQuery,
        },
    };

    fn get_test_state_with_transaction() -> (EditTransactionState, Transaction) {
        let conn = get_test_connection();
        let transaction = must_create_transaction(&conn, TransactionType::Expense, "Food", 10.0);

        (
            EditTransactionState {
                db_connection: Arc::new(Mutex::new(conn)),
            },
            transaction,
        )
    }

    fn id_query(id: i64) -> IdQuery {
        IdQuery {
            id: Some(id.to_string()),
        }
    }

    fn body(value: Value) -> Bytes {
        Bytes::from(value.to_string())
    }

    #[tokio::test]
    async fn can_update_transaction() {
        let (state, original) = get_test_state_with_transaction();

        let response = edit_transaction_endpoint(
            State(state.clone()),
            id_query(original.id),
            body(json!({"amount": 200, "description": "Dinner"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let got = parse_json(response).await;
        assert_eq!(got["message"], json!("Transaction updated successfully"));
        assert_eq!(got["data"]["amount"], json!(200.0));

        let stored = get_transaction(
            original.id,
            &state.db_connection.lock().expect("could not acquire lock"),
        )
        .expect("could not get test transaction");
        assert_eq!(
            stored,
            Transaction {
                amount: 200.0,
                description: Some("Dinner".to_owned()),
                ..original
            }
        );
    }

    #[tokio::test]
    async fn missing_transaction_is_not_found() {
        let (state, _) = get_test_state_with_transaction();

        let response =
            edit_transaction_endpoint(State(state), id_query(999_999), body(json!({"amount": 100})))
                .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            parse_json(response).await,
            json!({"success": false, "error": "Transaction not found"})
        );
    }

    #[tokio::test]
    async fn missing_id_is_bad_request() {
        let (state, _) = get_test_state_with_transaction();

        let response = edit_transaction_endpoint(
            State(state),
            IdQuery { id: None },
            body(json!({"amount": 100})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let got = parse_json(response).await;
        assert_eq!(got["error"], json!("Transaction ID is required"));
    }

    #[tokio::test]
    async fn invalid_amount_is_bad_request() {
        let (state, original) = get_test_state_with_transaction();

        let response = edit_transaction_endpoint(
            State(state),
            id_query(original.id),
            body(json!({"amount": "lots"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let got = parse_json(response).await;
        assert_eq!(got["error"], json!("Amount must be a positive number"));
    }
}
