//! Defines the core data models and database queries for transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, params_from_iter,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Value, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, ValidationError, database_id::TransactionId};

// ============================================================================
// MODELS
// ============================================================================

/// Whether money was earned or spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money earned, e.g. a salary payment.
    Income,
    /// Money spent, e.g. groceries.
    Expense,
}

impl TransactionType {
    /// The name used for the type in JSON and in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionType::Income),
            "expense" => Ok(TransactionType::Expense),
            _ => Err(ValidationError::InvalidType),
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// Whether the money was earned or spent.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// A free text label such as "Salary" or "Groceries".
    pub category: String,
    /// The amount of money spent or earned. Always greater than zero.
    pub amount: f64,
    /// An optional note about what the transaction was for.
    pub description: Option<String>,
    /// When the transaction was recorded, in UTC.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(
        transaction_type: TransactionType,
        category: &str,
        amount: f64,
    ) -> TransactionBuilder {
        TransactionBuilder {
            transaction_type,
            category: category.to_owned(),
            amount,
            description: None,
        }
    }
}

/// A builder for creating [Transaction] instances.
///
/// The builder does not validate its fields. Request payloads are validated
/// by the service layer before a builder is made, and the database rejects
/// non-positive amounts and empty categories with `CHECK` constraints.
///
/// # Examples
///
/// ```ignore
/// use crate::transaction::{Transaction, TransactionType};
///
/// let builder = Transaction::build(TransactionType::Expense, "Groceries", 45.99)
///     .description(Some("Weekly shop"));
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// Whether the money was earned or spent.
    pub transaction_type: TransactionType,
    /// A non-empty free text label.
    pub category: String,
    /// The amount of money, strictly greater than zero.
    pub amount: f64,
    /// An optional note, `None` is stored as NULL.
    pub description: Option<String>,
}

impl TransactionBuilder {
    /// Set the description for the transaction.
    pub fn description(mut self, description: Option<&str>) -> Self {
        self.description = description.map(str::to_owned);
        self
    }
}

/// The fields to change on an existing transaction.
///
/// `None` means "leave this field alone". For `description`, `Some(None)`
/// clears the description and `Some(Some(text))` replaces it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionPatch {
    /// The new transaction type.
    pub transaction_type: Option<TransactionType>,
    /// The new category.
    pub category: Option<String>,
    /// The new amount.
    pub amount: Option<f64>,
    /// The new description, possibly NULL.
    pub description: Option<Option<String>>,
}

impl TransactionPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.transaction_type.is_none()
            && self.category.is_none()
            && self.amount.is_none()
            && self.description.is_none()
    }
}

/// Criteria for narrowing down a list of transactions.
///
/// The default filter matches every transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    /// Only include transactions of this type.
    pub transaction_type: Option<TransactionType>,
    /// Only include transactions with exactly this category.
    pub category: Option<String>,
    /// Return at most this many transactions.
    pub limit: Option<u64>,
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

const TRANSACTION_COLUMNS: &str = "id, type, category, amount, description, created_at";

/// Create a new transaction in the database from a builder.
///
/// The ID and creation time are assigned here.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error,
/// including a violated `CHECK` constraint.
pub fn create_transaction(
    builder: TransactionBuilder,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" (type, category, amount, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {TRANSACTION_COLUMNS}"
        ))?
        .query_row(
            (
                builder.transaction_type,
                builder.category,
                builder.amount,
                builder.description,
                OffsetDateTime::now_utc(),
            ),
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Get the transactions matching `filter`, newest first.
///
/// Transactions created at the same instant are ordered by descending ID so
/// that repeated queries return rows in the same order.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or a row cannot be mapped.
pub fn list_transactions(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut conditions = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(transaction_type) = filter.transaction_type {
        conditions.push("type = ?");
        values.push(Value::Text(transaction_type.as_str().to_owned()));
    }

    if let Some(category) = &filter.category {
        conditions.push("category = ?");
        values.push(Value::Text(category.clone()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let limit_clause = match filter.limit {
        Some(limit) => {
            // SQLite integers are signed, anything above i64::MAX means no limit.
            values.push(Value::Integer(i64::try_from(limit).unwrap_or(i64::MAX)));
            "LIMIT ?"
        }
        None => "",
    };

    let query = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM \"transaction\" {where_clause} \
        ORDER BY created_at DESC, id DESC {limit_clause}"
    );

    connection
        .prepare(&query)?
        .query_map(params_from_iter(values), map_transaction_row)?
        .map(|transaction_result| transaction_result.map_err(Error::from))
        .collect()
}

/// Apply `patch` to the transaction with `id` and return the updated row.
///
/// Only the fields set in `patch` are written. An empty patch writes nothing
/// and returns the transaction as it is.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    patch: TransactionPatch,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if patch.is_empty() {
        return get_transaction(id, connection);
    }

    let mut assignments = Vec::new();
    let mut values: Vec<Value> = Vec::new();

    if let Some(transaction_type) = patch.transaction_type {
        assignments.push("type = ?");
        values.push(Value::Text(transaction_type.as_str().to_owned()));
    }

    if let Some(category) = patch.category {
        assignments.push("category = ?");
        values.push(Value::Text(category));
    }

    if let Some(amount) = patch.amount {
        assignments.push("amount = ?");
        values.push(Value::Real(amount));
    }

    if let Some(description) = patch.description {
        assignments.push("description = ?");
        values.push(description.map_or(Value::Null, Value::Text));
    }

    values.push(Value::Integer(id));

    let query = format!(
        "UPDATE \"transaction\" SET {} WHERE id = ? RETURNING {TRANSACTION_COLUMNS}",
        assignments.join(", ")
    );

    let transaction = connection
        .prepare(&query)?
        .query_row(params_from_iter(values), map_transaction_row)?;

    Ok(transaction)
}

/// Permanently remove the transaction with `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = :id",
        &[(":id", &id)],
    )?;

    match rows_affected {
        0 => Err(Error::NotFound),
        _ => Ok(()),
    }
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] there is some SQL error.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                type TEXT NOT NULL CHECK (type IN ('income', 'expense')),
                category TEXT NOT NULL CHECK (category <> ''),
                amount REAL NOT NULL CHECK (amount > 0),
                description TEXT,
                created_at TEXT NOT NULL
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('transaction', 0)",
        (),
    )?;

    // Used by the list query's filter and sort order.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_type_created_at \
        ON \"transaction\"(type, created_at);",
        (),
    )?;

    Ok(())
}

/// Map a database row to a Transaction.
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let transaction_type = row.get(1)?;
    let category = row.get(2)?;
    let amount = row.get(3)?;
    let description = row.get(4)?;
    let created_at = row.get(5)?;

    Ok(Transaction {
        id,
        transaction_type,
        category,
        amount,
        description,
        created_at,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod database_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        transaction::{
            Transaction, TransactionFilter, TransactionPatch, TransactionType,
            core::{
                count_transactions, create_transaction, delete_transaction, get_transaction,
                list_transactions, update_transaction,
            },
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn create_succeeds() {
        let conn = get_test_connection();

        let result = create_transaction(
            Transaction::build(TransactionType::Income, "Gaji", 5_000_000.0),
            &conn,
        );

        match result {
            Ok(transaction) => {
                assert_eq!(transaction.id, 1);
                assert_eq!(transaction.transaction_type, TransactionType::Income);
                assert_eq!(transaction.category, "Gaji");
                assert_eq!(transaction.amount, 5_000_000.0);
                assert_eq!(transaction.description, None);
            }
            Err(error) => panic!("Unexpected error: {error}"),
        }
    }

    #[test]
    fn create_rejects_non_positive_amount() {
        let conn = get_test_connection();

        let result = create_transaction(
            Transaction::build(TransactionType::Expense, "Food", 0.0),
            &conn,
        );

        assert!(
            matches!(result, Err(Error::SqlError(_))),
            "want SQL error from CHECK constraint, got {result:?}"
        );
    }

    #[test]
    fn get_returns_created_transaction() {
        let conn = get_test_connection();
        let want = create_transaction(
            Transaction::build(TransactionType::Expense, "Food", 12.5).description(Some("Lunch")),
            &conn,
        )
        .unwrap();

        let got = get_transaction(want.id, &conn);

        assert_eq!(got, Ok(want));
    }

    #[test]
    fn get_fails_on_missing_id() {
        let conn = get_test_connection();

        assert_eq!(get_transaction(42, &conn), Err(Error::NotFound));
    }

    #[test]
    fn list_returns_newest_first() {
        let conn = get_test_connection();
        for i in 1..=5 {
            create_transaction(
                Transaction::build(TransactionType::Expense, "Food", i as f64),
                &conn,
            )
            .unwrap();
        }

        let got = list_transactions(&TransactionFilter::default(), &conn).unwrap();

        let got_ids: Vec<_> = got.iter().map(|transaction| transaction.id).collect();
        assert_eq!(got_ids, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn list_filters_by_type_and_category() {
        let conn = get_test_connection();
        create_transaction(
            Transaction::build(TransactionType::Income, "Salary", 100.0),
            &conn,
        )
        .unwrap();
        let want = create_transaction(
            Transaction::build(TransactionType::Expense, "Food", 10.0),
            &conn,
        )
        .unwrap();
        create_transaction(
            Transaction::build(TransactionType::Expense, "Rent", 50.0),
            &conn,
        )
        .unwrap();

        let got = list_transactions(
            &TransactionFilter {
                transaction_type: Some(TransactionType::Expense),
                category: Some("Food".to_owned()),
                limit: None,
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got, vec![want]);
    }

    #[test]
    fn list_respects_limit() {
        let conn = get_test_connection();
        for i in 1..=10 {
            create_transaction(
                Transaction::build(TransactionType::Income, "Salary", i as f64),
                &conn,
            )
            .unwrap();
        }

        let got = list_transactions(
            &TransactionFilter {
                limit: Some(3),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got.len(), 3, "got {} transactions, want 3", got.len());
        assert_eq!(got[0].id, 10);
    }

    #[test]
    fn list_with_limit_beyond_sqlite_range_returns_everything() {
        let conn = get_test_connection();
        for i in 1..=3 {
            create_transaction(
                Transaction::build(TransactionType::Expense, "Food", i as f64),
                &conn,
            )
            .unwrap();
        }

        let got = list_transactions(
            &TransactionFilter {
                limit: Some(u64::MAX),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got.len(), 3);
    }

    #[test]
    fn list_with_zero_limit_is_empty() {
        let conn = get_test_connection();
        create_transaction(
            Transaction::build(TransactionType::Income, "Salary", 1.0),
            &conn,
        )
        .unwrap();

        let got = list_transactions(
            &TransactionFilter {
                limit: Some(0),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert!(got.is_empty());
    }

    #[test]
    fn update_only_changes_given_fields() {
        let conn = get_test_connection();
        let original = create_transaction(
            Transaction::build(TransactionType::Expense, "Food", 10.0).description(Some("Lunch")),
            &conn,
        )
        .unwrap();

        let got = update_transaction(
            original.id,
            TransactionPatch {
                amount: Some(200.0),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(
            got,
            Transaction {
                amount: 200.0,
                ..original
            }
        );
    }

    #[test]
    fn update_can_clear_description() {
        let conn = get_test_connection();
        let original = create_transaction(
            Transaction::build(TransactionType::Expense, "Food", 10.0).description(Some("Lunch")),
            &conn,
        )
        .unwrap();

        let got = update_transaction(
            original.id,
            TransactionPatch {
                description: Some(None),
                ..Default::default()
            },
            &conn,
        )
        .unwrap();

        assert_eq!(got.description, None);
    }

    #[test]
    fn update_with_empty_patch_returns_transaction() {
        let conn = get_test_connection();
        let original = create_transaction(
            Transaction::build(TransactionType::Income, "Salary", 10.0),
            &conn,
        )
        .unwrap();

        let got = update_transaction(original.id, TransactionPatch::default(), &conn);

        assert_eq!(got, Ok(original));
    }

    #[test]
    fn update_fails_on_missing_id() {
        let conn = get_test_connection();

        let got = update_transaction(
            999_999,
            TransactionPatch {
                amount: Some(100.0),
                ..Default::default()
            },
            &conn,
        );

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn empty_update_fails_on_missing_id() {
        let conn = get_test_connection();

        let got = update_transaction(999_999, TransactionPatch::default(), &conn);

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn delete_removes_transaction() {
        let conn = get_test_connection();
        let transaction = create_transaction(
            Transaction::build(TransactionType::Income, "Salary", 10.0),
            &conn,
        )
        .unwrap();

        delete_transaction(transaction.id, &conn).unwrap();

        assert_eq!(count_transactions(&conn), Ok(0));
        assert_eq!(
            delete_transaction(transaction.id, &conn),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn ids_are_not_reused_after_delete() {
        let conn = get_test_connection();
        let first = create_transaction(
            Transaction::build(TransactionType::Income, "Salary", 10.0),
            &conn,
        )
        .unwrap();
        delete_transaction(first.id, &conn).unwrap();

        let second = create_transaction(
            Transaction::build(TransactionType::Income, "Salary", 10.0),
            &conn,
        )
        .unwrap();

        assert!(second.id > first.id);
    }
}
