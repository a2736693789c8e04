//! Database ID type definitions.

/// Alias for the integer type used for mapping to database IDs.
pub type DatabaseId = i64;

/// The ID of a row in the transaction table.
///
/// IDs are assigned by SQLite on insert and are never reused.
pub type TransactionId = DatabaseId;
