//! The API endpoints URIs.

/// The route for listing, creating, editing and deleting transactions.
///
/// Editing and deleting take the transaction ID in the `id` query parameter.
pub const TRANSACTIONS_API: &str = "/api/transaction";
/// The route for the income, expense and balance totals of transactions.
pub const TRANSACTION_SUMMARY_API: &str = "/api/transaction/summary";
