//! Income, expense and balance totals derived from a set of transactions.

use serde::Serialize;

use crate::transaction::{Transaction, TransactionType};

/// Totals computed from a set of transactions at read time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// The sum of all income amounts.
    pub total_income: f64,
    /// The sum of all expense amounts.
    pub total_expense: f64,
    /// Income minus expenses, negative when more was spent than earned.
    pub balance: f64,
}

/// Sum up the income and expenses in `transactions`.
///
/// The order of `transactions` does not matter and an empty slice gives all
/// zeros.
pub fn summarize(transactions: &[Transaction]) -> Summary {
    let (total_income, total_expense) =
        transactions
            .iter()
            .fold((0.0, 0.0), |(income, expense), transaction| {
                match transaction.transaction_type {
                    TransactionType::Income => (income + transaction.amount, expense),
                    TransactionType::Expense => (income, expense + transaction.amount),
                }
            });

    Summary {
        total_income,
        total_expense,
        balance: total_income - total_expense,
    }
}
