//! Folds transactions into income and expense totals.
//!
//! USD amounts are converted to ARS with each transaction's own exchange rate,
//! never with a current rate. Transactions without a rate count their USD
//! amounts one-to-one, which only matters for records that carry no USD at all.

use crate::transaction::TransactionRecord;

/// Income and expense totals for a set of transactions.
///
/// Built by [aggregate].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Totals {
    /// Sum of USD income, unconverted.
    pub usd_income_subtotal: f64,
    /// Sum of ARS income.
    pub ars_income_subtotal: f64,
    /// Sum of USD expenses, unconverted.
    pub usd_expense_subtotal: f64,
    /// Sum of ARS expenses.
    pub ars_expense_subtotal: f64,
    /// Total income in USD. Equal to [Totals::usd_income_subtotal].
    pub total_income_usd: f64,
    /// All income converted to ARS.
    pub global_income_ars: f64,
    /// All expenses converted to ARS.
    pub total_expense_ars: f64,
    /// How many transactions were aggregated.
    pub record_count: usize,
}

impl Totals {
    /// Global income minus total expenses, in ARS.
    pub fn gross_profit(&self) -> f64 {
        self.global_income_ars - self.total_expense_ars
    }

    fn add(mut self, transaction: &TransactionRecord) -> Self {
        let amounts = &transaction.amounts;
        let exchange_rate = amounts.exchange_rate();
        let rate = if exchange_rate > 0.0 {
            exchange_rate
        } else {
            1.0
        };

        self.usd_income_subtotal += amounts.usd_income();
        self.ars_income_subtotal += amounts.ars_income();
        self.usd_expense_subtotal += amounts.usd_expense();
        self.ars_expense_subtotal += amounts.ars_expense();
        self.total_income_usd += amounts.usd_income();
        self.global_income_ars += amounts.usd_income() * rate + amounts.ars_income();
        self.total_expense_ars += amounts.usd_expense() * rate + amounts.ars_expense();
        self.record_count += 1;

        self
    }
}

/// Compute the totals for `transactions` in a single pass.
///
/// The order of `transactions` does not matter and an empty slice gives all-zero totals.
pub fn aggregate(transactions: &[TransactionRecord]) -> Totals {
    transactions
        .iter()
        .fold(Totals::default(), |totals, transaction| totals.add(transaction))
}
