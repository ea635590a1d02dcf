//! Transactions in US dollars or Argentine pesos.
//!
//! This module contains everything related to transactions:
//! - The [TransactionRecord] model and the currency rules a transaction must follow
//! - The [TransactionStore] interface and its SQLite implementation
//! - The date range used to select transactions
//! - View handlers for the transaction pages and endpoints

mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;
mod filter;
mod form;
mod latest;
mod range;
mod store;
mod transactions_page;

pub use core::{TransactionRecord, ValidationError};
pub use create_endpoint::create_transaction_endpoint;
pub use create_page::get_create_transaction_page;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use edit_page::get_edit_transaction_page;
pub use filter::date_filter_form;
pub use latest::{LatestRequests, render_if_latest, request_key};
pub use range::{DateRange, RangeQuery};
pub use store::{
    SQLiteTransactionStore, TransactionQuery, TransactionStore, create_transaction_table,
};
pub use transactions_page::get_transactions_page;

#[cfg(test)]
pub use core::{AmountFields, Amounts, NewTransaction};
#[cfg(test)]
pub use latest::wait_for_fetch;
