//! Defines the endpoint for deleting a transaction.

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};

use crate::{
    AppState,
    transaction::{
        core::TransactionId,
        store::{SQLiteTransactionStore, TransactionStore},
    },
};

/// The state needed to delete a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionState {
    /// The store holding the transaction.
    pub store: SQLiteTransactionStore,
}

impl FromRef<AppState> for DeleteTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: SQLiteTransactionStore::new(state.db_connection.clone()),
        }
    }
}

/// A route handler for deleting a transaction.
///
/// The page asks the user to confirm before sending the request. On success
/// the response is empty so that HTMX removes the table row, on failure an
/// alert is shown and the row is kept.
pub async fn delete_transaction_endpoint(
    State(state): State<DeleteTransactionState>,
    Path(transaction_id): Path<TransactionId>,
) -> Response {
    match state.store.delete(transaction_id) {
        Ok(()) => {
            tracing::info!("deleted transaction {transaction_id}");
            // The status code has to be 200 OK or HTMX will not delete the table row.
            ().into_response()
        }
        Err(error) => {
            tracing::error!("Could not delete transaction {transaction_id}: {error}");
            error.into_alert_response()
        }
    }
}
