//! Defines the endpoint for replacing the fields of an existing transaction.

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{Form, Query};
use axum_htmx::HxRedirect;
use serde::Deserialize;

use crate::{
    AppState, Error,
    auth::normalize_redirect_url,
    endpoints,
    timezone::get_local_offset,
    transaction::{
        core::TransactionId,
        form::TransactionForm,
        store::{SQLiteTransactionStore, TransactionStore},
    },
};

/// The state needed to edit a transaction.
#[derive(Debug, Clone)]
pub struct EditTransactionState {
    /// The store holding the transaction.
    pub store: SQLiteTransactionStore,
    /// The local timezone as a canonical timezone name, e.g. "America/Argentina/Buenos_Aires".
    pub local_timezone: String,
}

impl FromRef<AppState> for EditTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: SQLiteTransactionStore::new(state.db_connection.clone()),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Where to send the user once the transaction is saved.
#[derive(Debug, Default, Deserialize)]
pub struct EditQuery {
    pub redirect_url: Option<String>,
}

/// A route handler for updating a transaction, redirects to `redirect_url`
/// or the transactions view on success.
pub async fn edit_transaction_endpoint(
    State(state): State<EditTransactionState>,
    Path(transaction_id): Path<TransactionId>,
    Query(query): Query<EditQuery>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let transaction = match form.into_new_transaction(local_offset) {
        Ok(transaction) => transaction,
        Err(error) => return Error::InvalidTransaction(error).into_alert_response(),
    };

    if let Err(error) = state.store.update(transaction_id, transaction) {
        tracing::error!("Could not update transaction {transaction_id}: {error}");
        return error.into_alert_response();
    }

    let redirect_url = query
        .redirect_url
        .as_deref()
        .and_then(normalize_redirect_url)
        .unwrap_or_else(|| endpoints::TRANSACTIONS_VIEW.to_owned());

    (HxRedirect(redirect_url), StatusCode::SEE_OTHER).into_response()
}
