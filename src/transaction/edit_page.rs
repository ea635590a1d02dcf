//! Defines the route handler for the page for editing an existing transaction.

use axum::{
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use maud::{Markup, html};
use time::UtcOffset;

use crate::{
    AppState, Error,
    auth::{build_url_with_redirect, normalize_redirect_url},
    endpoints::{self, format_endpoint},
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base, link, loading_spinner},
    navigation::NavBar,
    timezone::get_local_offset,
    transaction::{
        core::{TransactionId, TransactionRecord},
        edit_endpoint::EditQuery,
        form::{TransactionFormDefaults, transaction_form_fields},
        store::{SQLiteTransactionStore, TransactionStore},
    },
};

/// The state needed for the edit transaction page.
#[derive(Debug, Clone)]
pub struct EditTransactionPageState {
    /// The local timezone as a canonical timezone name, e.g. "America/Argentina/Buenos_Aires".
    pub local_timezone: String,
    /// The store the transaction is read from.
    pub store: SQLiteTransactionStore,
}

impl FromRef<AppState> for EditTransactionPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            local_timezone: state.local_timezone.clone(),
            store: SQLiteTransactionStore::new(state.db_connection.clone()),
        }
    }
}

fn edit_transaction_view(
    transaction: &TransactionRecord,
    local_offset: UtcOffset,
    redirect_url: Option<&str>,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::EDIT_TRANSACTION_VIEW).into_html();
    let spinner = loading_spinner();
    let update_url = format_endpoint(endpoints::TRANSACTION, transaction.id);
    let update_url = redirect_url
        .and_then(|redirect_url| build_url_with_redirect(&update_url, redirect_url))
        .unwrap_or(update_url);
    let back_url = redirect_url.unwrap_or(endpoints::TRANSACTIONS_VIEW);
    let defaults = TransactionFormDefaults {
        date: transaction.local_date(local_offset),
        amounts: transaction.amounts.to_fields(),
        description: &transaction.description,
    };

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_url)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                h2 class="text-xl font-bold" { "Editar transacción #" (transaction.id) }

                (transaction_form_fields(&defaults))

                button type="submit" id="submit-button" tabindex="0" class=(BUTTON_PRIMARY_STYLE)
                {
                    span
                        id="indicator"
                        class="inline htmx-indicator"
                    {
                        (spinner)
                    }
                    " Guardar cambios"
                }

                p class="text-sm text-center" { (link(back_url, "Cancelar")) }
            }
        }
    };

    base("Editar transacción", &content)
}

/// Renders the page for editing a transaction.
///
/// `redirect_url` is where the user is sent back to after saving, e.g. the
/// transactions page with their date filter.
pub async fn get_edit_transaction_page(
    State(state): State<EditTransactionPageState>,
    Path(transaction_id): Path<TransactionId>,
    Query(query): Query<EditQuery>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let transaction = state.store.get(transaction_id).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve transaction {transaction_id}: {error}");
        }
    })?;

    let redirect_url = query
        .redirect_url
        .as_deref()
        .and_then(normalize_redirect_url);

    Ok(edit_transaction_view(&transaction, local_offset, redirect_url.as_deref()).into_response())
}
