//! Defines the route handler for the page that displays transactions as a table.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use axum_htmx::HxRequest;
use maud::{Markup, html};
use time::{OffsetDateTime, UtcOffset};

use crate::{
    AppState, Error,
    auth::{Principal, build_url_with_redirect},
    endpoints::{self, format_endpoint},
    html::{
        BUTTON_DELETE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE,
        TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_date, format_number,
    },
    navigation::NavBar,
    summary::{Totals, aggregate},
    timezone::get_local_offset,
    transaction::{
        core::TransactionRecord,
        filter::date_filter_form,
        latest::{LatestRequests, render_if_latest, request_key},
        range::{DateRange, RangeQuery},
        store::{SQLiteTransactionStore, SortOrder, TransactionQuery, TransactionStore},
    },
};

/// The state needed for the transactions page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    /// The store transactions are read from.
    pub store: SQLiteTransactionStore,
    /// The local timezone as a canonical timezone name, e.g. "America/Argentina/Buenos_Aires".
    pub local_timezone: String,
    /// Used to drop filter results that were superseded by a newer filter.
    pub latest_requests: Arc<LatestRequests>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: SQLiteTransactionStore::new(state.db_connection.clone()),
            local_timezone: state.local_timezone.clone(),
            latest_requests: state.latest_requests.clone(),
        }
    }
}

const TRANSACTION_LIST_ID: &str = "transaction-list";

const TABLE_HEADERS: [&str; 8] = [
    "Fecha",
    "Ingreso USD",
    "Ingreso ARS",
    "Gasto USD",
    "Gasto ARS",
    "TC",
    "Descripción",
    "Acciones",
];

/// Render the transactions in the date range given by the query, or the
/// current month if no range is given.
///
/// HTMX requests from the date filter get only the table back.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(principal): Extension<Principal>,
    HxRequest(is_htmx_request): HxRequest,
    Query(query): Query<RangeQuery>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;
    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();
    let range = DateRange::from_query(&query, today);

    let ticket = is_htmx_request.then(|| {
        state
            .latest_requests
            .begin(&request_key(principal.email(), endpoints::TRANSACTIONS_VIEW))
    });

    let transactions = state
        .store
        .query(&TransactionQuery {
            range: Some(range.to_timestamp_range()?),
            sort_date: Some(SortOrder::Descending),
        })
        .inspect_err(|error| tracing::error!("could not get transactions: {error}"))?;

    let list_url = list_url(range);

    Ok(render_if_latest(
        &state.latest_requests,
        ticket.as_ref(),
        || {
            let list = transaction_list(&transactions, local_offset, &list_url);

            if is_htmx_request {
                list.into_response()
            } else {
                transactions_view(range, &list).into_response()
            }
        },
    ))
}

/// The URL of the transactions page filtered to `range`.
fn list_url(range: DateRange) -> String {
    match serde_urlencoded::to_string([
        ("start", range.start.to_string()),
        ("end", range.end.to_string()),
    ]) {
        Ok(query) => format!("{}?{query}", endpoints::TRANSACTIONS_VIEW),
        Err(error) => {
            tracing::error!("Could not encode date range {range:?}: {error}");
            endpoints::TRANSACTIONS_VIEW.to_owned()
        }
    }
}

fn transactions_view(range: DateRange, list: &Markup) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();
    let filter = date_filter_form(
        endpoints::TRANSACTIONS_VIEW,
        &format!("#{TRANSACTION_LIST_ID}"),
        range,
        None,
    );

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="relative w-full max-w-5xl"
            {
                div class="flex justify-between flex-wrap items-end mb-4"
                {
                    h1 class="text-xl font-bold" { "Transacciones" }

                    a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                    {
                        "Nueva transacción"
                    }
                }

                (filter)

                (list)
            }
        }
    };

    base("Transacciones", &content)
}

/// Shows an empty cell instead of zero so that the currency of each row stands out.
fn amount_cell(amount: f64) -> Markup {
    html! {
        td class={ (TABLE_CELL_STYLE) " text-right" }
        {
            @if amount != 0.0 {
                (format_number(amount))
            }
        }
    }
}

fn transaction_row(
    transaction: &TransactionRecord,
    local_offset: UtcOffset,
    list_url: &str,
) -> Markup {
    let fields = transaction.amounts.to_fields();
    let edit_url = format_endpoint(endpoints::EDIT_TRANSACTION_VIEW, transaction.id);
    let edit_url = build_url_with_redirect(&edit_url, list_url).unwrap_or(edit_url);
    let delete_url = format_endpoint(endpoints::TRANSACTION, transaction.id);
    let date = format_date(transaction.local_date(local_offset));

    html! {
        tr class=(TABLE_ROW_STYLE) data-transaction-id=(transaction.id)
        {
            td class=(TABLE_CELL_STYLE) { (date) }
            (amount_cell(fields.usd_income))
            (amount_cell(fields.ars_income))
            (amount_cell(fields.usd_expense))
            (amount_cell(fields.ars_expense))
            (amount_cell(fields.exchange_rate))
            td class=(TABLE_CELL_STYLE) { (transaction.description) }
            td class=(TABLE_CELL_STYLE)
            {
                div class="flex gap-4"
                {
                    a href=(edit_url) class=(LINK_STYLE)
                    {
                        "Editar"
                    }

                    button
                        hx-delete=(delete_url)
                        hx-confirm={
                            "¿Eliminar la transacción del " (date) "? "
                            "Esta acción no se puede deshacer."
                        }
                        hx-target="closest tr"
                        hx-target-error="#alert-container"
                        hx-swap="delete"
                        class=(BUTTON_DELETE_STYLE)
                    {
                        "Eliminar"
                    }
                }
            }
        }
    }
}

fn totals_row(totals: &Totals) -> Markup {
    html! {
        tr class="font-semibold text-gray-900 dark:text-white"
        {
            th scope="row" class=(TABLE_CELL_STYLE) { "Totales" }
            (amount_cell(totals.usd_income_subtotal))
            (amount_cell(totals.ars_income_subtotal))
            (amount_cell(totals.usd_expense_subtotal))
            (amount_cell(totals.ars_expense_subtotal))
            td class=(TABLE_CELL_STYLE) {}
            td class=(TABLE_CELL_STYLE) { (totals.record_count) " transacciones" }
            td class=(TABLE_CELL_STYLE) {}
        }
    }
}

fn transaction_list(
    transactions: &[TransactionRecord],
    local_offset: UtcOffset,
    list_url: &str,
) -> Markup {
    let totals = aggregate(transactions);

    html! {
        div id=(TRANSACTION_LIST_ID) class="overflow-x-auto dark:bg-gray-800"
        {
            table class="w-full text-sm text-left rtl:text-right
                text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        @for header in TABLE_HEADERS {
                            th scope="col" class=(TABLE_CELL_STYLE) { (header) }
                        }
                    }
                }

                tbody
                {
                    @for transaction in transactions {
                        (transaction_row(transaction, local_offset, list_url))
                    }

                    @if transactions.is_empty() {
                        tr
                        {
                            td
                                colspan="8"
                                class="px-6 py-4 text-center
                                    text-gray-500 dark:text-gray-400"
                            {
                                "No hay transacciones en este período. "
                                a href=(endpoints::NEW_TRANSACTION_VIEW) class=(LINK_STYLE)
                                {
                                    "Cargar una transacción"
                                }
                            }
                        }
                    }
                }

                @if !transactions.is_empty() {
                    tfoot
                    {
                        (totals_row(&totals))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod transactions_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use axum_extra::extract::Query;
    use axum_htmx::HxRequest;
    use scraper::{ElementRef, Html, Selector};
    use time::{OffsetDateTime, macros::{date, datetime}};

    use crate::{
        auth::Principal,
        endpoints,
        test_utils::{
            assert_content_type, assert_status_ok, assert_valid_html, get_test_connection,
            parse_html_document, parse_html_fragment,
        },
        transaction::{
            core::{AmountFields, NewTransaction},
            latest::{LatestRequests, request_key, wait_for_fetch},
            range::RangeQuery,
            store::{SQLiteTransactionStore, TransactionStore},
        },
    };

    use super::{TransactionsPageState, get_transactions_page};

    fn get_test_state() -> TransactionsPageState {
        TransactionsPageState {
            store: SQLiteTransactionStore::new(Arc::new(Mutex::new(get_test_connection()))),
            local_timezone: "Etc/UTC".to_owned(),
            latest_requests: Arc::new(LatestRequests::default()),
        }
    }

    fn principal() -> Extension<Principal> {
        Extension(Principal::new("ana@example.com").unwrap())
    }

    fn ars_income(date: OffsetDateTime, income: f64, description: &str) -> NewTransaction {
        NewTransaction::new(
            date,
            AmountFields {
                ars_income: income,
                ..Default::default()
            },
            description,
        )
        .unwrap()
    }

    fn march() -> Query<RangeQuery> {
        Query(RangeQuery {
            start: Some(date!(2024 - 03 - 01)),
            end: Some(date!(2024 - 03 - 31)),
        })
    }

    #[track_caller]
    fn must_get_rows(html: &Html) -> Vec<ElementRef<'_>> {
        html.select(&Selector::parse("tbody tr[data-transaction-id]").unwrap())
            .collect()
    }

    #[tokio::test]
    async fn lists_transactions_in_range_newest_first() {
        let state = get_test_state();
        state
            .store
            .create(ars_income(datetime!(2024-03-01 00:00 UTC), 100.0, "primero"))
            .unwrap();
        state
            .store
            .create(ars_income(datetime!(2024-03-20 12:00 UTC), 200.0, "segundo"))
            .unwrap();
        state
            .store
            .create(ars_income(datetime!(2024-04-02 00:00 UTC), 300.0, "abril"))
            .unwrap();

        let response =
            get_transactions_page(State(state), principal(), HxRequest(false), march())
                .await
                .unwrap();

        assert_status_ok(&response);
        assert_content_type(&response, "text/html; charset=utf-8");
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let rows = must_get_rows(&html);
        let ids = rows
            .iter()
            .map(|row| row.value().attr("data-transaction-id").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["2", "1"]);

        let first_row_text = rows[0].text().collect::<String>();
        assert!(first_row_text.contains("20/03/2024"), "got row {first_row_text:?}");
        assert!(first_row_text.contains("200,00"), "got row {first_row_text:?}");
    }

    #[tokio::test]
    async fn rows_link_to_edit_and_delete() {
        let state = get_test_state();
        state
            .store
            .create(ars_income(datetime!(2024-03-05 00:00 UTC), 100.0, ""))
            .unwrap();

        let response =
            get_transactions_page(State(state), principal(), HxRequest(false), march())
                .await
                .unwrap();
        let html = parse_html_document(response).await;

        let edit_link = html
            .select(&Selector::parse("tbody tr a").unwrap())
            .next()
            .expect("no edit link");
        assert_eq!(
            edit_link.value().attr("href"),
            Some(
                "/transactions/1/edit?redirect_url=%2Ftransactions%3Fstart%3D2024-03-01%26end%3D2024-03-31"
            )
        );

        let delete_button = html
            .select(&Selector::parse("tbody tr button").unwrap())
            .next()
            .expect("no delete button");
        let attribute = |name: &str| delete_button.value().attr(name);
        assert_eq!(attribute("hx-delete"), Some("/api/transactions/1"));
        assert_eq!(attribute("hx-target"), Some("closest tr"));
        assert_eq!(attribute("hx-swap"), Some("delete"));
        assert!(attribute("hx-confirm").is_some(), "want delete to ask for confirmation");
    }

    #[tokio::test]
    async fn empty_range_shows_message() {
        let response = get_transactions_page(
            State(get_test_state()),
            principal(),
            HxRequest(false),
            march(),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        assert!(must_get_rows(&html).is_empty());
        let text = html.root_element().text().collect::<String>();
        assert!(text.contains("No hay transacciones en este período."));
    }

    #[tokio::test]
    async fn defaults_to_current_month() {
        let state = get_test_state();
        let now = OffsetDateTime::now_utc();
        state.store.create(ars_income(now, 100.0, "hoy")).unwrap();
        state
            .store
            .create(ars_income(
                now.replace_day(1).unwrap() - time::Duration::days(1),
                100.0,
                "mes pasado",
            ))
            .unwrap();

        let response = get_transactions_page(
            State(state),
            principal(),
            HxRequest(false),
            Query(RangeQuery::default()),
        )
        .await
        .unwrap();

        let html = parse_html_document(response).await;
        let rows = must_get_rows(&html);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].text().collect::<String>().contains("hoy"));
    }

    #[tokio::test]
    async fn htmx_request_gets_only_the_table() {
        let state = get_test_state();
        state
            .store
            .create(ars_income(datetime!(2024-03-05 00:00 UTC), 100.0, ""))
            .unwrap();

        let response =
            get_transactions_page(State(state), principal(), HxRequest(true), march())
                .await
                .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        assert!(
            html.select(&Selector::parse("nav").unwrap()).next().is_none(),
            "want fragment without navigation"
        );
        assert!(
            html.select(&Selector::parse("#transaction-list").unwrap())
                .next()
                .is_some(),
            "want the transaction list"
        );
        assert_eq!(must_get_rows(&html).len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn superseded_filter_request_gets_no_content() {
        let connection = Arc::new(Mutex::new(get_test_connection()));
        let state = TransactionsPageState {
            store: SQLiteTransactionStore::new(connection.clone()),
            local_timezone: "Etc/UTC".to_owned(),
            latest_requests: Arc::new(LatestRequests::default()),
        };
        let latest_requests = state.latest_requests.clone();
        let key = request_key("ana@example.com", endpoints::TRANSACTIONS_VIEW);

        // The first request waits on the database until the newer filter has started.
        let database_lock = connection.lock().unwrap();
        let stale_request = tokio::spawn(get_transactions_page(
            State(state.clone()),
            principal(),
            HxRequest(true),
            march(),
        ));
        wait_for_fetch(&latest_requests, &key).await;
        let newer_ticket = latest_requests.begin(&key);
        drop(database_lock);

        let stale_response = stale_request.await.unwrap().unwrap();
        assert_eq!(stale_response.status(), StatusCode::NO_CONTENT);
        assert!(latest_requests.is_latest(&newer_ticket));

        let next_response =
            get_transactions_page(State(state), principal(), HxRequest(true), march())
                .await
                .unwrap();
        assert_status_ok(&next_response);
    }
}
