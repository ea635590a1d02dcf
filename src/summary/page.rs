//! Defines the route handler for the income summary page.

use std::sync::Arc;

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Query;
use axum_htmx::HxRequest;
use serde::Deserialize;
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    auth::Principal,
    endpoints,
    summary::{
        aggregation::aggregate,
        split::{Percentage, split_revenue},
        view::{summary_content, summary_view},
    },
    timezone::get_local_offset,
    transaction::{
        DateRange, LatestRequests, RangeQuery, SQLiteTransactionStore, TransactionQuery,
        TransactionStore, render_if_latest, request_key,
    },
};

/// The percentage shown when the page is first opened.
pub const DEFAULT_PERCENTAGE: &str = "30";

/// The query parameters for the summary page,
/// e.g. `?start=2024-03-01&end=2024-03-31&percentage=30`.
#[derive(Debug, Default, Deserialize)]
pub struct SummaryQuery {
    pub start: Option<Date>,
    pub end: Option<Date>,
    /// Kept as text so that invalid input is shown back to the user as typed.
    pub percentage: Option<String>,
}

/// The state needed for the summary page.
#[derive(Debug, Clone)]
pub struct SummaryPageState {
    /// The store transactions are read from.
    pub store: SQLiteTransactionStore,
    /// The local timezone as a canonical timezone name, e.g. "America/Argentina/Buenos_Aires".
    pub local_timezone: String,
    /// Used to drop filter results that were superseded by a newer filter.
    pub latest_requests: Arc<LatestRequests>,
}

impl FromRef<AppState> for SummaryPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: SQLiteTransactionStore::new(state.db_connection.clone()),
            local_timezone: state.local_timezone.clone(),
            latest_requests: state.latest_requests.clone(),
        }
    }
}

/// Render the income totals and revenue split for the date range in the
/// query, or the current month if no range is given.
///
/// HTMX requests from the date filter get only the summary back.
pub async fn get_summary_page(
    State(state): State<SummaryPageState>,
    Extension(principal): Extension<Principal>,
    HxRequest(is_htmx_request): HxRequest,
    Query(query): Query<SummaryQuery>,
) -> Result<Response, Error> {
    let local_offset = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;
    let today = OffsetDateTime::now_utc().to_offset(local_offset).date();
    let range = DateRange::from_query(
        &RangeQuery {
            start: query.start,
            end: query.end,
        },
        today,
    );

    let ticket = is_htmx_request.then(|| {
        state
            .latest_requests
            .begin(&request_key(principal.email(), endpoints::SUMMARY_VIEW))
    });

    let transactions = state
        .store
        .query(&TransactionQuery {
            range: Some(range.to_timestamp_range()?),
            sort_date: None,
        })
        .inspect_err(|error| tracing::error!("could not get transactions for summary: {error}"))?;

    let totals = aggregate(&transactions);
    let percentage = query
        .percentage
        .unwrap_or_else(|| DEFAULT_PERCENTAGE.to_owned());
    let split = split_revenue(&totals, Percentage::parse(&percentage));

    Ok(render_if_latest(
        &state.latest_requests,
        ticket.as_ref(),
        || {
            let content = summary_content(&totals, &percentage, &split);

            if is_htmx_request {
                content.into_response()
            } else {
                summary_view(range, &content).into_response()
            }
        },
    ))
}
