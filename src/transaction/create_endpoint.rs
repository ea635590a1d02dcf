//! Defines the endpoint for creating a new transaction.

use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;

use crate::{
    AppState, Error,
    alert::Alert,
    timezone::get_local_offset,
    transaction::{
        form::TransactionForm,
        store::{SQLiteTransactionStore, TransactionStore},
    },
};

/// The state needed to create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionState {
    /// The store the new transaction is written to.
    pub store: SQLiteTransactionStore,
    /// The local timezone as a canonical timezone name, e.g. "America/Argentina/Buenos_Aires".
    pub local_timezone: String,
}

impl FromRef<AppState> for CreateTransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            store: SQLiteTransactionStore::new(state.db_connection.clone()),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// A route handler for creating a new transaction.
///
/// The form is validated before anything is written. Responds with an alert
/// either way so the user can keep entering transactions.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionState>,
    Form(form): Form<TransactionForm>,
) -> Response {
    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let transaction = match form.into_new_transaction(local_offset) {
        Ok(transaction) => transaction,
        Err(error) => {
            tracing::debug!("rejected transaction: {error}");
            return Error::InvalidTransaction(error).into_alert_response();
        }
    };

    match state.store.create(transaction) {
        Ok(transaction) => {
            tracing::info!("created transaction {}", transaction.id);

            (
                StatusCode::CREATED,
                Alert::Success {
                    message: "Transacción creada!".to_owned(),
                    details: format!("ID de la transacción: {}", transaction.id),
                },
            )
                .into_response()
        }
        Err(error) => {
            tracing::error!("could not create transaction: {error}");
            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, extract::State, http::StatusCode, routing::post};
    use axum_extra::extract::Form;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use time::macros::{date, datetime};

    use crate::{
        endpoints,
        test_utils::{get_test_connection, parse_html_fragment},
        transaction::{
            core::Amounts,
            form::TransactionForm,
            store::{SQLiteTransactionStore, count_transactions, get_transaction},
        },
    };

    use super::{CreateTransactionState, create_transaction_endpoint};

    fn get_test_state() -> (CreateTransactionState, Arc<Mutex<Connection>>) {
        let connection = Arc::new(Mutex::new(get_test_connection()));
        let state = CreateTransactionState {
            store: SQLiteTransactionStore::new(connection.clone()),
            local_timezone: "America/Argentina/Buenos_Aires".to_owned(),
        };

        (state, connection)
    }

    #[tokio::test]
    async fn can_create_transaction() {
        let (state, connection) = get_test_state();
        let form = TransactionForm {
            date: Some(date!(2024 - 03 - 05)),
            usd_income: Some(100.0),
            exchange_rate: Some(1000.0),
            description: "Consultoría".to_owned(),
            ..Default::default()
        };

        let response = create_transaction_endpoint(State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let html = parse_html_fragment(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(
            text.contains("ID de la transacción: 1"),
            "got alert text {text:?}"
        );

        let connection = connection.lock().unwrap();
        let transaction = get_transaction(1, &connection).unwrap();
        assert_eq!(
            transaction.amounts,
            Amounts::Usd {
                income: 100.0,
                expense: 0.0,
                rate: 1000.0
            }
        );
        assert_eq!(transaction.description, "Consultoría");
        // Midnight in Buenos Aires is 03:00 UTC.
        assert_eq!(transaction.date, datetime!(2024-03-05 03:00 UTC));
    }

    #[tokio::test]
    async fn mixed_currencies_are_not_written() {
        let (state, connection) = get_test_state();
        let form = TransactionForm {
            date: Some(date!(2024 - 03 - 05)),
            usd_income: Some(100.0),
            ars_income: Some(5000.0),
            exchange_rate: Some(1000.0),
            ..Default::default()
        };

        let response = create_transaction_endpoint(State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let html = parse_html_fragment(response).await;
        let text = html.root_element().text().collect::<String>();
        assert!(
            text.contains("En una transacción sólo puede cargar o USD o ARS."),
            "got alert text {text:?}"
        );
        assert_eq!(count_transactions(&connection.lock().unwrap()).unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_date_is_not_written() {
        let (state, connection) = get_test_state();
        let form = TransactionForm {
            ars_expense: Some(2500.0),
            ..Default::default()
        };

        let response = create_transaction_endpoint(State(state), Form(form)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(count_transactions(&connection.lock().unwrap()).unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_date_input_is_rejected_with_alert() {
        let (state, connection) = get_test_state();
        let app = Router::new()
            .route(endpoints::TRANSACTIONS_API, post(create_transaction_endpoint))
            .with_state(state);
        let server = TestServer::try_new(app).expect("Could not create test server.");

        let response = server
            .post(endpoints::TRANSACTIONS_API)
            .form(&[("date", ""), ("ars_income", "100"), ("description", "")])
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(
            response.text().contains("Debe ingresar una fecha."),
            "got alert text {:?}",
            response.text()
        );
        assert_eq!(count_transactions(&connection.lock().unwrap()).unwrap(), 0);
    }
}
