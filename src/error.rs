//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError,
    transaction::ValidationError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The submitted transaction breaks one of the currency or date rules.
    ///
    /// Detected before anything is written to the database.
    #[error("invalid transaction: {0}")]
    InvalidTransaction(ValidationError),

    /// The auth cookie is missing from the cookie jar in the request.
    #[error("no auth cookie in the cookie jar")]
    CookieMissing,

    /// The session token in the auth cookie has expired.
    #[error("the session has expired")]
    SessionExpired,

    /// The email address given for the allow-list is empty or malformed.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The configured identity header is not a valid HTTP header name.
    #[error("\"{0}\" is not a valid header name")]
    InvalidIdentityHeader(String),

    /// There was an error parsing or formatting a date-time string.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format or parse date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// An error occurred while serializing or deserializing a struct as JSON.
    #[error("could not convert JSON: {0}")]
    JSONSerializationError(String),

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to update a transaction that does not exist
    #[error("tried to update a transaction that is not in the database")]
    UpdateMissingTransaction,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<ValidationError> for Error {
    fn from(value: ValidationError) -> Self {
        Error::InvalidTransaction(value)
    }
}

fn invalid_timezone_details(timezone: &str) -> String {
    format!(
        "No se pudo obtener la zona horaria \"{timezone}\". Revise la configuración del \
        servidor y asegúrese de usar un nombre de zona horaria canónico, \
        por ejemplo \"America/Argentina/Buenos_Aires\"."
    )
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Zona horaria inválida",
                fix: &invalid_timezone_details(&timezone),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::InvalidTransaction(validation_error) => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Transacción inválida".to_owned(),
                    details: validation_error.to_string(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Zona horaria inválida".to_owned(),
                    details: invalid_timezone_details(&timezone),
                },
            ),
            Error::UpdateMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "No se pudo actualizar la transacción".to_owned(),
                    details: "La transacción no existe.".to_owned(),
                },
            ),
            Error::DeleteMissingTransaction => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "No se pudo eliminar la transacción".to_owned(),
                    details: "La transacción no existe. \
                    Recargue la página para ver si ya fue eliminada."
                        .to_owned(),
                },
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "No encontrado".to_owned(),
                    details: "El recurso solicitado no existe.".to_owned(),
                },
            ),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::Error {
                        message: "Algo salió mal".to_owned(),
                        details: "Ocurrió un error inesperado, revise los registros del \
                        servidor para más detalles."
                            .to_owned(),
                    },
                )
            }
        };

        (status_code, alert.into_html()).into_response()
    }
}
