//! Implements a struct that holds the state of the web server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use rusqlite::Connection;
use sha2::{Digest, Sha512};
use time::Duration;

use crate::{
    Error,
    auth::{DEFAULT_COOKIE_DURATION, IdentityProvider},
    db::initialize,
    timezone::get_local_offset,
    transaction::LatestRequests,
};

/// The state of the web server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,

    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,

    /// The local timezone as a canonical timezone name, e.g. "America/Argentina/Buenos_Aires".
    pub local_timezone: String,

    /// Tells which principal, if any, made a request.
    pub identity_provider: Arc<dyn IdentityProvider>,

    /// Tracks the newest filter request per user so stale results can be dropped.
    pub latest_requests: Arc<LatestRequests>,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "America/Argentina/Buenos_Aires".
    ///
    /// # Errors
    /// Returns an error if the timezone is unknown or the database cannot be initialized.
    pub fn new(
        db_connection: Connection,
        cookie_secret: &str,
        local_timezone: &str,
        identity_provider: Arc<dyn IdentityProvider>,
    ) -> Result<Self, Error> {
        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
        }

        initialize(&db_connection)?;

        Ok(Self {
            cookie_key: create_cookie_key(cookie_secret),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            local_timezone: local_timezone.to_owned(),
            identity_provider,
            latest_requests: Arc::new(LatestRequests::default()),
            db_connection: Arc::new(Mutex::new(db_connection)),
        })
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

/// Create a signing key for cookies from a `secret`s string.
pub fn create_cookie_key(secret: &str) -> Key {
    let hash = Sha512::digest(secret);

    Key::from(&hash)
}

#[cfg(test)]
mod app_state_tests {
    use std::sync::Arc;

    use rusqlite::Connection;

    use crate::{
        Error,
        auth::{DEFAULT_IDENTITY_HEADER, TrustedHeaderIdentity},
    };

    use super::AppState;

    fn identity() -> Arc<TrustedHeaderIdentity> {
        Arc::new(TrustedHeaderIdentity::new(DEFAULT_IDENTITY_HEADER).unwrap())
    }

    #[test]
    fn new_state_initializes_database() {
        let state = AppState::new(
            Connection::open_in_memory().unwrap(),
            "foobar",
            "America/Argentina/Buenos_Aires",
            identity(),
        )
        .unwrap();

        let connection = state.db_connection.lock().unwrap();
        let count: u32 = connection
            .query_row("SELECT COUNT(*) FROM authorized_user", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn rejects_unknown_timezone() {
        let result = AppState::new(
            Connection::open_in_memory().unwrap(),
            "foobar",
            "Mars/Olympus_Mons",
            identity(),
        );

        assert_eq!(
            result.unwrap_err(),
            Error::InvalidTimezoneError("Mars/Olympus_Mons".to_owned())
        );
    }
}
