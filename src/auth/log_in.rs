//! The sign-in page and the endpoint that starts a session for the principal
//! reported by the identity provider.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, Query, cookie::Key};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::Duration;

use crate::{
    AppState, Error,
    auth::{
        allow_list::is_authorized,
        cookie::set_auth_cookie,
        identity::IdentityProvider,
        redirect::{build_url_with_redirect, normalize_redirect_url},
    },
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, auth_card, base},
};

/// The `redirect_url` query parameter used throughout the sign-in flow.
#[derive(Debug, Default, Deserialize)]
pub struct RedirectQuery {
    pub redirect_url: Option<String>,
}

const NO_PRINCIPAL_ERROR_MSG: &str = "No se encontró una sesión iniciada en el proveedor de \
    identidad. Inicie sesión allí y vuelva a intentarlo.";

fn parse_redirect_url(raw_url: Option<&str>, source: &str) -> Option<String> {
    match raw_url.and_then(normalize_redirect_url) {
        Some(redirect_url) => Some(redirect_url),
        None => {
            if let Some(redirect_url) = raw_url {
                tracing::warn!("Invalid redirect URL from {source}: {redirect_url}");
            }
            None
        }
    }
}

fn log_in_view(error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    let sign_in_url = redirect_url
        .and_then(|redirect_url| build_url_with_redirect(endpoints::SIGN_IN_API, redirect_url))
        .unwrap_or_else(|| endpoints::SIGN_IN_API.to_owned());

    let body = html! {
        p class="text-sm text-gray-500 dark:text-gray-400"
        {
            "Ingrese con la cuenta de su organización. Sólo las direcciones de \
            correo autorizadas pueden usar la aplicación."
        }

        @if let Some(error_message) = error_message {
            p class="text-sm text-red-600 dark:text-red-500" { (error_message) }
        }

        a href=(sign_in_url) id="sign-in-link" class=(format!("block text-center {BUTTON_PRIMARY_STYLE}"))
        {
            "Ingresar"
        }
    };

    base("Ingresar", &auth_card("Ingresar a Cuentas", &body))
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<RedirectQuery>) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "log-in query");

    log_in_view(None, redirect_url.as_deref()).into_response()
}

/// The state needed to start a session.
#[derive(Debug, Clone)]
pub struct SignInState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// Tells who made the request.
    pub identity_provider: Arc<dyn IdentityProvider>,
    /// The database connection, used to check the allow-list.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SignInState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            identity_provider: state.identity_provider.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

// this impl tells `PrivateCookieJar` how to access the key from our state
impl FromRef<SignInState> for Key {
    fn from_ref(state: &SignInState) -> Self {
        state.cookie_key.clone()
    }
}

/// Start a session for the principal reported by the identity provider.
///
/// - Nobody signed in: the log-in page is shown again with an error (401).
/// - Signed in but not on the allow-list: redirect to the forbidden page.
/// - Otherwise the auth cookie is set and the client is redirected to
///   `redirect_url`, or the root page if it is missing or unsafe.
pub async fn get_sign_in(
    State(state): State<SignInState>,
    jar: PrivateCookieJar,
    headers: HeaderMap,
    Query(query): Query<RedirectQuery>,
) -> Response {
    let redirect_url = parse_redirect_url(query.redirect_url.as_deref(), "sign-in query");

    let Some(principal) = state.identity_provider.current_principal(&headers) else {
        tracing::info!("Sign-in attempt without a principal from the identity provider.");
        return (
            StatusCode::UNAUTHORIZED,
            log_in_view(Some(NO_PRINCIPAL_ERROR_MSG), redirect_url.as_deref()),
        )
            .into_response();
    };

    let authorized = match state.db_connection.lock() {
        Ok(connection) => is_authorized(principal.email(), &connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            Err(Error::DatabaseLockError)
        }
    };

    match authorized {
        Ok(true) => {}
        Ok(false) => {
            tracing::warn!("{} is not on the allow-list.", principal.email());
            return Redirect::to(endpoints::FORBIDDEN_VIEW).into_response();
        }
        Err(error) => return error.into_response(),
    }

    match set_auth_cookie(jar, principal.email(), state.cookie_duration) {
        Ok(jar) => {
            tracing::info!("{} signed in.", principal.email());
            let redirect_url = redirect_url.as_deref().unwrap_or(endpoints::ROOT);
            (jar, Redirect::to(redirect_url)).into_response()
        }
        Err(error) => {
            tracing::error!("Error setting auth cookie: {error}");
            Redirect::to(endpoints::INTERNAL_ERROR_VIEW).into_response()
        }
    }
}

#[cfg(test)]
mod log_in_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Router, http::StatusCode, routing::get};
    use axum_extra::extract::cookie::Key;
    use axum_test::TestServer;
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use sha2::{Digest, Sha512};

    use crate::{
        auth::{
            COOKIE_TOKEN, DEFAULT_COOKIE_DURATION, TrustedHeaderIdentity, authorize_email,
            create_authorized_user_table,
        },
        endpoints,
        test_utils::assert_valid_html,
    };

    use super::{SignInState, get_log_in_page, get_sign_in};

    const IDENTITY_HEADER: &str = "X-Forwarded-Email";

    fn get_test_server() -> TestServer {
        let connection = Connection::open_in_memory().unwrap();
        create_authorized_user_table(&connection).unwrap();
        authorize_email("ana@example.com", &connection).unwrap();

        let state = SignInState {
            cookie_key: Key::from(&Sha512::digest("foobar")),
            cookie_duration: DEFAULT_COOKIE_DURATION,
            identity_provider: Arc::new(TrustedHeaderIdentity::new(IDENTITY_HEADER).unwrap()),
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let app = Router::new()
            .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
            .route(endpoints::SIGN_IN_API, get(get_sign_in))
            .with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn log_in_page_links_to_sign_in_with_redirect() {
        let server = get_test_server();

        let response = server
            .get(endpoints::LOG_IN_VIEW)
            .add_query_param("redirect_url", "/summary")
            .await;

        response.assert_status_ok();
        let document = Html::parse_document(&response.text());
        assert_valid_html(&document);
        let selector = Selector::parse("a#sign-in-link").unwrap();
        let link = document
            .select(&selector)
            .next()
            .expect("No sign-in link found");
        assert_eq!(
            link.value().attr("href"),
            Some("/api/sign_in?redirect_url=%2Fsummary")
        );
    }

    #[tokio::test]
    async fn log_in_page_drops_external_redirect() {
        let server = get_test_server();

        let response = server
            .get(endpoints::LOG_IN_VIEW)
            .add_query_param("redirect_url", "https://evil.example.com")
            .await;

        let document = Html::parse_document(&response.text());
        let selector = Selector::parse("a#sign-in-link").unwrap();
        let link = document.select(&selector).next().unwrap();
        assert_eq!(link.value().attr("href"), Some(endpoints::SIGN_IN_API));
    }

    #[tokio::test]
    async fn sign_in_sets_cookie_and_redirects() {
        let server = get_test_server();

        let response = server
            .get(endpoints::SIGN_IN_API)
            .add_query_param("redirect_url", "/summary")
            .add_header(IDENTITY_HEADER, "Ana@Example.com")
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), "/summary");
        let cookie = response.cookie(COOKIE_TOKEN);
        assert_eq!(cookie.http_only(), Some(true));
    }

    #[tokio::test]
    async fn sign_in_without_redirect_goes_to_root() {
        let server = get_test_server();

        let response = server
            .get(endpoints::SIGN_IN_API)
            .add_header(IDENTITY_HEADER, "ana@example.com")
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::ROOT);
    }

    #[tokio::test]
    async fn sign_in_without_principal_is_unauthorized() {
        let server = get_test_server();

        let response = server.get(endpoints::SIGN_IN_API).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert!(response.maybe_cookie(COOKIE_TOKEN).is_none());
        assert!(response.text().contains("proveedor de identidad"));
    }

    #[tokio::test]
    async fn sign_in_outside_allow_list_is_forbidden() {
        let server = get_test_server();

        let response = server
            .get(endpoints::SIGN_IN_API)
            .add_header(IDENTITY_HEADER, "mallory@example.com")
            .await;

        response.assert_status_see_other();
        assert_eq!(response.header("location"), endpoints::FORBIDDEN_VIEW);
        assert!(response.maybe_cookie(COOKIE_TOKEN).is_none());
    }
}
