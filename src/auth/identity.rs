//! Who is signed in, as told by the identity provider in front of the app.

use std::fmt::Debug;

use axum::http::{HeaderMap, HeaderName};

use crate::Error;

/// The header an authenticating reverse proxy uses for the signed-in email by default.
pub const DEFAULT_IDENTITY_HEADER: &str = "X-Forwarded-Email";

/// A signed-in identity.
///
/// The email is trimmed and lowercased so that it can be compared with the allow-list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    email: String,
}

impl Principal {
    /// Returns `None` if `email` is blank.
    pub fn new(email: &str) -> Option<Self> {
        let email = normalize_email(email);

        (!email.is_empty()).then_some(Self { email })
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

/// Trim and lowercase `email`.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Something that can tell which principal, if any, made a request.
pub trait IdentityProvider: Debug + Send + Sync {
    /// The principal for the request with `headers`, or `None` if nobody is signed in.
    fn current_principal(&self, headers: &HeaderMap) -> Option<Principal>;
}

/// Trusts a header set by an authenticating reverse proxy, e.g. `X-Forwarded-Email`.
///
/// The proxy must strip this header from incoming client requests, otherwise
/// clients can sign in as anyone.
#[derive(Debug, Clone)]
pub struct TrustedHeaderIdentity {
    header_name: HeaderName,
}

impl TrustedHeaderIdentity {
    /// # Errors
    /// Returns [Error::InvalidIdentityHeader] if `header_name` is not a valid header name.
    pub fn new(header_name: &str) -> Result<Self, Error> {
        let header_name = HeaderName::try_from(header_name)
            .map_err(|_| Error::InvalidIdentityHeader(header_name.to_owned()))?;

        Ok(Self { header_name })
    }
}

impl IdentityProvider for TrustedHeaderIdentity {
    fn current_principal(&self, headers: &HeaderMap) -> Option<Principal> {
        let value = headers.get(&self.header_name)?;

        match value.to_str() {
            Ok(email) => Principal::new(email),
            Err(error) => {
                tracing::warn!(
                    "Ignoring identity header {} with non-ASCII value: {error}",
                    self.header_name
                );
                None
            }
        }
    }
}
