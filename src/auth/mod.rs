//! Sign-in through an external identity provider, the allow-list and cookie sessions.

mod allow_list;
mod cookie;
mod forbidden;
mod identity;
mod log_in;
mod log_out;
mod middleware;
mod redirect;
mod token;

pub use allow_list::{
    authorize_email, create_authorized_user_table, list_authorized_emails, revoke_email,
};
pub use cookie::DEFAULT_COOKIE_DURATION;
pub use forbidden::get_forbidden_page;
pub use identity::{DEFAULT_IDENTITY_HEADER, IdentityProvider, Principal, TrustedHeaderIdentity};
pub use log_in::{get_log_in_page, get_sign_in};
pub use log_out::get_log_out;
pub use middleware::{auth_guard, auth_guard_hx};
pub use redirect::{build_url_with_redirect, normalize_redirect_url};

#[cfg(test)]
pub use cookie::{COOKIE_TOKEN, set_auth_cookie};

#[cfg(test)]
pub use middleware::AuthState;
