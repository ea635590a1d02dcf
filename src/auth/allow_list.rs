//! The emails that are allowed to use the app.

use rusqlite::{Connection, params};

use crate::{Error, auth::identity::normalize_email};

/// Create the allow-list table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_authorized_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS authorized_user (
                email TEXT PRIMARY KEY COLLATE NOCASE
                )",
        (),
    )?;

    Ok(())
}

/// Whether `email` is on the allow-list. The comparison ignores case.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn is_authorized(email: &str, connection: &Connection) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM authorized_user WHERE email = ?1)",
            params![normalize_email(email)],
            |row| row.get(0),
        )
        .map_err(Error::from)
}

/// Add `email` to the allow-list.
///
/// Returns `false` if the email was already on the list.
///
/// # Errors
/// Returns:
/// - [Error::InvalidEmail] if `email` does not look like an email address,
/// - [Error::SqlError] if there is an SQL error.
pub fn authorize_email(email: &str, connection: &Connection) -> Result<bool, Error> {
    let email = normalize_email(email);

    if !is_plausible_email(&email) {
        return Err(Error::InvalidEmail(email));
    }

    let rows_affected = connection.execute(
        "INSERT OR IGNORE INTO authorized_user (email) VALUES (?1)",
        params![email],
    )?;

    Ok(rows_affected == 1)
}

/// Remove `email` from the allow-list.
///
/// Returns `false` if the email was not on the list.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn revoke_email(email: &str, connection: &Connection) -> Result<bool, Error> {
    let rows_affected = connection.execute(
        "DELETE FROM authorized_user WHERE email = ?1",
        params![normalize_email(email)],
    )?;

    Ok(rows_affected == 1)
}

/// All emails on the allow-list in alphabetical order.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error.
pub fn list_authorized_emails(connection: &Connection) -> Result<Vec<String>, Error> {
    connection
        .prepare("SELECT email FROM authorized_user ORDER BY email")?
        .query_map([], |row| row.get(0))?
        .map(|maybe_email| maybe_email.map_err(Error::from))
        .collect()
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
