//! Sets up the application's database schema.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{Error, auth::create_authorized_user_table, transaction::create_transaction_table};

/// Create the tables for the application's data.
///
/// Existing tables are left as they are, so this is safe to call on every start-up.
///
/// # Errors
/// Returns an error if a table cannot be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_transaction_table(&transaction)?;
    create_authorized_user_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}
