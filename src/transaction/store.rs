//! The store interface for transactions and its SQLite implementation.

use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::{Connection, Row, params, params_from_iter, types::Type};

use crate::{
    Error,
    transaction::{
        core::{
            AmountFields, NewTransaction, TransactionId, TransactionRecord, format_timestamp,
            parse_timestamp,
        },
        range::TimestampRange,
    },
};

/// Handles the creation, retrieval, update and deletion of transactions.
pub trait TransactionStore {
    /// Retrieve the transactions selected by `query`.
    fn query(&self, query: &TransactionQuery) -> Result<Vec<TransactionRecord>, Error>;

    /// Retrieve a single transaction.
    ///
    /// Returns [Error::NotFound] if there is no transaction with `id`.
    fn get(&self, id: TransactionId) -> Result<TransactionRecord, Error>;

    /// Store a new transaction and return it with its assigned ID.
    fn create(&self, transaction: NewTransaction) -> Result<TransactionRecord, Error>;

    /// Replace every field of the transaction with `id`.
    ///
    /// Returns [Error::UpdateMissingTransaction] if there is no transaction with `id`.
    fn update(&self, id: TransactionId, transaction: NewTransaction) -> Result<(), Error>;

    /// Remove the transaction with `id`.
    ///
    /// Returns [Error::DeleteMissingTransaction] if there is no transaction with `id`.
    fn delete(&self, id: TransactionId) -> Result<(), Error>;
}

/// Defines how transactions should be fetched from [TransactionStore::query].
#[derive(Debug, Clone, Default)]
pub struct TransactionQuery {
    /// Only include transactions with `range.lower <= date <= range.upper`.
    /// `None` selects every transaction.
    pub range: Option<TimestampRange>,
    /// Order by date. `None` returns transactions in the order they are stored.
    pub sort_date: Option<SortOrder>,
}

/// The order to sort transactions in a [TransactionQuery].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}

/// Stores transactions in a SQLite database.
///
/// The `"transaction"` table must exist, see [create_transaction_table].
#[derive(Debug, Clone)]
pub struct SQLiteTransactionStore {
    connection: Arc<Mutex<Connection>>,
}

impl SQLiteTransactionStore {
    /// Create a new store for the SQLite `connection`.
    pub fn new(connection: Arc<Mutex<Connection>>) -> Self {
        Self { connection }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, Error> {
        self.connection
            .lock()
            .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
            .map_err(|_| Error::DatabaseLockError)
    }
}

impl TransactionStore for SQLiteTransactionStore {
    fn query(&self, query: &TransactionQuery) -> Result<Vec<TransactionRecord>, Error> {
        let connection = self.lock()?;
        query_transactions(query, &connection)
    }

    fn get(&self, id: TransactionId) -> Result<TransactionRecord, Error> {
        let connection = self.lock()?;
        get_transaction(id, &connection)
    }

    fn create(&self, transaction: NewTransaction) -> Result<TransactionRecord, Error> {
        let connection = self.lock()?;
        create_transaction(transaction, &connection)
    }

    fn update(&self, id: TransactionId, transaction: NewTransaction) -> Result<(), Error> {
        let connection = self.lock()?;
        match update_transaction(id, &transaction, &connection)? {
            0 => Err(Error::UpdateMissingTransaction),
            _ => Ok(()),
        }
    }

    fn delete(&self, id: TransactionId) -> Result<(), Error> {
        let connection = self.lock()?;
        match delete_transaction(id, &connection)? {
            0 => Err(Error::DeleteMissingTransaction),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

type RowsAffected = usize;

const SELECT_COLUMNS: &str = "id, date, usd_income, ars_income, usd_expense, ars_expense, \
    exchange_rate, description";

/// Create the transaction table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                usd_income REAL NOT NULL DEFAULT 0,
                ars_income REAL NOT NULL DEFAULT 0,
                usd_expense REAL NOT NULL DEFAULT 0,
                ars_expense REAL NOT NULL DEFAULT 0,
                exchange_rate REAL NOT NULL DEFAULT 0,
                description TEXT NOT NULL DEFAULT ''
                )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);",
        (),
    )?;

    Ok(())
}

/// Map a database row selected with [SELECT_COLUMNS] to a [TransactionRecord].
///
/// Rows with a malformed date or amounts that break the currency rules are
/// reported as conversion failures.
pub fn map_transaction_row(row: &Row) -> Result<TransactionRecord, rusqlite::Error> {
    let id = row.get(0)?;
    let date_text: String = row.get(1)?;
    let fields = AmountFields {
        usd_income: row.get(2)?,
        ars_income: row.get(3)?,
        usd_expense: row.get(4)?,
        ars_expense: row.get(5)?,
        exchange_rate: row.get(6)?,
    };
    let description = row.get(7)?;

    let date = parse_timestamp(&date_text).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(error))
    })?;
    let amounts = fields.validate().map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(2, Type::Real, Box::new(error))
    })?;

    Ok(TransactionRecord {
        id,
        date,
        amounts,
        description,
    })
}

/// Get the transactions matching `query`.
///
/// Ties on date are broken by ID so that the order is stable after edits.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails or a row cannot be mapped.
pub fn query_transactions(
    query: &TransactionQuery,
    connection: &Connection,
) -> Result<Vec<TransactionRecord>, Error> {
    let mut sql = format!("SELECT {SELECT_COLUMNS} FROM \"transaction\"");
    let mut parameters = Vec::new();

    if let Some(range) = &query.range {
        sql.push_str(" WHERE date >= ?1 AND date <= ?2");
        parameters.push(range.lower.as_str());
        parameters.push(range.upper.as_str());
    }

    match query.sort_date {
        Some(SortOrder::Ascending) => sql.push_str(" ORDER BY date ASC, id ASC"),
        Some(SortOrder::Descending) => sql.push_str(" ORDER BY date DESC, id DESC"),
        None => {}
    }

    connection
        .prepare(&sql)?
        .query_map(params_from_iter(parameters), map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(Error::from))
        .collect()
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid transaction,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    connection: &Connection,
) -> Result<TransactionRecord, Error> {
    let transaction = connection
        .prepare(&format!(
            "SELECT {SELECT_COLUMNS} FROM \"transaction\" WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Create a new transaction in the database.
///
/// # Errors
/// Returns [Error::SqlError] if there is an SQL error, or
/// [Error::InvalidDateFormat] if the date cannot be formatted.
pub fn create_transaction(
    transaction: NewTransaction,
    connection: &Connection,
) -> Result<TransactionRecord, Error> {
    let fields = transaction.amounts.to_fields();

    let transaction = connection
        .prepare(&format!(
            "INSERT INTO \"transaction\" \
            (date, usd_income, ars_income, usd_expense, ars_expense, exchange_rate, description) \
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
            RETURNING {SELECT_COLUMNS}"
        ))?
        .query_row(
            params![
                format_timestamp(transaction.date)?,
                fields.usd_income,
                fields.ars_income,
                fields.usd_expense,
                fields.ars_expense,
                fields.exchange_rate,
                transaction.description,
            ],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Overwrite the transaction with `id`.
///
/// Returns the number of rows changed, zero means no transaction has `id`.
fn update_transaction(
    id: TransactionId,
    transaction: &NewTransaction,
    connection: &Connection,
) -> Result<RowsAffected, Error> {
    let fields = transaction.amounts.to_fields();

    connection
        .execute(
            "UPDATE \"transaction\" \
            SET \
                date = ?1, \
                usd_income = ?2, \
                ars_income = ?3, \
                usd_expense = ?4, \
                ars_expense = ?5, \
                exchange_rate = ?6, \
                description = ?7 \
            WHERE id = ?8;",
            params![
                format_timestamp(transaction.date)?,
                fields.usd_income,
                fields.ars_income,
                fields.usd_expense,
                fields.ars_expense,
                fields.exchange_rate,
                transaction.description,
                id,
            ],
        )
        .map_err(Error::from)
}

fn delete_transaction(id: TransactionId, connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute(
            "DELETE FROM \"transaction\" WHERE id = :id",
            &[(":id", &id)],
        )
        .map_err(Error::from)
}

/// Get the total number of transactions in the database.
#[cfg(test)]
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM \"transaction\";", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

// ============================================================================
// TESTS
// ============================================================================
