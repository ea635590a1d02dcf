//! Defines the core data model for transactions and the rules that keep a
//! record within a single currency family.

use time::{
    Date, OffsetDateTime, PrimitiveDateTime, UtcOffset, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::Error;

/// The ID the store assigns to a transaction.
pub type TransactionId = i64;

// ============================================================================
// VALIDATION
// ============================================================================

/// The reasons a transaction can be rejected before it reaches the store.
///
/// The messages are shown to the user as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The form did not include a date.
    #[error("Debe ingresar una fecha.")]
    MissingDate,

    /// An amount or the exchange rate was negative or not a number.
    #[error("Los importes y el TC deben ser números mayores o iguales a cero.")]
    InvalidAmount,

    /// Both a USD field and an ARS field were set.
    #[error("En una transacción sólo puede cargar o USD o ARS.")]
    MixedCurrencies,

    /// A USD amount was set without an exchange rate.
    #[error("Debe ingresar un TC al cargar USD.")]
    MissingExchangeRate,

    /// An ARS amount was set together with an exchange rate.
    #[error("El TC debe ser 0 al cargar ARS.")]
    UnexpectedExchangeRate,
}

// ============================================================================
// MODELS
// ============================================================================

/// The money moved by a transaction, in exactly one currency.
///
/// USD transactions carry the ARS-per-USD exchange rate that was in effect
/// when the transaction was recorded. ARS transactions have no rate, which is
/// stored as an exchange rate of zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Amounts {
    /// Income and expense in US dollars.
    Usd {
        /// Money earned, in USD.
        income: f64,
        /// Money spent, in USD.
        expense: f64,
        /// ARS per USD. Always greater than zero.
        rate: f64,
    },
    /// Income and expense in Argentine pesos.
    Ars {
        /// Money earned, in ARS.
        income: f64,
        /// Money spent, in ARS.
        expense: f64,
    },
}

impl Amounts {
    /// USD income, zero for ARS transactions.
    pub fn usd_income(&self) -> f64 {
        match self {
            Amounts::Usd { income, .. } => *income,
            Amounts::Ars { .. } => 0.0,
        }
    }

    /// USD expense, zero for ARS transactions.
    pub fn usd_expense(&self) -> f64 {
        match self {
            Amounts::Usd { expense, .. } => *expense,
            Amounts::Ars { .. } => 0.0,
        }
    }

    /// ARS income, zero for USD transactions.
    pub fn ars_income(&self) -> f64 {
        match self {
            Amounts::Usd { .. } => 0.0,
            Amounts::Ars { income, .. } => *income,
        }
    }

    /// ARS expense, zero for USD transactions.
    pub fn ars_expense(&self) -> f64 {
        match self {
            Amounts::Usd { .. } => 0.0,
            Amounts::Ars { expense, .. } => *expense,
        }
    }

    /// The exchange rate, zero for ARS transactions.
    pub fn exchange_rate(&self) -> f64 {
        match self {
            Amounts::Usd { rate, .. } => *rate,
            Amounts::Ars { .. } => 0.0,
        }
    }

    /// The flat view of the amounts used by forms and the database.
    pub fn to_fields(self) -> AmountFields {
        AmountFields {
            usd_income: self.usd_income(),
            ars_income: self.ars_income(),
            usd_expense: self.usd_expense(),
            ars_expense: self.ars_expense(),
            exchange_rate: self.exchange_rate(),
        }
    }
}

/// The five loose numeric fields of a transaction as entered in a form or
/// read from a database row.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct AmountFields {
    pub usd_income: f64,
    pub ars_income: f64,
    pub usd_expense: f64,
    pub ars_expense: f64,
    pub exchange_rate: f64,
}

impl AmountFields {
    /// Check the currency rules and convert to [Amounts].
    ///
    /// # Errors
    /// Returns, in order of precedence:
    /// - [ValidationError::InvalidAmount] if any field is negative, NaN or infinite,
    /// - [ValidationError::MixedCurrencies] if both USD and ARS amounts are set,
    /// - [ValidationError::MissingExchangeRate] if USD amounts are set but the rate is zero,
    /// - [ValidationError::UnexpectedExchangeRate] if ARS amounts are set and the rate is not zero.
    pub fn validate(self) -> Result<Amounts, ValidationError> {
        let all_fields = [
            self.usd_income,
            self.ars_income,
            self.usd_expense,
            self.ars_expense,
            self.exchange_rate,
        ];

        if all_fields
            .iter()
            .any(|value| !value.is_finite() || *value < 0.0)
        {
            return Err(ValidationError::InvalidAmount);
        }

        let has_usd = self.usd_income > 0.0 || self.usd_expense > 0.0;
        let has_ars = self.ars_income > 0.0 || self.ars_expense > 0.0;

        if has_usd && has_ars {
            return Err(ValidationError::MixedCurrencies);
        }

        if has_usd && self.exchange_rate == 0.0 {
            return Err(ValidationError::MissingExchangeRate);
        }

        if has_ars && self.exchange_rate != 0.0 {
            return Err(ValidationError::UnexpectedExchangeRate);
        }

        // A transaction with no amounts falls back to whichever family the rate implies.
        if has_usd || self.exchange_rate > 0.0 {
            Ok(Amounts::Usd {
                income: self.usd_income,
                expense: self.usd_expense,
                rate: self.exchange_rate,
            })
        } else {
            Ok(Amounts::Ars {
                income: self.ars_income,
                expense: self.ars_expense,
            })
        }
    }
}

impl TryFrom<AmountFields> for Amounts {
    type Error = ValidationError;

    fn try_from(fields: AmountFields) -> Result<Self, Self::Error> {
        fields.validate()
    }
}

/// An income or expense event as it is stored.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    /// The ID assigned by the store.
    pub id: TransactionId,
    /// When the transaction happened, in UTC.
    pub date: OffsetDateTime,
    /// The money moved by the transaction.
    pub amounts: Amounts,
    /// A free-form note, may be empty.
    pub description: String,
}

impl TransactionRecord {
    /// The calendar date of the transaction in the local timezone.
    pub fn local_date(&self, local_offset: UtcOffset) -> Date {
        self.date.to_offset(local_offset).date()
    }
}

/// A validated transaction that has not been given an ID yet.
///
/// Used for both creating and updating transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub date: OffsetDateTime,
    pub amounts: Amounts,
    pub description: String,
}

impl NewTransaction {
    /// Validate `fields` and build a transaction dated at `date`.
    ///
    /// The date is converted to UTC.
    ///
    /// # Errors
    /// Returns a [ValidationError] if the amounts break the currency rules,
    /// see [AmountFields::validate].
    pub fn new(
        date: OffsetDateTime,
        fields: AmountFields,
        description: &str,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            date: date.to_offset(UtcOffset::UTC),
            amounts: fields.validate()?,
            description: description.trim().to_owned(),
        })
    }

    /// Validate the raw values from a form where the user picked a calendar date.
    ///
    /// The date is stored as midnight of that day in `local_offset`.
    ///
    /// # Errors
    /// Returns [ValidationError::MissingDate] if `date` is `None`, otherwise
    /// see [NewTransaction::new].
    pub fn from_local_date(
        date: Option<Date>,
        local_offset: UtcOffset,
        fields: AmountFields,
        description: &str,
    ) -> Result<Self, ValidationError> {
        let date = date.ok_or(ValidationError::MissingDate)?;

        Self::new(
            local_midnight(date, local_offset),
            fields,
            description,
        )
    }
}

/// Midnight at the start of `date` in `local_offset`.
pub fn local_midnight(date: Date, local_offset: UtcOffset) -> OffsetDateTime {
    date.midnight()
        .assume_offset(local_offset)
        .to_offset(UtcOffset::UTC)
}

// ============================================================================
// TIMESTAMPS
// ============================================================================

/// ISO-8601 UTC with millisecond precision, e.g. "2024-04-01T00:00:00.000Z".
///
/// Fixed width so that timestamps sort the same way as strings and as instants.
const TIMESTAMP_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
);

/// Format `date_time` as a UTC timestamp string.
///
/// # Errors
/// Returns [Error::InvalidDateFormat] if the year cannot be written with four digits.
pub fn format_timestamp(date_time: OffsetDateTime) -> Result<String, Error> {
    let date_time = date_time.to_offset(UtcOffset::UTC);

    date_time
        .format(TIMESTAMP_FORMAT)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), date_time.to_string()))
}

/// Parse a UTC timestamp string written by [format_timestamp].
///
/// # Errors
/// Returns [Error::InvalidDateFormat] if `text` is not in the expected format.
pub fn parse_timestamp(text: &str) -> Result<OffsetDateTime, Error> {
    PrimitiveDateTime::parse(text, TIMESTAMP_FORMAT)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|error| Error::InvalidDateFormat(error.to_string(), text.to_owned()))
}


#[cfg(test)]
mod timestamp_tests {
    use time::{
        UtcOffset,
        macros::{date, datetime},
    };

    use super::{NewTransaction, ValidationError, format_timestamp, local_midnight, parse_timestamp};
    use crate::transaction::core::AmountFields;

    #[test]
    fn formats_with_milliseconds_and_z_suffix() {
        let got = format_timestamp(datetime!(2024-04-01 00:00:00 UTC)).unwrap();

        assert_eq!(got, "2024-04-01T00:00:00.000Z");
    }

    #[test]
    fn formats_non_utc_offsets_as_utc() {
        let got = format_timestamp(datetime!(2024-03-31 21:00:00.5 -3)).unwrap();

        assert_eq!(got, "2024-04-01T00:00:00.500Z");
    }

    #[test]
    fn parses_formatted_timestamp() {
        let want = datetime!(2024-03-31 23:00:00.001 UTC);

        let got = parse_timestamp(&format_timestamp(want).unwrap()).unwrap();

        assert_eq!(got, want);
    }

    #[test]
    fn rejects_malformed_timestamp() {
        assert!(parse_timestamp("2024-03-31").is_err());
        assert!(parse_timestamp("not a date").is_err());
    }

    #[test]
    fn local_midnight_is_converted_to_utc() {
        let buenos_aires = UtcOffset::from_hms(-3, 0, 0).unwrap();

        let got = local_midnight(date!(2024 - 03 - 01), buenos_aires);

        assert_eq!(got, datetime!(2024-03-01 03:00:00 UTC));
    }

    #[test]
    fn missing_date_is_a_validation_error() {
        let got = NewTransaction::from_local_date(
            None,
            UtcOffset::UTC,
            AmountFields::default(),
            "sin fecha",
        );

        assert_eq!(got, Err(ValidationError::MissingDate));
    }
}
