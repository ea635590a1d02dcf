//! The fields shared by the create and edit transaction forms, and the data they submit.

use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, UtcOffset};

use crate::{
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    transaction::core::{AmountFields, NewTransaction, ValidationError},
};

/// The form data for creating or updating a transaction.
///
/// Must be extracted with `axum_extra`'s `Form`, which treats empty inputs as
/// `None` instead of rejecting the whole form. Empty amounts count as zero.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionForm {
    /// The calendar date in the local timezone.
    pub date: Option<Date>,
    pub usd_income: Option<f64>,
    pub ars_income: Option<f64>,
    pub usd_expense: Option<f64>,
    pub ars_expense: Option<f64>,
    /// ARS per USD, only for transactions in USD.
    pub exchange_rate: Option<f64>,
    #[serde(default)]
    pub description: String,
}

impl TransactionForm {
    pub fn amount_fields(&self) -> AmountFields {
        AmountFields {
            usd_income: self.usd_income.unwrap_or(0.0),
            ars_income: self.ars_income.unwrap_or(0.0),
            usd_expense: self.usd_expense.unwrap_or(0.0),
            ars_expense: self.ars_expense.unwrap_or(0.0),
            exchange_rate: self.exchange_rate.unwrap_or(0.0),
        }
    }

    /// Validate the form, storing the date as local midnight in `local_offset`.
    ///
    /// # Errors
    /// Returns the first currency or date rule the form breaks.
    pub fn into_new_transaction(
        self,
        local_offset: UtcOffset,
    ) -> Result<NewTransaction, ValidationError> {
        NewTransaction::from_local_date(
            self.date,
            local_offset,
            self.amount_fields(),
            &self.description,
        )
    }
}

/// The values shown in the form fields when the page loads.
pub struct TransactionFormDefaults<'a> {
    pub date: Date,
    pub amounts: AmountFields,
    pub description: &'a str,
}

/// Only non-zero amounts are shown so that empty inputs show the placeholder.
fn amount_value(amount: f64) -> Option<String> {
    (amount != 0.0).then(|| amount.to_string())
}

fn amount_input(name: &str, label: &str, value: f64) -> Markup {
    html! {
        div
        {
            label
                for=(name)
                class=(FORM_LABEL_STYLE)
            {
                (label)
            }

            input
                name=(name)
                id=(name)
                type="number"
                step="0.01"
                min="0"
                placeholder="0"
                value=[amount_value(value)]
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

pub fn transaction_form_fields(defaults: &TransactionFormDefaults<'_>) -> Markup {
    let amounts = &defaults.amounts;

    html! {
        div
        {
            label
                for="date"
                class=(FORM_LABEL_STYLE)
            {
                "Fecha"
            }

            input
                name="date"
                id="date"
                type="date"
                value=(defaults.date)
                required
                autofocus
                class=(FORM_TEXT_INPUT_STYLE);
        }

        p class="text-sm text-gray-500 dark:text-gray-400"
        {
            "Cargue importes en USD con su TC, o en ARS con TC en 0, pero no ambos."
        }

        div class="grid grid-cols-2 gap-4"
        {
            (amount_input("usd_income", "Ingreso USD", amounts.usd_income))
            (amount_input("ars_income", "Ingreso ARS", amounts.ars_income))
            (amount_input("usd_expense", "Gasto USD", amounts.usd_expense))
            (amount_input("ars_expense", "Gasto ARS", amounts.ars_expense))
        }

        (amount_input("exchange_rate", "TC (ARS/USD)", amounts.exchange_rate))

        div
        {
            label
                for="description"
                class=(FORM_LABEL_STYLE)
            {
                "Descripción"
            }

            input
                name="description"
                id="description"
                type="text"
                placeholder="Descripción"
                value=(defaults.description)
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

#[cfg(test)]
mod form_data_tests {
    use axum::{
        body::Body,
        extract::FromRequest,
        http::{Request, header::CONTENT_TYPE},
    };
    use axum_extra::extract::Form;
    use time::{UtcOffset, macros::date};

    use crate::transaction::core::{Amounts, ValidationError};

    use super::TransactionForm;

    async fn extract_form(body: &'static str) -> TransactionForm {
        let request = Request::post("/api/transactions")
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();

        let Form(form) = Form::<TransactionForm>::from_request(request, &())
            .await
            .unwrap();

        form
    }

    #[tokio::test]
    async fn empty_amounts_parse_as_none() {
        let form = extract_form(
            "date=2024-03-05&usd_income=&ars_income=5000&usd_expense=&ars_expense=&exchange_rate=&description=Venta",
        )
        .await;

        assert_eq!(form.date, Some(date!(2024 - 03 - 05)));
        assert_eq!(form.usd_income, None);
        assert_eq!(form.ars_income, Some(5000.0));
        assert_eq!(form.exchange_rate, None);
        assert_eq!(form.description, "Venta");
    }

    #[tokio::test]
    async fn empty_date_parses_as_none() {
        let form = extract_form("date=&ars_income=100&description=").await;

        assert_eq!(form.date, None);
        assert_eq!(
            form.into_new_transaction(UtcOffset::UTC),
            Err(ValidationError::MissingDate)
        );
    }

    #[test]
    fn converts_to_new_transaction() {
        let form = TransactionForm {
            date: Some(date!(2024 - 03 - 05)),
            usd_income: Some(100.0),
            exchange_rate: Some(1000.0),
            description: "  Consultoría ".to_owned(),
            ..Default::default()
        };

        let transaction = form.into_new_transaction(UtcOffset::UTC).unwrap();

        assert_eq!(
            transaction.amounts,
            Amounts::Usd {
                income: 100.0,
                expense: 0.0,
                rate: 1000.0
            }
        );
        assert_eq!(transaction.description, "Consultoría");
    }

    #[test]
    fn mixed_currencies_are_rejected() {
        let form = TransactionForm {
            date: Some(date!(2024 - 03 - 05)),
            usd_income: Some(100.0),
            ars_income: Some(5000.0),
            exchange_rate: Some(1000.0),
            ..Default::default()
        };

        assert_eq!(
            form.into_new_transaction(UtcOffset::UTC),
            Err(ValidationError::MixedCurrencies)
        );
    }
}

#[cfg(test)]
mod form_fields_tests {
    use maud::html;
    use scraper::Html;
    use time::macros::date;

    use crate::{
        test_utils::{
            assert_form_input, assert_form_input_with_value, assert_input_value, must_get_form,
        },
        transaction::core::AmountFields,
    };

    use super::{TransactionFormDefaults, transaction_form_fields};

    fn render(defaults: &TransactionFormDefaults<'_>) -> Html {
        let markup = html! { form { (transaction_form_fields(defaults)) } };
        Html::parse_document(&markup.into_string())
    }

    #[test]
    fn renders_prefilled_values() {
        let html = render(&TransactionFormDefaults {
            date: date!(2024 - 03 - 05),
            amounts: AmountFields {
                usd_income: 100.5,
                exchange_rate: 1000.0,
                ..Default::default()
            },
            description: "Consultoría",
        });
        let form = must_get_form(&html);

        assert_form_input_with_value(&form, "date", "date", "2024-03-05");
        assert_form_input(&form, "date", "date");
        assert_input_value(&form, "usd_income", Some("100.5"));
        assert_input_value(&form, "exchange_rate", Some("1000"));
        assert_input_value(&form, "ars_income", None);
        assert_input_value(&form, "description", Some("Consultoría"));
    }
}
