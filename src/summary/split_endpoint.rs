//! Defines the endpoint that recomputes the revenue split when the percentage changes.

use axum::response::{IntoResponse, Response};
use axum_extra::extract::Form;
use serde::Deserialize;

use crate::summary::{
    aggregation::Totals,
    split::{Percentage, split_revenue},
    view::split_result,
};

/// The totals from the summary page and the percentage typed by the user.
#[derive(Debug, Deserialize)]
pub struct SplitForm {
    pub usd_income_subtotal: f64,
    pub ars_income_subtotal: f64,
    pub total_income_usd: f64,
    pub global_income_ars: f64,
    pub total_expense_ars: f64,
    #[serde(default)]
    pub percentage: String,
}

impl SplitForm {
    fn totals(&self) -> Totals {
        Totals {
            usd_income_subtotal: self.usd_income_subtotal,
            ars_income_subtotal: self.ars_income_subtotal,
            total_income_usd: self.total_income_usd,
            global_income_ars: self.global_income_ars,
            total_expense_ars: self.total_expense_ars,
            ..Default::default()
        }
    }
}

/// A route handler that splits the posted totals by the posted percentage.
///
/// Does not touch the database.
pub async fn post_split(Form(form): Form<SplitForm>) -> Response {
    let percentage = Percentage::parse(&form.percentage);

    match percentage {
        Some(percentage) => tracing::debug!("splitting revenue at {}%", percentage.value()),
        None => tracing::debug!("invalid split percentage {:?}", form.percentage),
    }

    split_result(&split_revenue(&form.totals(), percentage)).into_response()
}
