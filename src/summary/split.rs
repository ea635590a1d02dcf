//! Splits aggregated revenue between the manager and the owner.

use crate::summary::aggregation::Totals;

/// A revenue share percentage, a finite number from 0 to 100 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Percentage {
    /// Returns `None` if `value` is NaN, infinite or outside `[0, 100]`.
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && (0.0..=100.0).contains(&value)).then_some(Self(value))
    }

    /// Parse user input such as `"30"`, `" 12.5 "` or `"12,5"`.
    ///
    /// Returns `None` for empty or non-numeric input and for values rejected
    /// by [Percentage::new].
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();

        if text.is_empty() {
            return None;
        }

        text.replace(',', ".")
            .parse::<f64>()
            .ok()
            .and_then(Self::new)
    }

    /// The percentage as a number from 0 to 100.
    pub fn value(self) -> f64 {
        self.0
    }

    fn as_fraction(self) -> f64 {
        self.0 / 100.0
    }
}

/// The manager and owner shares of the revenue.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RevenueSplit {
    /// The manager's share of USD income, in USD.
    pub usd_manager_revenue: f64,
    /// The manager's share of ARS income, in ARS.
    ///
    /// Only income recorded in ARS is shared, USD income converted to ARS is not.
    pub ars_manager_revenue: f64,
    /// The owner's share of the profit, in ARS.
    pub ars_owner_revenue: f64,
}

/// Apply `percentage` to `totals`.
///
/// An invalid percentage (`None`) gives zero for every share rather than an error.
pub fn split_revenue(totals: &Totals, percentage: Option<Percentage>) -> RevenueSplit {
    let Some(percentage) = percentage else {
        return RevenueSplit::default();
    };

    let fraction = percentage.as_fraction();

    RevenueSplit {
        usd_manager_revenue: totals.total_income_usd * fraction,
        ars_manager_revenue: totals.ars_income_subtotal * fraction,
        ars_owner_revenue: totals.gross_profit() * (1.0 - fraction),
    }
}
