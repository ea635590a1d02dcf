//! Renders the income summary and the revenue split.

use maud::{Markup, html};

use crate::{
    endpoints,
    html::{
        CARD_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_ars, format_usd,
        link,
    },
    navigation::NavBar,
    summary::{aggregation::Totals, split::RevenueSplit},
    transaction::{DateRange, date_filter_form},
};

pub const SUMMARY_ID: &str = "summary";
pub const SPLIT_RESULT_ID: &str = "split-result";
pub const PERCENTAGE_INPUT_ID: &str = "percentage";

/// The full summary page.
pub fn summary_view(range: DateRange, content: &Markup) -> Markup {
    let nav_bar = NavBar::new(endpoints::SUMMARY_VIEW).into_html();
    let filter = date_filter_form(
        endpoints::SUMMARY_VIEW,
        &format!("#{SUMMARY_ID}"),
        range,
        Some(&format!("#{PERCENTAGE_INPUT_ID}")),
    );

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-2xl"
            {
                h1 class="text-xl font-bold mb-4" { "Resumen de ganancias" }

                (filter)

                (content)

                p class="mt-6 text-sm"
                {
                    (link(endpoints::TRANSACTIONS_VIEW, "Volver al listado"))
                }
            }
        }
    };

    base("Resumen", &content)
}

/// The part of the page replaced when the date range changes.
pub fn summary_content(totals: &Totals, percentage: &str, split: &RevenueSplit) -> Markup {
    html! {
        div id=(SUMMARY_ID)
        {
            (totals_table(totals))
            (split_form(totals, percentage))
            (split_result(split))
        }
    }
}

fn totals_table(totals: &Totals) -> Markup {
    let rows = [
        ("Subtotal USD", format_usd(totals.usd_income_subtotal)),
        ("Subtotal ARS", format_ars(totals.ars_income_subtotal)),
        (
            "Ingreso global ([USD -> ARS] + ARS)",
            format_ars(totals.global_income_ars),
        ),
        ("Gastos totales (ARS)", format_ars(totals.total_expense_ars)),
    ];

    html! {
        table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
        {
            thead class=(TABLE_HEADER_STYLE)
            {
                tr
                {
                    th scope="col" class=(TABLE_CELL_STYLE) { "Descripción" }
                    th scope="col" class={ (TABLE_CELL_STYLE) " text-right" } { "Monto" }
                }
            }

            tbody
            {
                @for (label, amount) in rows {
                    tr class=(TABLE_ROW_STYLE)
                    {
                        td class=(TABLE_CELL_STYLE) { (label) }
                        td class={ (TABLE_CELL_STYLE) " text-right" } { (amount) }
                    }
                }

                tr class="font-semibold bg-gray-100 text-gray-900 dark:bg-gray-700 dark:text-white"
                {
                    td class=(TABLE_CELL_STYLE) { "Ganancia bruta (ARS)" }
                    td id="gross-profit" class={ (TABLE_CELL_STYLE) " text-right" }
                    {
                        (format_ars(totals.gross_profit()))
                    }
                }
            }
        }

        p class="mt-2 text-xs text-gray-500 dark:text-gray-400"
        {
            (totals.record_count) " transacciones en el período."
        }
    }
}

/// The totals the split is computed from, at full precision.
///
/// Changing the percentage posts these back so the split can be recomputed
/// without reading the transactions again.
fn totals_hidden_fields(totals: &Totals) -> Markup {
    let fields = [
        ("usd_income_subtotal", totals.usd_income_subtotal),
        ("ars_income_subtotal", totals.ars_income_subtotal),
        ("total_income_usd", totals.total_income_usd),
        ("global_income_ars", totals.global_income_ars),
        ("total_expense_ars", totals.total_expense_ars),
    ];

    html! {
        @for (name, value) in fields {
            input type="hidden" name=(name) value=(value);
        }
    }
}

fn split_form(totals: &Totals, percentage: &str) -> Markup {
    html! {
        form
            id="split-form"
            hx-post=(endpoints::SPLIT_API)
            hx-target={ "#" (SPLIT_RESULT_ID) }
            hx-swap="outerHTML"
            hx-trigger="input changed delay:300ms, submit"
            hx-sync="this:replace"
            hx-target-error="#alert-container"
            class="mt-6"
        {
            (totals_hidden_fields(totals))

            label for=(PERCENTAGE_INPUT_ID) class=(FORM_LABEL_STYLE) { "Porcentaje" }

            input
                id=(PERCENTAGE_INPUT_ID)
                name="percentage"
                type="text"
                inputmode="decimal"
                autocomplete="off"
                placeholder="0 a 100"
                value=(percentage)
                class=(FORM_TEXT_INPUT_STYLE);
        }
    }
}

/// The manager and owner shares, swapped in whenever the percentage changes.
pub fn split_result(split: &RevenueSplit) -> Markup {
    let shares = [
        (
            "usd-manager-revenue",
            "Neto Admin. USD",
            format_usd(split.usd_manager_revenue),
        ),
        (
            "ars-manager-revenue",
            "Neto Admin. ARS",
            format_ars(split.ars_manager_revenue),
        ),
        (
            "ars-owner-revenue",
            "Neto global prop. ARS",
            format_ars(split.ars_owner_revenue),
        ),
    ];

    html! {
        div id=(SPLIT_RESULT_ID) class="grid gap-4 mt-4 sm:grid-cols-3"
        {
            @for (id, label, amount) in shares {
                div class=(CARD_STYLE)
                {
                    p class="text-sm text-gray-500 dark:text-gray-400" { (label) }
                    p id=(id) class="text-lg font-semibold text-gray-900 dark:text-white"
                    {
                        (amount)
                    }
                }
            }
        }
    }
}
