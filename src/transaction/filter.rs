//! The date range filter shown above the transaction list and the summary.

use maud::{Markup, html};

use crate::{
    html::{FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    transaction::range::DateRange,
};

/// A form that re-fetches `endpoint` whenever a date changes and swaps the
/// result into `target`.
///
/// A newer request replaces one that is still in flight, and the URL is
/// updated so the filter survives a reload. Inputs matched by the CSS
/// selector `include` are submitted along with the dates.
pub fn date_filter_form(
    endpoint: &str,
    target: &str,
    range: DateRange,
    include: Option<&str>,
) -> Markup {
    html! {
        form
            id="date-filter"
            hx-get=(endpoint)
            hx-target=(target)
            hx-swap="outerHTML"
            hx-trigger="change, submit"
            hx-sync="this:replace"
            hx-push-url="true"
            hx-target-error="#alert-container"
            hx-include=[include]
            class="flex flex-wrap items-end gap-4 mb-4"
        {
            div
            {
                label for="start" class=(FORM_LABEL_STYLE) { "Desde" }
                input
                    name="start"
                    id="start"
                    type="date"
                    value=(range.start)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="end" class=(FORM_LABEL_STYLE) { "Hasta" }
                input
                    name="end"
                    id="end"
                    type="date"
                    value=(range.end)
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button
                type="submit"
                class="px-4 py-2.5 text-sm rounded border border-gray-300 dark:border-gray-600"
            {
                "Filtrar"
            }
        }
    }
}
