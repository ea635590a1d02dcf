//! Shared page layout, style constants and display formatting.

use std::sync::OnceLock;

use maud::{DOCTYPE, Markup, html};
use numfmt::{Formatter, Precision};
use time::Date;

// Link styles
pub const LINK_STYLE: &str = "text-blue-600 hover:text-blue-500 \
    dark:text-blue-500 dark:hover:text-blue-400 underline";

// Button styles
pub const BUTTON_PRIMARY_STYLE: &str = "w-full px-4 py-2 bg-blue-500
    dark:bg-blue-600 disabled:bg-blue-700 hover:enabled:bg-blue-600 \
    hover:enabled:dark:bg-blue-700 text-white rounded";

pub const BUTTON_DELETE_STYLE: &str = "text-red-600 hover:text-red-500 \
    dark:text-red-500 dark:hover:text-red-400 underline bg-transparent \
    border-none cursor-pointer";

// Form styles
pub const FORM_CONTAINER_STYLE: &str = "flex flex-col items-center px-6 py-8 \
    mx-auto lg:py-0 max-w-md text-gray-900 dark:text-white";
pub const FORM_LABEL_STYLE: &str = "block mb-2 text-sm font-medium text-gray-900 dark:text-white";
pub const FORM_TEXT_INPUT_STYLE: &str = "block w-full p-2.5 rounded text-sm \
    text-gray-900 dark:text-white disabled:text-gray-500 bg-gray-50 \
    dark:bg-gray-700 border border-gray-300 dark:border-gray-600 \
    dark:placeholder-gray-400 focus:ring-blue-600 focus:border-blue-600 \
    focus:dark:border-blue-500 focus:dark:ring-blue-500";

// Table styles
pub const TABLE_HEADER_STYLE: &str = "text-xs text-gray-700 uppercase \
    bg-gray-50 dark:bg-gray-700 dark:text-gray-400";

pub const TABLE_ROW_STYLE: &str = "bg-white border-b dark:bg-gray-800 dark:border-gray-700";

pub const TABLE_CELL_STYLE: &str = "px-6 py-4";

// Summary card style
pub const CARD_STYLE: &str = "rounded-lg border border-gray-200 bg-white p-4 shadow-sm \
    dark:border-gray-700 dark:bg-gray-800";

// Page container
pub const PAGE_CONTAINER_STYLE: &str =
    "flex flex-col items-center px-6 py-8 mx-auto lg:py-5 text-gray-900 dark:text-white";

/// The page layout shared by every full page.
pub fn base(title: &str, content: &Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="es"
        {
            head
            {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) " - Cuentas" }
                link rel="icon" type="image/png" href="/static/favicon-32x32.png" sizes="32x32";
                link href="/static/main.css" rel="stylesheet";

                script src="/static/htmx-2.0.8-min.js" integrity="sha384-/TgkGk7p307TH7EXJDuUlgG3Ce1UVolAOFopFekQkkXihi5u/6OCvVKyz1W+idaz" {}
                script src="/static/htmx-ext-response-targets-2.0.4.js" integrity="sha384-T41oglUPvXLGBVyRdZsVRxNWnOOqCynaPubjUVjxhsjFTKrFJGEMm3/0KGmNQ+Pg" {}

                style
                {
                    r#"
                    #indicator.htmx-indicator {
                        display: none;
                    }

                    #indicator.htmx-request .htmx-indicator {
                        display: inline;
                    }

                    #indicator.htmx-request.htmx-indicator {
                        display: inline;
                    }
                    "#
                }

                script src="/static/app.js" defer {}
            }

            body
                hx-ext="response-targets"
                class="container max-w-full min-h-screen bg-gray-50 dark:bg-gray-900 pb-[calc(5rem+env(safe-area-inset-bottom))] lg:pb-0"
            {
                (content)

                // Alerts from form submissions are swapped in here
                div
                    id="alert-container"
                    class="hidden w-full max-w-md px-4"
                    style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
                {}
            }
        }
    }
}

pub fn error_view(title: &str, header: &str, description: &str, fix: &str) -> Markup {
    // Template adapted from https://flowbite.com/blocks/marketing/404/
    let content = html!(
        section class="bg-white dark:bg-gray-900"
        {
            div class="py-8 px-4 mx-auto max-w-screen-xl lg:py-16 lg:px-6"
            {
                div class="mx-auto max-w-screen-sm text-center"
                {
                    h1
                        class="mb-4 text-7xl tracking-tight font-extrabold
                            lg:text-9xl text-blue-600 dark:text-blue-500"
                    {
                        (header)
                    }

                    p
                        class="mb-4 text-3xl md:text-4xl tracking-tight
                            font-bold text-gray-900 dark:text-white"
                    {
                        (description)
                    }

                    p
                        class="mb-4 text-1xl md:text-2xl tracking-tight
                            text-gray-900 dark:text-white"
                    {
                        (fix)
                    }

                    a
                        href="/"
                        class="inline-flex text-white bg-blue-600
                            hover:bg-blue-800 focus:ring-4 focus:outline-hidden
                            focus:ring-blue-300 font-medium rounded text-sm px-5
                            py-2.5 text-center dark:focus:ring-blue-900 my-4"
                    {
                        "Volver al inicio"
                    }
                }
            }
        }
    );

    base(title, &content)
}

/// A centered card with the app logo, used by the sign-in and forbidden pages.
pub fn auth_card(card_title: &str, body: &Markup) -> Markup {
    html! {
        div class="flex flex-col items-center justify-center px-6 py-8 mx-auto"
        {
            a href="#" class="flex items-center mb-6 text-2xl font-semibold text-gray-900 dark:text-white"
            {
                img class="w-8 h-8 mr-2" src="/static/favicon-32x32.png" alt="logo";
                "Cuentas"
            }

            div class="w-full bg-white rounded-lg shadow dark:border md:mt-0 sm:max-w-md xl:p-0 dark:bg-gray-800 dark:border-gray-700"
            {
                div class="p-6 space-y-4 md:space-y-6 sm:p-8"
                {
                    h1 class="text-xl font-bold leading-tight tracking-tight text-gray-900 md:text-2xl dark:text-white"
                    {
                        (card_title)
                    }

                    (body)
                }
            }
        }
    }
}

pub fn loading_spinner() -> Markup {
    // Spinner SVG adapted from https://flowbite.com/docs/components/spinner/
    html! {
        svg
            aria-hidden="true"
            role="status"
            class="inline text-white w-4 h-4 me-2 mb-1 animate-spin"
            viewBox="0 0 100 101"
            fill="none"
            xmlns="http://www.w3.org/2000/svg"
        {
            path
                d="M100 50.5908C100 78.2051 77.6142 100.591 50 100.591C22.3858 100.591 0 78.2051 0 50.5908C0 22.9766 22.3858 0.59082 50 0.59082C77.6142 0.59082 100 22.9766 100 50.5908ZM9.08144 50.5908C9.08144 73.1895 27.4013 91.5094 50 91.5094C72.5987 91.5094 90.9186 73.1895 90.9186 50.5908C90.9186 27.9921 72.5987 9.67226 50 9.67226C27.4013 9.67226 9.08144 27.9921 9.08144 50.5908Z"
                fill="#E5E7EB" {}
            path
                d="M93.9676 39.0409C96.393 38.4038 97.8624 35.9116 97.0079 33.5539C95.2932 28.8227 92.871 24.3692 89.8167 20.348C85.8452 15.1192 80.8826 10.7238 75.2124 7.41289C69.5422 4.10194 63.2754 1.94025 56.7698 1.05124C51.7666 0.367541 46.6976 0.446843 41.7345 1.27873C39.2613 1.69328 37.813 4.19778 38.4501 6.62326C39.0873 9.04874 41.5694 10.4717 44.0505 10.1071C47.8511 9.54855 51.7191 9.52689 55.5402 10.0491C60.8642 10.7766 65.9928 12.5457 70.6331 15.2552C75.2735 17.9648 79.3347 21.5619 82.5849 25.841C84.9175 28.9121 86.7997 32.2913 88.1811 35.8758C89.083 38.2158 91.5421 39.6781 93.9676 39.0409Z"
                fill="currentColor" {}
        }
    }
}

/// A link with blue text for use in a <p> tag.
pub fn link(url: &str, text: &str) -> Markup {
    html! (
        a
            href=(url)
            class="text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400 underline"
        {
          (text)
        }

    )
}

/// Format an amount of pesos for display, e.g. "$ 1.234,50".
pub fn format_ars(number: f64) -> String {
    format_es_ar(number, "$")
}

/// Format an amount of dollars for display, e.g. "US$ 1.234,50".
pub fn format_usd(number: f64) -> String {
    format_es_ar(number, "US$")
}

/// Format a plain number with two decimals, e.g. "1.150,25".
pub fn format_number(number: f64) -> String {
    let (is_negative, whole, cents) = split_cents(number);
    let sign = if is_negative { "-" } else { "" };

    format!("{sign}{},{cents:02}", group_thousands(whole))
}

/// Format a date as day/month/year, e.g. "05/03/2024".
pub fn format_date(date: Date) -> String {
    format!(
        "{:02}/{:02}/{}",
        date.day(),
        u8::from(date.month()),
        date.year()
    )
}

/// Rounds to cents and writes the result with '.' between thousands and ','
/// before the decimals, the way numbers are written in Argentina.
fn format_es_ar(number: f64, symbol: &str) -> String {
    let (is_negative, whole, cents) = split_cents(number);
    let sign = if is_negative { "-" } else { "" };

    format!("{sign}{symbol} {},{cents:02}", group_thousands(whole))
}

/// Split `number` into its sign, whole units and cents after rounding to cents.
///
/// Non-finite numbers are treated as zero.
fn split_cents(number: f64) -> (bool, f64, u8) {
    if !number.is_finite() {
        return (false, 0.0, 0);
    }

    let total_cents = (number.abs() * 100.0).round();
    let whole = (total_cents / 100.0).trunc();
    let cents = (total_cents - whole * 100.0) as u8;

    (number < 0.0 && total_cents > 0.0, whole, cents)
}

/// numfmt switches to scientific notation from here on.
const NUMFMT_LIMIT: f64 = 1e15;

fn group_thousands(whole: f64) -> String {
    static THOUSANDS_FMT: OnceLock<Formatter> = OnceLock::new();

    if whole >= NUMFMT_LIMIT {
        return group_digits(&format!("{whole:.0}"));
    }

    let thousands_fmt = THOUSANDS_FMT.get_or_init(|| {
        Formatter::currency("")
            .unwrap()
            .precision(Precision::Decimals(0))
    });

    if whole == 0.0 {
        // Zero is hardcoded as "0" by numfmt.
        return "0".to_owned();
    }

    thousands_fmt.fmt_string(whole).replace(',', ".")
}

/// Insert '.' between every group of three digits, counting from the right.
fn group_digits(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    grouped
}

#[cfg(test)]
mod format_tests {
    use time::macros::date;

    use super::{format_ars, format_date, format_number, format_usd};

    #[test]
    fn formats_pesos_with_es_ar_separators() {
        let cases = [
            (0.0, "$ 0,00"),
            (0.5, "$ 0,50"),
            (12.3, "$ 12,30"),
            (1500.0, "$ 1.500,00"),
            (73_500.0, "$ 73.500,00"),
            (105_000.0, "$ 105.000,00"),
            (1_234_567.891, "$ 1.234.567,89"),
            (-2500.5, "-$ 2.500,50"),
        ];

        for (number, want) in cases {
            assert_eq!(format_ars(number), want, "formatting {number}");
        }
    }

    #[test]
    fn formats_dollars_with_prefix() {
        assert_eq!(format_usd(30.0), "US$ 30,00");
        assert_eq!(format_usd(1234.5), "US$ 1.234,50");
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(format_ars(0.005), "$ 0,01");
        assert_eq!(format_ars(9.999), "$ 10,00");
        assert_eq!(format_ars(-0.001), "$ 0,00");
    }

    #[test]
    fn formats_plain_numbers() {
        assert_eq!(format_number(1150.25), "1.150,25");
        assert_eq!(format_number(1000.0), "1.000,00");
    }

    #[test]
    fn huge_amounts_are_grouped_not_in_scientific_notation() {
        assert_eq!(format_ars(1e15), "$ 1.000.000.000.000.000,00");
        assert_eq!(format_number(-2e16), "-20.000.000.000.000.000,00");
        assert_eq!(format_usd(1e15 + 1000.0), "US$ 1.000.000.000.001.000,00");
    }

    #[test]
    fn non_finite_numbers_show_zero() {
        assert_eq!(format_ars(f64::NAN), "$ 0,00");
        assert_eq!(format_usd(f64::INFINITY), "US$ 0,00");
    }

    #[test]
    fn formats_dates_day_first() {
        assert_eq!(format_date(date!(2024 - 03 - 05)), "05/03/2024");
        assert_eq!(format_date(date!(2024 - 12 - 31)), "31/12/2024");
    }
}
