//! The page shown to people whose email is not on the allow-list.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::html;

use crate::{
    endpoints,
    html::{auth_card, base, link},
};

/// Display the forbidden page.
pub async fn get_forbidden_page() -> Response {
    let body = html! {
        p class="text-sm text-gray-700 dark:text-gray-300"
        {
            "Su cuenta no está autorizada para usar esta aplicación. \
            Pida a un administrador que agregue su correo a la lista de acceso."
        }

        p class="text-sm text-gray-700 dark:text-gray-300"
        {
            (link(endpoints::LOG_IN_VIEW, "Volver a ingresar"))
        }
    };

    (
        StatusCode::FORBIDDEN,
        base("Acceso denegado", &auth_card("Acceso denegado", &body)),
    )
        .into_response()
}
