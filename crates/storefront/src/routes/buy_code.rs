//! Purchase selector route handlers.
//!
//! The selector shows the price card. Its call to action opens a confirmation
//! modal collecting name and phone; a valid submission navigates to
//! `/checkout?name=..&phone=..` with the phone already normalized.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use goldtrust_core::ContactInfo;
use goldtrust_core::wizard::PROCESSING_DELAY;
use serde::Deserialize;
use tracing::{info, instrument};

use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::HxRequest;
use crate::state::AppState;

/// Values shown in the confirmation modal.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfirmForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

/// Purchase selector page.
#[derive(Template, WebTemplate)]
#[template(path = "buy_code/show.html")]
pub struct BuyCodeShowTemplate {
    pub price: String,
    pub support_url: String,
}

/// Confirmation modal fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/confirm_modal.html")]
pub struct ConfirmModalTemplate {
    pub price: String,
    pub form: ConfirmForm,
    pub error: Option<String>,
}

/// Purchase selector page with the confirmation modal open (no JavaScript).
#[derive(Template, WebTemplate)]
#[template(path = "buy_code/confirm.html")]
pub struct BuyCodeConfirmTemplate {
    pub price: String,
    pub support_url: String,
    pub form: ConfirmForm,
    pub error: Option<String>,
}

/// Link to the checkout with the contact details as query parameters.
#[must_use]
pub fn checkout_url(contact: &ContactInfo) -> String {
    format!(
        "/checkout?name={}&phone={}",
        urlencoding::encode(&contact.name),
        urlencoding::encode(contact.phone.as_str())
    )
}

fn render_modal(
    state: &AppState,
    HxRequest(is_htmx): HxRequest,
    form: ConfirmForm,
    error: Option<String>,
) -> Response {
    let config = state.config();
    let price = config.price.to_string();
    if is_htmx {
        ConfirmModalTemplate { price, form, error }.into_response()
    } else {
        BuyCodeConfirmTemplate {
            price,
            support_url: config.vendor.support_whatsapp.url(),
            form,
            error,
        }
        .into_response()
    }
}

/// Display the purchase selector.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    let config = state.config();
    BuyCodeShowTemplate {
        price: config.price.to_string(),
        support_url: config.vendor.support_whatsapp.url(),
    }
}

/// Open the confirmation modal.
#[instrument(skip(state))]
pub async fn confirm_modal(State(state): State<AppState>, hx: HxRequest) -> Response {
    render_modal(&state, hx, ConfirmForm::default(), None)
}

/// Submit the confirmation modal.
///
/// Missing fields re-render the modal with the prompt and the entered values.
/// Otherwise the request waits [`PROCESSING_DELAY`] and navigates to checkout.
#[instrument(skip(state, form))]
pub async fn confirm(
    State(state): State<AppState>,
    hx: HxRequest,
    Form(form): Form<ConfirmForm>,
) -> Response {
    let contact = match ContactInfo::parse(&form.name, &form.phone) {
        Ok(contact) => contact,
        Err(e) => {
            info!(error = %e, "Purchase confirmation incomplete");
            return render_modal(&state, hx, form, Some(e.to_string()));
        }
    };

    add_breadcrumb("buy_code", "Confirmed purchase details", None);
    tokio::time::sleep(PROCESSING_DELAY).await;

    hx.redirect(&checkout_url(&contact))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_url_encodes_name_and_normalized_phone() {
        let contact = ContactInfo::parse("Ada Obi", "+234 803 123 4567").unwrap();
        assert_eq!(
            checkout_url(&contact),
            "/checkout?name=Ada%20Obi&phone=08031234567"
        );
    }

    #[test]
    fn test_checkout_url_escapes_reserved_characters() {
        let contact = ContactInfo::parse("A&B=C", "08031234567").unwrap();
        assert_eq!(
            checkout_url(&contact),
            "/checkout?name=A%26B%3DC&phone=08031234567"
        );
    }
}
