//! Checkout route handlers.
//!
//! Every visit to `/checkout` opens a fresh checkout session and stores its id
//! in the cookie session. The page then talks to the session through HTMX:
//! the panel re-renders after each action and the countdown polls once per
//! second. Without JavaScript the forms post normally and every action
//! answers with the whole page.

use std::sync::Arc;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Response},
};
use goldtrust_core::{CheckoutId, Countdown, PaymentStatus, Step, WizardError};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::error::{Result, add_breadcrumb, set_checkout_context};
use crate::filters;
use crate::middleware::HxRequest;
use crate::models::session_keys;
use crate::services::{CheckoutSession, CheckoutSnapshot};
use crate::state::AppState;

/// Pre-filled message for the "How to Pay" link.
pub const HOW_TO_PAY_MESSAGE: &str = "Hi I want to buy a code";

/// Inbound deep-link parameters.
#[derive(Debug, Deserialize)]
pub struct CheckoutQuery {
    pub name: Option<String>,
    pub phone: Option<String>,
}

/// Step 1 form data.
#[derive(Debug, Deserialize)]
pub struct DetailsForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

// =============================================================================
// View Models
// =============================================================================

/// Bank transfer details for the Payment step.
#[derive(Clone)]
pub struct BankView {
    pub account_name: String,
    pub account_number: String,
    pub bank_name: String,
}

/// Countdown display data.
#[derive(Clone, Copy)]
pub struct CountdownView {
    pub display: Countdown,
    pub warning: bool,
    pub expired: bool,
}

impl From<Countdown> for CountdownView {
    fn from(countdown: Countdown) -> Self {
        Self {
            display: countdown,
            warning: countdown.is_warning(),
            expired: countdown.is_expired(),
        }
    }
}

/// Everything the wizard panel renders.
#[derive(Clone)]
pub struct PanelView {
    pub step: u8,
    pub name: String,
    pub phone: String,
    pub price: String,
    pub countdown: CountdownView,
    pub pending: bool,
    pub unsuccessful: bool,
    /// Deep-linked visit about to move to Step 2; the panel polls until then.
    pub auto_advancing: bool,
    pub error: Option<String>,
    pub bank: BankView,
    pub how_to_pay_url: String,
    pub receipt_url: String,
}

impl PanelView {
    fn new(state: &AppState, snapshot: &CheckoutSnapshot) -> Self {
        let config = state.config();
        let wizard = &snapshot.wizard;
        let vendor = &config.vendor;

        Self {
            step: wizard.step().number(),
            name: wizard.draft().name.clone(),
            phone: wizard.draft().phone.clone(),
            price: config.price.to_string(),
            countdown: wizard.countdown().into(),
            pending: wizard.payment_status() == Some(PaymentStatus::Pending),
            unsuccessful: wizard.payment_status() == Some(PaymentStatus::Unsuccessful),
            auto_advancing: snapshot.auto_advancing && wizard.step() == Step::Details,
            error: None,
            bank: BankView {
                account_name: vendor.bank.account_name.clone(),
                account_number: vendor.bank.account_number.clone(),
                bank_name: vendor.bank.bank_name.clone(),
            },
            how_to_pay_url: vendor.vendor_whatsapp.with_text(HOW_TO_PAY_MESSAGE),
            receipt_url: vendor.vendor_whatsapp.url(),
        }
    }

    fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Show the values the user typed instead of the stored draft.
    fn with_entered(mut self, form: DetailsForm) -> Self {
        self.name = form.name;
        self.phone = form.phone;
        self
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout page.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub panel: PanelView,
    pub support_url: String,
}

/// Wizard panel fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/checkout_panel.html")]
pub struct CheckoutPanelTemplate {
    pub panel: PanelView,
}

/// Countdown fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/countdown.html")]
pub struct CountdownTemplate {
    pub countdown: CountdownView,
}

fn render_panel(state: &AppState, HxRequest(is_htmx): HxRequest, panel: PanelView) -> Response {
    if is_htmx {
        CheckoutPanelTemplate { panel }.into_response()
    } else {
        CheckoutShowTemplate {
            panel,
            support_url: state.config().vendor.support_whatsapp.url(),
        }
        .into_response()
    }
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Get the checkout id from the session.
async fn get_checkout_id(session: &Session) -> Option<CheckoutId> {
    session
        .get::<CheckoutId>(session_keys::CHECKOUT_ID)
        .await
        .ok()
        .flatten()
}

/// Set the checkout id in the session.
async fn set_checkout_id(
    session: &Session,
    id: CheckoutId,
) -> std::result::Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CHECKOUT_ID, id).await
}

/// Find the visitor's live checkout session.
async fn current_checkout(state: &AppState, session: &Session) -> Option<Arc<CheckoutSession>> {
    let id = get_checkout_id(session).await?;
    let checkout = state.checkouts().get(id).await;
    if checkout.is_none() {
        info!(checkout_id = %id, "Checkout session expired");
    } else {
        set_checkout_context(id);
    }
    checkout
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout page, opening a fresh checkout session.
///
/// With both `name` and `phone` present and valid, the wizard moves to the
/// Payment step on its own shortly after the page loads.
#[instrument(skip(state, session, query))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CheckoutQuery>,
) -> Result<Response> {
    let previous = get_checkout_id(&session).await;
    let checkout = state
        .checkouts()
        .open(previous, query.name.as_deref(), query.phone.as_deref())
        .await;
    set_checkout_id(&session, checkout.id()).await?;
    set_checkout_context(checkout.id());

    let snapshot = checkout.snapshot().await;
    let panel = PanelView::new(&state, &snapshot);
    Ok(render_panel(&state, HxRequest(false), panel))
}

/// Render the current wizard panel.
#[instrument(skip(state, session))]
pub async fn panel(State(state): State<AppState>, session: Session, hx: HxRequest) -> Response {
    let Some(checkout) = current_checkout(&state, &session).await else {
        return hx.redirect("/checkout");
    };

    let snapshot = checkout.snapshot().await;
    render_panel(&state, hx, PanelView::new(&state, &snapshot))
}

/// Render the countdown.
pub async fn countdown(State(state): State<AppState>, session: Session, hx: HxRequest) -> Response {
    let Some(checkout) = current_checkout(&state, &session).await else {
        return hx.redirect("/checkout");
    };

    let snapshot = checkout.snapshot().await;
    CountdownTemplate {
        countdown: snapshot.wizard.countdown().into(),
    }
    .into_response()
}

/// Submit Step 1.
#[instrument(skip(state, session, form))]
pub async fn proceed(
    State(state): State<AppState>,
    session: Session,
    hx: HxRequest,
    Form(form): Form<DetailsForm>,
) -> Response {
    let Some(checkout) = current_checkout(&state, &session).await else {
        return hx.redirect("/checkout");
    };

    let result = checkout.proceed(&form.name, &form.phone).await;
    match result {
        Ok(()) => {
            add_breadcrumb("checkout", "Proceeded to payment", Some(&[("step", "2")]));
            let snapshot = checkout.snapshot().await;
            render_panel(&state, hx, PanelView::new(&state, &snapshot))
        }
        Err(e) => {
            info!(error = %e, "Checkout details incomplete");
            let snapshot = checkout.snapshot().await;
            let panel = PanelView::new(&state, &snapshot)
                .with_entered(form)
                .with_error(e.to_string());
            render_panel(&state, hx, panel)
        }
    }
}

/// Confirm the payment.
///
/// An expired countdown shows the restart prompt. A second confirm while one
/// is pending just re-renders the panel.
#[instrument(skip(state, session))]
pub async fn confirm(State(state): State<AppState>, session: Session, hx: HxRequest) -> Response {
    let Some(checkout) = current_checkout(&state, &session).await else {
        return hx.redirect("/checkout");
    };

    let result = checkout.confirm_payment().await;
    let snapshot = checkout.snapshot().await;
    let panel = PanelView::new(&state, &snapshot);

    let panel = match result {
        Ok(()) => {
            add_breadcrumb("checkout", "Confirmed payment", Some(&[("step", "2")]));
            panel
        }
        Err(e @ WizardError::CountdownExpired) => {
            info!("Confirm rejected: countdown expired");
            panel.with_error(e.to_string())
        }
        Err(e) => {
            info!(error = %e, "Confirm ignored");
            panel
        }
    };

    render_panel(&state, hx, panel)
}

/// Go back to Step 1.
#[instrument(skip(state, session))]
pub async fn edit(State(state): State<AppState>, session: Session, hx: HxRequest) -> Response {
    let Some(checkout) = current_checkout(&state, &session).await else {
        return hx.redirect("/checkout");
    };

    checkout.edit_details().await;
    add_breadcrumb("checkout", "Returned to details", Some(&[("step", "1")]));

    let snapshot = checkout.snapshot().await;
    render_panel(&state, hx, PanelView::new(&state, &snapshot))
}
