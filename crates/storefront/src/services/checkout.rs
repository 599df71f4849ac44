//! Checkout sessions: the wizard plus the timers that drive it.
//!
//! Every visit to `/checkout` opens a [`CheckoutSession`]. The session owns
//! its wizard and up to three scheduled tasks:
//!
//! - the countdown, ticking once per second while on the Payment step
//! - the confirm task, resolving a confirm attempt after the verification delay
//! - the auto-advance task, moving a deep-linked visit to the Payment step
//!
//! Tasks only hold a weak reference to the session state. Dropping the session
//! (replaced by a newer visit, evicted, or shut down) drops the state and with
//! it every [`ScheduledTask`], which aborts them.

use std::ops::ControlFlow;
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use goldtrust_core::wizard::{AUTO_ADVANCE_DELAY, CONFIRM_DELAY, TICK_INTERVAL};
use goldtrust_core::{CheckoutId, PendingTransaction, Price, Step, Wizard, WizardError};
use moka::future::Cache;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument};

use super::scheduler::ScheduledTask;
use super::transaction_log::TransactionLog;

/// How long an untouched checkout session is kept.
const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Upper bound on concurrently tracked checkout sessions.
const MAX_SESSIONS: u64 = 10_000;

/// Price and timings used by checkout sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutSettings {
    pub price: Price,
    pub auto_advance_delay: Duration,
    pub confirm_delay: Duration,
    pub tick_interval: Duration,
}

impl CheckoutSettings {
    /// Default timings with the given price.
    #[must_use]
    pub const fn with_price(price: Price) -> Self {
        Self {
            price,
            auto_advance_delay: AUTO_ADVANCE_DELAY,
            confirm_delay: CONFIRM_DELAY,
            tick_interval: TICK_INTERVAL,
        }
    }
}

/// Point-in-time copy of a session for rendering.
#[derive(Debug, Clone)]
pub struct CheckoutSnapshot {
    pub id: CheckoutId,
    pub wizard: Wizard,
    /// A deep-linked visit is about to move to the Payment step.
    pub auto_advancing: bool,
}

struct SessionState {
    wizard: Wizard,
    countdown_task: Option<ScheduledTask>,
    confirm_task: Option<ScheduledTask>,
    auto_advance_task: Option<ScheduledTask>,
}

type SharedState = Arc<Mutex<SessionState>>;

impl SessionState {
    /// Enter the Payment step and replace the countdown task.
    fn start_payment(&mut self, state: Weak<Mutex<Self>>, tick_interval: Duration) {
        self.wizard.enter_payment();
        if self.wizard.step() != Step::Payment {
            return;
        }
        self.confirm_task = None;
        self.countdown_task = Some(spawn_countdown(state, tick_interval));
    }

    /// Drop every task owned by the Payment step.
    fn stop_payment(&mut self) {
        self.countdown_task = None;
        self.confirm_task = None;
        self.auto_advance_task = None;
    }
}

fn spawn_countdown(state: Weak<Mutex<SessionState>>, tick_interval: Duration) -> ScheduledTask {
    ScheduledTask::every(tick_interval, move || {
        let state = state.clone();
        async move {
            let Some(state) = state.upgrade() else {
                return ControlFlow::Break(());
            };
            let countdown = state.lock().await.wizard.tick();
            if countdown.is_expired() {
                debug!("Checkout countdown expired");
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }
    })
}

/// Append a resolved confirm attempt to the log.
///
/// A failed write is logged at error level and so reaches Sentry; the wizard
/// has already moved on and is not touched.
async fn record_pending(log: Arc<dyn TransactionLog>, id: CheckoutId, record: PendingTransaction) {
    match log.append(&record).await {
        Ok(()) => info!(checkout_id = %id, amount = record.amount, "Pending transaction recorded"),
        Err(e) => {
            error!(checkout_id = %id, error = %e, "Failed to record pending transaction");
        }
    }
}

/// One visitor's checkout wizard.
pub struct CheckoutSession {
    id: CheckoutId,
    state: SharedState,
    log: Arc<dyn TransactionLog>,
    settings: CheckoutSettings,
}

impl std::fmt::Debug for CheckoutSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckoutSession")
            .field("id", &self.id)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl CheckoutSession {
    /// Open a session, pre-filling the Details step from inbound parameters.
    ///
    /// When both values are valid the session moves to the Payment step after
    /// `settings.auto_advance_delay`. Must be called inside a tokio runtime.
    #[must_use]
    pub fn open(
        name: Option<&str>,
        phone: Option<&str>,
        log: Arc<dyn TransactionLog>,
        settings: CheckoutSettings,
    ) -> Arc<Self> {
        let id = CheckoutId::generate();
        let mut wizard = Wizard::new();
        let auto_advance = wizard.prefill(name, phone);

        let state = Arc::new_cyclic(|weak: &Weak<Mutex<SessionState>>| {
            Mutex::new(SessionState {
                wizard,
                countdown_task: None,
                confirm_task: None,
                auto_advance_task: auto_advance
                    .then(|| Self::schedule_auto_advance(weak.clone(), settings)),
            })
        });

        info!(checkout_id = %id, auto_advance, "Checkout session opened");

        Arc::new(Self {
            id,
            state,
            log,
            settings,
        })
    }

    fn schedule_auto_advance(
        state: Weak<Mutex<SessionState>>,
        settings: CheckoutSettings,
    ) -> ScheduledTask {
        ScheduledTask::after(settings.auto_advance_delay, async move {
            let Some(shared) = state.upgrade() else {
                return;
            };
            let mut guard = shared.lock().await;
            if guard.wizard.step() == Step::Details {
                guard.start_payment(state, settings.tick_interval);
                debug!("Auto-advanced to payment step");
            }
        })
    }

    #[must_use]
    pub const fn id(&self) -> CheckoutId {
        self.id
    }

    /// Current state for rendering.
    pub async fn snapshot(&self) -> CheckoutSnapshot {
        let guard = self.state.lock().await;
        CheckoutSnapshot {
            id: self.id,
            wizard: guard.wizard.clone(),
            auto_advancing: guard
                .auto_advance_task
                .as_ref()
                .is_some_and(|task| !task.is_finished()),
        }
    }

    /// Submit the Details step.
    ///
    /// Already being on the Payment step is not an error; the submission is
    /// ignored so a double submit cannot restart the countdown.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::InvalidContact`] when a field is missing.
    #[instrument(skip(self, name, phone), fields(checkout_id = %self.id))]
    pub async fn proceed(&self, name: &str, phone: &str) -> Result<(), WizardError> {
        let mut guard = self.state.lock().await;
        if guard.wizard.step() == Step::Payment {
            return Ok(());
        }

        guard.wizard.proceed(name, phone)?;
        guard.auto_advance_task = None;
        guard.start_payment(Arc::downgrade(&self.state), self.settings.tick_interval);

        info!("Checkout moved to payment step");
        Ok(())
    }

    /// Cancel every scheduled task, leaving the wizard as it is.
    pub async fn shutdown(&self) {
        self.state.lock().await.stop_payment();
        debug!(checkout_id = %self.id, "Checkout session timers stopped");
    }

    /// Go back to the Details step, cancelling every Payment step task.
    #[instrument(skip(self), fields(checkout_id = %self.id))]
    pub async fn edit_details(&self) {
        let mut guard = self.state.lock().await;
        guard.wizard.edit_details();
        guard.stop_payment();
        info!("Checkout returned to details step");
    }

    /// Start a payment confirmation.
    ///
    /// The status becomes pending immediately. After the verification delay it
    /// becomes unsuccessful and one pending transaction is appended to the log.
    ///
    /// # Errors
    ///
    /// Propagates [`Wizard::begin_confirm`] errors; nothing is scheduled then.
    #[instrument(skip(self), fields(checkout_id = %self.id))]
    pub async fn confirm_payment(&self) -> Result<(), WizardError> {
        let mut guard = self.state.lock().await;
        guard.wizard.begin_confirm()?;

        let state = Arc::downgrade(&self.state);
        let log = Arc::clone(&self.log);
        let amount = self.settings.price.amount;
        let id = self.id;

        guard.confirm_task = Some(ScheduledTask::after(
            self.settings.confirm_delay,
            async move {
                let Some(shared) = state.upgrade() else {
                    return;
                };
                let record = shared.lock().await.wizard.finish_confirm(amount, Utc::now());
                if let Some(record) = record {
                    // Detached so that cancelling the confirm task cannot drop the write
                    tokio::spawn(record_pending(log, id, record));
                }
            },
        ));

        info!("Payment confirmation started");
        Ok(())
    }
}

/// Live checkout sessions keyed by id.
///
/// Cheap to clone; clones share the same cache.
#[derive(Clone)]
pub struct CheckoutRegistry {
    sessions: Cache<CheckoutId, Arc<CheckoutSession>>,
    log: Arc<dyn TransactionLog>,
    settings: CheckoutSettings,
}

impl CheckoutRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new(log: Arc<dyn TransactionLog>, settings: CheckoutSettings) -> Self {
        let sessions = Cache::builder()
            .max_capacity(MAX_SESSIONS)
            .time_to_idle(SESSION_IDLE_TIMEOUT)
            .eviction_listener(|id, _session, cause| {
                debug!(checkout_id = %id, ?cause, "Checkout session dropped");
            })
            .build();

        Self {
            sessions,
            log,
            settings,
        }
    }

    /// Open a fresh session, dropping `previous` if given.
    pub async fn open(
        &self,
        previous: Option<CheckoutId>,
        name: Option<&str>,
        phone: Option<&str>,
    ) -> Arc<CheckoutSession> {
        if let Some(previous) = previous {
            self.close(previous).await;
        }

        let session = CheckoutSession::open(name, phone, Arc::clone(&self.log), self.settings);
        self.sessions
            .insert(session.id(), Arc::clone(&session))
            .await;
        session
    }

    /// Look up a live session.
    pub async fn get(&self, id: CheckoutId) -> Option<Arc<CheckoutSession>> {
        self.sessions.get(&id).await
    }

    /// Drop a session and stop its timers.
    pub async fn close(&self, id: CheckoutId) {
        if let Some(session) = self.sessions.remove(&id).await {
            session.shutdown().await;
        }
    }
}
