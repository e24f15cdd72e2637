use crate::domain::entities::{EntitlementStatus, Notice, Template, Transition};
use crate::events::{now, EventBus, TrackerEvent};
use crate::services::entitlement_store::{ActionClass, StoreHandle};

pub const PAYMENT_SUCCESS_NOTICE: &str = "Payment successful! Template unlocked.";

/// External payment UI (checkout modal, gateway redirect, ...)
///
/// `open` is the `isOpen = true` edge; the collaborator answers through the
/// ticket inside the request.
pub trait PaymentUi: Send + Sync {
    fn open(&self, request: PaymentRequest);
}

/// Everything the payment UI receives when it opens
#[derive(Debug)]
pub struct PaymentRequest {
    pub template: Template,
    pub ticket: PaymentTicket,
}

/// Answer slot for one opening of the payment UI.
///
/// Consuming the ticket guarantees a single callback per open. Dropping it
/// unanswered counts as a dismissal.
#[derive(Debug)]
pub struct PaymentTicket {
    bridge: PaymentBridge,
    settled: bool,
}

impl PaymentTicket {
    pub(crate) fn new(bridge: PaymentBridge) -> Self {
        Self {
            bridge,
            settled: false,
        }
    }

    pub fn slug(&self) -> &str {
        &self.bridge.slug
    }

    /// The gateway confirmed and persisted the charge
    pub fn payment_succeeded(mut self) -> bool {
        self.settled = true;
        self.bridge.on_payment_success()
    }

    /// The user dismissed the payment UI
    pub fn closed(mut self) -> bool {
        self.settled = true;
        self.bridge.on_payment_cancelled()
    }
}

impl Drop for PaymentTicket {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!(
                "Payment ticket for {} dropped without an answer, treating as closed",
                self.bridge.slug
            );
            self.bridge.on_payment_cancelled();
        }
    }
}

/// Seam between the mutation controller and the payment collaborator
#[derive(Debug, Clone)]
pub struct PaymentBridge {
    store: StoreHandle,
    events: EventBus,
    slug: String,
}

impl PaymentBridge {
    pub fn new(store: StoreHandle, events: EventBus, slug: impl Into<String>) -> Self {
        Self {
            store,
            events,
            slug: slug.into(),
        }
    }

    /// Unlock the template. No network call: the payment collaborator has
    /// already persisted the purchase. Returns false if the view is gone.
    pub fn on_payment_success(&self) -> bool {
        let previous = self.store.with(|store| {
            store.set_payment_ui_open(false);
            store.finish(ActionClass::Purchase);
            let before = store.entitlement();
            store.transition(Transition::Entitlement(EntitlementStatus::Bought));
            before
        });

        let Some(previous) = previous else {
            tracing::debug!(
                "Payment success for {} arrived after the view was closed",
                self.slug
            );
            return false;
        };

        tracing::info!("Payment confirmed for template {}", self.slug);
        metrics::counter!("juantap_payments_total", "outcome" => "success").increment(1);

        if previous != Some(EntitlementStatus::Bought) {
            self.events.publish(TrackerEvent::EntitlementChanged {
                slug: self.slug.clone(),
                old: previous,
                new: EntitlementStatus::Bought,
                timestamp: now(),
            });
        }
        self.events.publish(TrackerEvent::PaymentUiClosed {
            slug: self.slug.clone(),
            completed: true,
            timestamp: now(),
        });
        self.events
            .notice(&self.slug, Notice::success(PAYMENT_SUCCESS_NOTICE));
        true
    }

    /// Close the payment UI and leave the entitlement untouched
    pub fn on_payment_cancelled(&self) -> bool {
        let closed = self.store.with(|store| {
            store.set_payment_ui_open(false);
            store.finish(ActionClass::Purchase);
        });

        if closed.is_none() {
            return false;
        }

        tracing::info!("Payment UI for template {} dismissed", self.slug);
        metrics::counter!("juantap_payments_total", "outcome" => "cancelled").increment(1);

        self.events.publish(TrackerEvent::PaymentUiClosed {
            slug: self.slug.clone(),
            completed: false,
            timestamp: now(),
        });
        true
    }
}
