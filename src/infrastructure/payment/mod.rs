use crate::services::action_panel::share_url;
use crate::services::payment_bridge::{PaymentRequest, PaymentUi};

/// Payment UI for hosts without an embedded checkout (the CLI).
///
/// Points the user at the web checkout and closes the ticket right away; the
/// purchase shows up on a later status lookup once the backend approves it.
#[derive(Debug, Clone)]
pub struct DeferredCheckout {
    public_origin: String,
}

impl DeferredCheckout {
    pub fn new(public_origin: impl Into<String>) -> Self {
        Self {
            public_origin: public_origin.into(),
        }
    }

    pub fn checkout_url(&self, slug: &str) -> String {
        share_url(&self.public_origin, slug)
    }
}

impl PaymentUi for DeferredCheckout {
    fn open(&self, request: PaymentRequest) {
        let slug = request.ticket.slug().to_string();
        tracing::info!(
            "Complete the purchase of {} ({}) at {}",
            request.template.name,
            request
                .template
                .price
                .map(|price| format!("PHP {:.2}", price))
                .unwrap_or_else(|| "price on checkout".to_string()),
            self.checkout_url(&slug)
        );
        request.ticket.closed();
    }
}
