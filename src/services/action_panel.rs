use crate::domain::entities::{EntitlementStatus, Template, UsageStatus};
use crate::services::entitlement_store::EntitlementSnapshot;

pub const SHARE_COPIED_NOTICE: &str = "Template link copied!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageToggle {
    pub label: &'static str,
    pub disabled: bool,
    pub busy: bool,
}

/// Buttons and captions of the template purchase card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionPanel {
    pub primary_label: &'static str,
    pub primary_disabled: bool,
    pub primary_busy: bool,
    pub caption: &'static str,
    /// Only offered once the template is saved or bought
    pub usage_toggle: Option<UsageToggle>,
}

impl ActionPanel {
    pub fn build(template: &Template, snapshot: &EntitlementSnapshot) -> Self {
        let entitlement = snapshot.entitlement;
        let saving = snapshot.in_flight.saving;
        let purchasing = snapshot.in_flight.purchase || snapshot.payment_ui_open;

        let (primary_label, caption) = if template.is_premium() {
            let label = match entitlement {
                Some(EntitlementStatus::Bought) => "Owned",
                Some(EntitlementStatus::Pending) => "Pending Approval",
                _ => "Purchase Template",
            };
            (label, "One-time payment")
        } else if entitlement == Some(EntitlementStatus::Saved) {
            ("Unsave", "Already saved")
        } else {
            ("Save Free", "No payment required")
        };

        let usage_toggle = entitlement
            .filter(|status| status.allows_usage())
            .map(|_| UsageToggle {
                label: match snapshot.usage {
                    UsageStatus::Used => "Mark as Unused",
                    UsageStatus::Unused => "Mark as Used",
                },
                disabled: snapshot.in_flight.usage,
                busy: snapshot.in_flight.usage,
            });

        Self {
            primary_label,
            primary_disabled: saving || purchasing || snapshot.is_loading,
            primary_busy: saving || purchasing,
            caption,
            usage_toggle,
        }
    }
}

/// Public link to a template's preview page
pub fn share_url(public_origin: &str, slug: &str) -> String {
    format!("{}/templates/{}", public_origin.trim_end_matches('/'), slug)
}
