use crate::domain::entities::{EntitlementStatus, UsageStatus};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("Invalid transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: EntitlementStatus,
        to: EntitlementStatus,
    },
    #[error("Template is already owned")]
    AlreadyOwned,
    #[error("Usage requires a saved or bought template, current status is {0:?}")]
    NotEligible(EntitlementStatus),
    #[error("Status is already {0}")]
    Unchanged(String),
}

/// Validates if an entitlement transition is allowed
pub fn validate_transition(
    from: EntitlementStatus,
    to: EntitlementStatus,
) -> Result<(), TransitionError> {
    use EntitlementStatus::*;

    match (from, to) {
        // Bought is terminal
        (Bought, _) => Err(TransitionError::AlreadyOwned),

        (a, b) if a == b => Err(TransitionError::Unchanged(a.to_string())),

        // User toggles
        (Free, Saved) => Ok(()),
        (Saved, Free) => Ok(()),

        // Payment confirmation
        (Free, Bought) | (Pending, Bought) | (Saved, Bought) => Ok(()),

        _ => Err(TransitionError::InvalidTransition { from, to }),
    }
}

/// Validates a usage toggle against the current entitlement
pub fn validate_usage_transition(
    entitlement: EntitlementStatus,
    from: UsageStatus,
    to: UsageStatus,
) -> Result<(), TransitionError> {
    if !entitlement.allows_usage() {
        return Err(TransitionError::NotEligible(entitlement));
    }
    if from == to {
        return Err(TransitionError::Unchanged(from.to_string()));
    }
    Ok(())
}
