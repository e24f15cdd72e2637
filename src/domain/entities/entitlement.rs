use serde::{Deserialize, Serialize};
use std::fmt;

/// The user's right to use a template.
///
/// Variants are declared in merge precedence order, so `Ord` gives
/// `Free < Saved < Pending < Bought`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntitlementStatus {
    Free,
    Saved,
    Pending,
    Bought,
}

impl EntitlementStatus {
    /// Parse a status string sent by the backend; unknown values yield `None`
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Some(EntitlementStatus::Free),
            "saved" => Some(EntitlementStatus::Saved),
            "pending" => Some(EntitlementStatus::Pending),
            "bought" => Some(EntitlementStatus::Bought),
            _ => None,
        }
    }

    /// Saved and bought templates may be marked as used
    pub fn allows_usage(self) -> bool {
        matches!(self, EntitlementStatus::Saved | EntitlementStatus::Bought)
    }
}

impl fmt::Display for EntitlementStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntitlementStatus::Free => write!(f, "free"),
            EntitlementStatus::Saved => write!(f, "saved"),
            EntitlementStatus::Pending => write!(f, "pending"),
            EntitlementStatus::Bought => write!(f, "bought"),
        }
    }
}

/// Whether the template is the one currently published for the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UsageStatus {
    Used,
    #[default]
    Unused,
}

impl fmt::Display for UsageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageStatus::Used => write!(f, "used"),
            UsageStatus::Unused => write!(f, "unused"),
        }
    }
}

/// A single field change applied to an entitlement store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Entitlement(EntitlementStatus),
    Usage(UsageStatus),
}

impl From<EntitlementStatus> for Transition {
    fn from(status: EntitlementStatus) -> Self {
        Transition::Entitlement(status)
    }
}

impl From<UsageStatus> for Transition {
    fn from(status: UsageStatus) -> Self {
        Transition::Usage(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precedence_order() {
        assert!(EntitlementStatus::Bought > EntitlementStatus::Pending);
        assert!(EntitlementStatus::Pending > EntitlementStatus::Saved);
        assert!(EntitlementStatus::Saved > EntitlementStatus::Free);
    }

    #[test]
    fn test_parse_backend_status() {
        assert_eq!(EntitlementStatus::parse("Bought"), Some(EntitlementStatus::Bought));
        assert_eq!(EntitlementStatus::parse(" pending "), Some(EntitlementStatus::Pending));
        assert_eq!(EntitlementStatus::parse("refunded"), None);
    }

    #[test]
    fn test_usage_defaults_to_unused() {
        assert_eq!(UsageStatus::default(), UsageStatus::Unused);
    }
}
