use crate::domain::entities::entitlement::EntitlementStatus;
use serde::{Deserialize, Serialize};

/// Entry of `GET /templates1/saved`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedTemplateRecord {
    pub slug: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl SavedTemplateRecord {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            status: Some("saved".to_string()),
        }
    }

    /// A saved-list entry without a usable status still means "saved"
    pub fn entitlement(&self) -> EntitlementStatus {
        self.status
            .as_deref()
            .and_then(EntitlementStatus::parse)
            .unwrap_or(EntitlementStatus::Saved)
    }
}

/// Entry of `GET /templates1/boughted`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoughtTemplateRecord {
    pub slug: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl BoughtTemplateRecord {
    pub fn new(slug: impl Into<String>, status: EntitlementStatus) -> Self {
        Self {
            slug: slug.into(),
            status: Some(status.to_string()),
        }
    }

    /// Only an explicit "bought" confirms a purchase; anything else on this
    /// list is a purchase request still awaiting approval.
    pub fn entitlement(&self) -> EntitlementStatus {
        match self.status.as_deref().and_then(EntitlementStatus::parse) {
            Some(EntitlementStatus::Bought) => EntitlementStatus::Bought,
            _ => EntitlementStatus::Pending,
        }
    }
}

/// Envelope of `GET /templates1/boughted`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoughtTemplatesResponse {
    #[serde(default)]
    pub data: Vec<BoughtTemplateRecord>,
}

/// Entry of `GET /templates1/used`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsedTemplateRecord {
    pub slug: String,
}

impl UsedTemplateRecord {
    pub fn new(slug: impl Into<String>) -> Self {
        Self { slug: slug.into() }
    }
}

/// `GET /templates1/used` answers with either one record or a short list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum UsedTemplatesResponse {
    Many(Vec<UsedTemplateRecord>),
    One(UsedTemplateRecord),
}

impl From<UsedTemplatesResponse> for Vec<UsedTemplateRecord> {
    fn from(response: UsedTemplatesResponse) -> Self {
        match response {
            UsedTemplatesResponse::Many(records) => records,
            UsedTemplatesResponse::One(record) => vec![record],
        }
    }
}
