use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum TemplateCategory {
    Free,
    Premium,
}

impl fmt::Display for TemplateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateCategory::Free => write!(f, "free"),
            TemplateCategory::Premium => write!(f, "premium"),
        }
    }
}

// The admin endpoints send "Premium", the catalogue sends "premium"
impl From<String> for TemplateCategory {
    fn from(s: String) -> Self {
        if s.trim().eq_ignore_ascii_case("premium") {
            TemplateCategory::Premium
        } else {
            TemplateCategory::Free
        }
    }
}

/// Read-only reference data for a profile template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub slug: String,
    pub name: String,
    pub category: TemplateCategory,
    #[serde(default, deserialize_with = "amount::optional")]
    pub price: Option<f64>,
    #[serde(default, rename = "originalPrice", alias = "original_price", deserialize_with = "amount::optional")]
    pub original_price: Option<f64>,
    #[serde(default)]
    pub layout: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "isNew", alias = "is_new")]
    pub is_new: bool,
    #[serde(default, rename = "isPopular", alias = "is_popular")]
    pub is_popular: bool,
}

impl Template {
    pub fn free(slug: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            category: TemplateCategory::Free,
            price: None,
            original_price: None,
            layout: String::new(),
            description: None,
            is_new: false,
            is_popular: false,
        }
    }

    pub fn premium(slug: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            category: TemplateCategory::Premium,
            price: Some(price),
            ..Self::free(slug, name)
        }
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    pub fn is_premium(&self) -> bool {
        self.category == TemplateCategory::Premium
    }
}

/// Money fields arrive either as JSON numbers or as decimal strings ("199.00")
pub mod amount {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    fn parse(raw: Raw) -> Option<f64> {
        match raw {
            Raw::Number(n) => Some(n),
            Raw::Text(s) => s.trim().replace(',', "").parse().ok(),
        }
    }

    pub fn optional<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Raw>::deserialize(deserializer)?.and_then(parse))
    }

    pub fn or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(optional(deserializer)?.unwrap_or(0.0))
    }
}
