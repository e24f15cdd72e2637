use crate::domain::entities::template::{amount, TemplateCategory};
use serde::{Deserialize, Serialize};

/// `{ "count": n }` answered by the counting stats endpoints
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CountResponse {
    #[serde(default)]
    pub count: u64,
}

/// `{ "total": amount }` answered by `/stats/revenue`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RevenueResponse {
    #[serde(default, deserialize_with = "amount::or_zero")]
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    #[default]
    #[serde(other)]
    Down,
}

/// Row of `/stats/top-templates`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopTemplateStat {
    pub id: serde_json::Value,
    pub name: String,
    pub category: TemplateCategory,
    #[serde(default)]
    pub unlocks: Option<u64>,
    #[serde(default)]
    pub saves: Option<u64>,
    #[serde(default, deserialize_with = "amount::or_zero")]
    pub revenue: f64,
    #[serde(default)]
    pub trend: Trend,
}

impl TopTemplateStat {
    pub fn unlocks(&self) -> u64 {
        self.unlocks.unwrap_or(0)
    }

    pub fn saves(&self) -> u64 {
        self.saves.unwrap_or(0)
    }
}
