use crate::domain::entities::Session;
use crate::domain::errors::ApiResult;
use crate::models::TopTemplateStat;
use async_trait::async_trait;

/// Admin dashboard endpoints under `/stats`
#[async_trait]
pub trait StatsApi: Send + Sync {
    async fn users_count(&self, session: &Session) -> ApiResult<u64>;
    async fn templates_count(&self, session: &Session) -> ApiResult<u64>;
    async fn revenue(&self, session: &Session) -> ApiResult<f64>;
    async fn pending_payments(&self, session: &Session) -> ApiResult<u64>;
    async fn top_templates(&self, session: &Session) -> ApiResult<Vec<TopTemplateStat>>;
}
