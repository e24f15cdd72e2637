use crate::domain::entities::{Session, Template};
use crate::domain::errors::ApiResult;
use crate::models::{BoughtTemplateRecord, SavedTemplateRecord, UsedTemplateRecord};
use async_trait::async_trait;

/// REST surface of the template backend consumed by the tracker.
///
/// Every call carries the caller's session; implementations refuse to issue a
/// request without a credential.
#[async_trait]
pub trait TemplateApi: Send + Sync {
    /// `GET /templates/{slug}`
    async fn get_template(&self, session: &Session, slug: &str) -> ApiResult<Template>;

    /// `GET /templates1/saved`
    async fn list_saved(&self, session: &Session) -> ApiResult<Vec<SavedTemplateRecord>>;

    /// `GET /templates1/boughted`, unwrapped from its `{ data }` envelope
    async fn list_bought(&self, session: &Session) -> ApiResult<Vec<BoughtTemplateRecord>>;

    /// `GET /templates1/used`
    async fn list_used(&self, session: &Session) -> ApiResult<Vec<UsedTemplateRecord>>;

    /// `POST /templates/saved/{slug}`
    async fn save(&self, session: &Session, slug: &str) -> ApiResult<()>;

    /// `DELETE /templates/saved/{slug}`
    async fn unsave(&self, session: &Session, slug: &str) -> ApiResult<()>;

    /// `POST /templates/used/{slug}`
    async fn mark_used(&self, session: &Session, slug: &str) -> ApiResult<()>;

    /// `DELETE /templates/used/{slug}`
    async fn mark_unused(&self, session: &Session, slug: &str) -> ApiResult<()>;
}
