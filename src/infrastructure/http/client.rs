use crate::domain::entities::{Session, Template};
use crate::domain::errors::{ApiError, ApiResult};
use crate::domain::ports::{StatsApi, TemplateApi};
use crate::models::{
    BoughtTemplateRecord, BoughtTemplatesResponse, CountResponse, RevenueResponse,
    SavedTemplateRecord, TopTemplateStat, UsedTemplateRecord, UsedTemplatesResponse,
};
use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

const MAX_ERROR_BODY: usize = 500;

/// reqwest-backed client for the JuanTap REST API
#[derive(Clone, Debug)]
pub struct HttpTemplateApi {
    base_url: String,
    http_client: Client,
}

impl HttpTemplateApi {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Client(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(base_url, http_client))
    }

    pub fn with_client(base_url: impl Into<String>, http_client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Append `segments` to the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ApiError::Client(format!("Invalid API URL {}: {}", self.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Client(format!("API URL {} cannot take a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Build an authorized request; refuses before any I/O when the session
    /// has no credential.
    fn request(
        &self,
        session: &Session,
        method: Method,
        segments: &[&str],
    ) -> ApiResult<RequestBuilder> {
        let token = session.token().ok_or(ApiError::MissingCredential)?;
        Ok(self
            .http_client
            .request(method, self.url(segments)?)
            .bearer_auth(token)
            .header(header::ACCEPT, "application/json"))
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> ApiResult<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!("Request to {} failed: {}", path, e);
            ApiError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let status_code = status.as_u16();
        let message = match response.text().await {
            Ok(body) if body.len() > MAX_ERROR_BODY => {
                let mut end = MAX_ERROR_BODY;
                while !body.is_char_boundary(end) {
                    end -= 1;
                }
                body[..end].to_string()
            }
            Ok(body) => body,
            Err(_) => format!("HTTP {} error", status_code),
        };

        tracing::debug!("{} returned status {}", path, status_code);
        Err(ApiError::from_status(status_code, message))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        session: &Session,
        segments: &[&str],
    ) -> ApiResult<T> {
        let path = segments.join("/");
        let request = self.request(session, Method::GET, segments)?;
        let response = self.send(request, &path).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(format!("{}: {}", path, e)))
    }

    async fn execute(&self, session: &Session, method: Method, segments: &[&str]) -> ApiResult<()> {
        let request = self
            .request(session, method, segments)?
            .header(header::CONTENT_TYPE, "application/json");
        self.send(request, &segments.join("/")).await?;
        Ok(())
    }
}

#[async_trait]
impl TemplateApi for HttpTemplateApi {
    async fn get_template(&self, session: &Session, slug: &str) -> ApiResult<Template> {
        self.get_json(session, &["templates", slug]).await
    }

    async fn list_saved(&self, session: &Session) -> ApiResult<Vec<SavedTemplateRecord>> {
        self.get_json(session, &["templates1", "saved"]).await
    }

    async fn list_bought(&self, session: &Session) -> ApiResult<Vec<BoughtTemplateRecord>> {
        let response: BoughtTemplatesResponse =
            self.get_json(session, &["templates1", "boughted"]).await?;
        Ok(response.data)
    }

    async fn list_used(&self, session: &Session) -> ApiResult<Vec<UsedTemplateRecord>> {
        let response: UsedTemplatesResponse = self.get_json(session, &["templates1", "used"]).await?;
        Ok(response.into())
    }

    async fn save(&self, session: &Session, slug: &str) -> ApiResult<()> {
        self.execute(session, Method::POST, &["templates", "saved", slug])
            .await
    }

    async fn unsave(&self, session: &Session, slug: &str) -> ApiResult<()> {
        self.execute(session, Method::DELETE, &["templates", "saved", slug])
            .await
    }

    async fn mark_used(&self, session: &Session, slug: &str) -> ApiResult<()> {
        self.execute(session, Method::POST, &["templates", "used", slug])
            .await
    }

    async fn mark_unused(&self, session: &Session, slug: &str) -> ApiResult<()> {
        self.execute(session, Method::DELETE, &["templates", "used", slug])
            .await
    }
}

#[async_trait]
impl StatsApi for HttpTemplateApi {
    async fn users_count(&self, session: &Session) -> ApiResult<u64> {
        let response: CountResponse = self.get_json(session, &["stats", "users-count"]).await?;
        Ok(response.count)
    }

    async fn templates_count(&self, session: &Session) -> ApiResult<u64> {
        let response: CountResponse = self.get_json(session, &["stats", "templates-count"]).await?;
        Ok(response.count)
    }

    async fn revenue(&self, session: &Session) -> ApiResult<f64> {
        let response: RevenueResponse = self.get_json(session, &["stats", "revenue"]).await?;
        Ok(response.total)
    }

    async fn pending_payments(&self, session: &Session) -> ApiResult<u64> {
        let response: CountResponse = self.get_json(session, &["stats", "pending-payments"]).await?;
        Ok(response.count)
    }

    async fn top_templates(&self, session: &Session) -> ApiResult<Vec<TopTemplateStat>> {
        self.get_json(session, &["stats", "top-templates"]).await
    }
}
