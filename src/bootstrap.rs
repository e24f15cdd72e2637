use crate::config::Config;
use crate::domain::entities::Session;
use crate::domain::errors::ApiResult;
use crate::events::EventBus;
use crate::infrastructure::http::HttpTemplateApi;
use crate::infrastructure::payment::DeferredCheckout;
use crate::services::stats_service::StatsService;
use crate::services::tracker::TrackerDeps;
use std::sync::Arc;

/// Everything a host needs to mount template views and read admin stats
#[derive(Clone)]
pub struct AppContext {
    pub api: Arc<HttpTemplateApi>,
    pub deps: TrackerDeps,
    pub stats: StatsService,
    pub session: Session,
    pub public_url: String,
}

pub fn build_app_context(config: &Config) -> ApiResult<AppContext> {
    let api = Arc::new(HttpTemplateApi::new(&config.api_url, config.http_timeout)?);
    tracing::debug!("Template API client targeting {}", api.base_url());

    let events = EventBus::new(config.event_capacity);
    let payment_ui = Arc::new(DeferredCheckout::new(&config.public_url));

    let deps = TrackerDeps {
        api: api.clone(),
        payment_ui,
        events,
    };

    let session = Session::from_optional(config.api_token.clone());
    if !session.is_authenticated() {
        tracing::warn!("JUANTAP_TOKEN is not set; requests will be refused");
    }

    Ok(AppContext {
        stats: StatsService::new(api.clone()),
        api,
        deps,
        session,
        public_url: config.public_url.clone(),
    })
}
