pub mod stats_api;
pub mod template_api;

pub use stats_api::StatsApi;
pub use template_api::TemplateApi;
