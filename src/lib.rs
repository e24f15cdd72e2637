pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod events;
pub mod infrastructure;
pub mod models;
pub mod services;

pub use config::*;
pub use domain::entities::*;
pub use domain::{ApiError, ApiResult, FailureKind};
pub use events::{EventBus, Lookup, TrackerEvent};
pub use services::*;
