pub mod action_panel;
pub mod entitlement_store;
pub mod mutation_controller;
pub mod payment_bridge;
pub mod state_machine;
pub mod stats_service;
pub mod status_fetcher;
pub mod tracker;

pub use action_panel::*;
pub use entitlement_store::*;
pub use mutation_controller::*;
pub use payment_bridge::*;
pub use state_machine::*;
pub use stats_service::*;
pub use status_fetcher::*;
pub use tracker::*;
