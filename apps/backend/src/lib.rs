#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod domain;
pub mod entities;
pub mod error;
pub mod errors;
pub mod events;
pub mod infra;
pub mod middleware;
pub mod routes;
pub mod scheduler;
pub mod services;
pub mod state;
pub mod store;
pub mod test_support;
pub mod trace_ctx;

// Re-exports for public API
pub use config::league::LeagueConfig;
pub use domain::tier::LeagueTier;
pub use error::AppError;
pub use events::{XpAwarded, XpEventBus};
pub use infra::db::connect_db;
pub use services::league::LeagueService;
pub use services::promotion::{PromotionService, PromotionSummary};
pub use state::app_state::AppState;
pub use store::LeagueStore;
