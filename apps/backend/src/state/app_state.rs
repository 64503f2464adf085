//! Application state shared across request handlers.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::league::LeagueConfig;
use crate::events::XpEventBus;
use crate::services::league::LeagueService;
use crate::services::promotion::PromotionService;
use crate::store::LeagueStore;

/// Shared resources handed to every handler via `web::Data`.
#[derive(Clone)]
pub struct AppState {
    /// Raw connection, kept for health diagnostics (None when the store is
    /// an in-memory double).
    pub db: Option<DatabaseConnection>,
    pub league: LeagueService,
    pub promotions: Arc<PromotionService>,
    pub xp_bus: XpEventBus,
}

impl AppState {
    /// Wire services around an injected store. Returns the state plus the
    /// receiver half of the XP event bus; the caller decides where the
    /// consumer task runs.
    pub fn build(
        db: Option<DatabaseConnection>,
        store: Arc<dyn LeagueStore>,
        config: LeagueConfig,
    ) -> (Self, tokio::sync::mpsc::Receiver<crate::events::XpAwarded>) {
        let (xp_bus, rx) = XpEventBus::new(1024);
        let state = Self {
            db,
            league: LeagueService::new(store.clone(), config),
            promotions: Arc::new(PromotionService::new(store, config)),
            xp_bus,
        };
        (state, rx)
    }
}
