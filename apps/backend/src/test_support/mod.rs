//! Test doubles and helpers shared by unit and integration tests.
//!
//! Kept in the library (not `#[cfg(test)]`) so the `tests/` binaries can
//! exercise the full service stack without a database.

pub mod memory_store;

use std::sync::Arc;

use crate::config::league::LeagueConfig;
use crate::events::spawn_consumer;
use crate::state::app_state::AppState;
use crate::store::LeagueStore;

pub use memory_store::MemoryStore;

/// App state over an injected store with the XP consumer task running.
/// Must be called from within a Tokio runtime.
pub fn memory_app_state(store: Arc<dyn LeagueStore>) -> AppState {
    let (state, rx) = AppState::build(None, store, LeagueConfig::default());
    spawn_consumer(state.league.clone(), rx);
    state
}
