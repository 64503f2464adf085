//! Store seam between the league engine and persistence.
//!
//! Services depend on `LeagueStore` only; the SeaORM implementation lives in
//! [`sea`] and an in-memory double for tests in `crate::test_support`. The
//! store is injected through `AppState`, never reached for ambiently.

pub mod sea;

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::promotion::LeagueAction;
use crate::domain::tier::LeagueTier;
use crate::errors::domain::DomainError;

pub use sea::SeaLeagueStore;

/// A user's current placement in the league system.
#[derive(Debug, Clone, PartialEq)]
pub struct Membership {
    pub user_id: Uuid,
    pub tier: LeagueTier,
    pub group_id: String,
    pub weekly_score: i64,
    pub joined_at: OffsetDateTime,
}

/// One group id within a tier with its current member count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub group_id: String,
    pub members: u32,
}

/// Displayable tier catalog row, seeded by the migration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierInfo {
    pub tier: LeagueTier,
    pub name: String,
    pub description: String,
    pub icon_url: String,
}

/// Immutable audit record for one user's outcome in one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub user_id: Uuid,
    pub from_tier: LeagueTier,
    pub to_tier: LeagueTier,
    pub action: LeagueAction,
    pub final_rank: u32,
    pub weekly_xp: i64,
    pub week_start: OffsetDateTime,
    pub week_end: OffsetDateTime,
    pub created_at: OffsetDateTime,
}

/// History record as produced by the promotion run, before persistence
/// assigns `created_at`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHistoryEntry {
    pub user_id: Uuid,
    pub from_tier: LeagueTier,
    pub to_tier: LeagueTier,
    pub action: LeagueAction,
    pub final_rank: u32,
    pub weekly_xp: i64,
    pub week_start: OffsetDateTime,
    pub week_end: OffsetDateTime,
}

/// Read-side profile data for leaderboard display. Provisioned upstream;
/// the engine tolerates missing rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub user_id: Uuid,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub level: i32,
}

/// Persistence operations the league engine requires.
#[async_trait]
pub trait LeagueStore: Send + Sync {
    /// Current membership for a user, if any.
    async fn get_membership(&self, user_id: Uuid) -> Result<Option<Membership>, DomainError>;

    /// Create or replace the user's membership. Resets `weekly_score` to 0
    /// and `joined_at` to now. Must replace, never duplicate.
    async fn upsert_membership(
        &self,
        user_id: Uuid,
        tier: LeagueTier,
        group_id: &str,
    ) -> Result<Membership, DomainError>;

    /// Atomically add to the user's weekly score.
    /// Fails with `NotFound(Membership)` when no membership exists.
    async fn increment_score(
        &self,
        user_id: Uuid,
        amount: i64,
    ) -> Result<Membership, DomainError>;

    /// All memberships in one (tier, group). Unordered.
    async fn list_group_members(
        &self,
        tier: LeagueTier,
        group_id: &str,
    ) -> Result<Vec<Membership>, DomainError>;

    /// Group ids in use within a tier, with member counts, ordered by group id.
    async fn list_distinct_groups(&self, tier: LeagueTier)
        -> Result<Vec<GroupCount>, DomainError>;

    /// Zero every membership's weekly score. Returns the number of rows touched.
    async fn reset_all_scores(&self) -> Result<u64, DomainError>;

    /// Append one audit record. Records are never mutated or deleted.
    async fn insert_history(&self, entry: NewHistoryEntry) -> Result<(), DomainError>;

    /// A user's history, most recent first.
    async fn list_history(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> Result<Vec<HistoryEntry>, DomainError>;

    /// The seeded tier catalog in tier order.
    async fn get_tier_catalog(&self) -> Result<Vec<TierInfo>, DomainError>;

    /// Catalog row for one tier, if seeded.
    async fn find_tier_info(&self, tier: LeagueTier) -> Result<Option<TierInfo>, DomainError>;

    /// Profiles for the given users; absent users are simply omitted.
    async fn get_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<UserProfile>, DomainError>;
}
