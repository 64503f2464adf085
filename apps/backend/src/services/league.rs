//! League membership and read-side service.
//!
//! Owns group assignment, lazy enrollment into Bronze, weekly score
//! ingestion, and the read APIs the HTTP layer serializes. All persistence
//! goes through the injected [`LeagueStore`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::league::LeagueConfig;
use crate::domain::ranking::rank_members;
use crate::domain::tier::LeagueTier;
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::store::{LeagueStore, Membership, TierInfo};

/// League info for a single user, ready for JSON serialization.
#[derive(Debug, Clone, Serialize)]
pub struct UserLeagueInfo {
    pub tier: LeagueTier,
    pub name: String,
    pub description: String,
    pub icon_url: String,
    pub weekly_score: i64,
    pub rank_in_group: u32,
    pub group_size: u32,
    pub group_id: String,
}

/// One row of a group leaderboard.
#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: Uuid,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub weekly_score: i64,
    pub level: i32,
    pub is_current_user: bool,
}

/// Full standings for the group a user belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct GroupLeaderboard {
    pub tier: LeagueTier,
    pub group_id: String,
    pub user_rank: u32,
    pub rankings: Vec<LeaderboardEntry>,
}

/// Default and maximum page sizes for history reads.
pub const DEFAULT_HISTORY_LIMIT: u64 = 20;
pub const MAX_HISTORY_LIMIT: u64 = 100;

#[derive(Clone)]
pub struct LeagueService {
    store: Arc<dyn LeagueStore>,
    config: LeagueConfig,
}

impl LeagueService {
    pub fn new(store: Arc<dyn LeagueStore>, config: LeagueConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<dyn LeagueStore> {
        &self.store
    }

    pub fn config(&self) -> &LeagueConfig {
        &self.config
    }

    /// Pick the group a user entering `tier` should join.
    ///
    /// Fills the first under-capacity group; only when every existing group
    /// is full does it mint a fresh id. The candidate id starts at the count
    /// of existing groups and bumps past collisions, so the first-ever user
    /// in a tier lands in `{tier}-0`.
    pub async fn available_group(&self, tier: LeagueTier) -> Result<String, DomainError> {
        let groups = self.store.list_distinct_groups(tier).await?;

        for group in &groups {
            if group.members < self.config.group_capacity {
                return Ok(group.group_id.clone());
            }
        }

        let taken: HashSet<&str> = groups.iter().map(|g| g.group_id.as_str()).collect();
        let mut n = groups.len();
        loop {
            let candidate = format!("{}-{}", tier.as_str(), n);
            if !taken.contains(candidate.as_str()) {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    /// Idempotent enrollment: returns the existing membership untouched, or
    /// creates a Bronze one in a group with available capacity.
    ///
    /// Returns `Ok(None)` when the Bronze catalog row has not been seeded
    /// yet; the platform self-heals once tiers exist, so this is a logged
    /// warning rather than a hard failure.
    pub async fn ensure_membership(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Membership>, DomainError> {
        if let Some(existing) = self.store.get_membership(user_id).await? {
            return Ok(Some(existing));
        }

        if self
            .store
            .find_tier_info(LeagueTier::Bronze)
            .await?
            .is_none()
        {
            warn!(%user_id, "bronze tier not seeded; cannot assign membership");
            return Ok(None);
        }

        let group_id = self.available_group(LeagueTier::Bronze).await?;
        let membership = self
            .store
            .upsert_membership(user_id, LeagueTier::Bronze, &group_id)
            .await?;
        info!(%user_id, group_id = %membership.group_id, "assigned new bronze membership");
        Ok(Some(membership))
    }

    /// Handle an XP-awarded event: bump the weekly score, lazily enrolling
    /// the user first if needed.
    ///
    /// Best-effort by design: when enrollment is impossible or the single
    /// retry fails, the event is dropped with a warning and `Ok(None)` is
    /// returned. The XP award itself lives upstream and is not rolled back.
    pub async fn record_xp(
        &self,
        user_id: Uuid,
        amount: i64,
    ) -> Result<Option<Membership>, DomainError> {
        if amount <= 0 {
            return Err(DomainError::validation(format!(
                "xp amount must be positive, got {amount}"
            )));
        }

        match self.store.increment_score(user_id, amount).await {
            Ok(membership) => Ok(Some(membership)),
            Err(e) if e.is_not_found(&NotFoundKind::Membership) => {
                if self.ensure_membership(user_id).await?.is_none() {
                    warn!(%user_id, amount, "dropping xp event: no membership could be assigned");
                    return Ok(None);
                }
                match self.store.increment_score(user_id, amount).await {
                    Ok(membership) => Ok(Some(membership)),
                    Err(retry_err) => {
                        warn!(%user_id, amount, error = %retry_err, "dropping xp event after retry");
                        Ok(None)
                    }
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Current tier, score and live in-group rank for one user.
    pub async fn get_user_league_info(
        &self,
        user_id: Uuid,
    ) -> Result<UserLeagueInfo, DomainError> {
        let membership = self.require_membership(user_id).await?;
        let tier_info = self.require_tier_info(membership.tier).await?;

        let members = self
            .store
            .list_group_members(membership.tier, &membership.group_id)
            .await?;
        let group_size = members.len() as u32;
        let ranked = rank_members(members);
        let rank_in_group = ranked
            .iter()
            .find(|r| r.member.user_id == user_id)
            .map(|r| r.rank)
            .ok_or_else(|| {
                DomainError::not_found(
                    NotFoundKind::Membership,
                    format!("user {user_id} missing from own group"),
                )
            })?;

        Ok(UserLeagueInfo {
            tier: membership.tier,
            name: tier_info.name,
            description: tier_info.description,
            icon_url: tier_info.icon_url,
            weekly_score: membership.weekly_score,
            rank_in_group,
            group_size,
            group_id: membership.group_id,
        })
    }

    /// Fresh standings for the caller's group, enriched with profile data.
    pub async fn get_group_leaderboard(
        &self,
        user_id: Uuid,
    ) -> Result<GroupLeaderboard, DomainError> {
        let membership = self.require_membership(user_id).await?;

        let members = self
            .store
            .list_group_members(membership.tier, &membership.group_id)
            .await?;
        let ranked = rank_members(members);

        let ids: Vec<Uuid> = ranked.iter().map(|r| r.member.user_id).collect();
        let profiles: HashMap<Uuid, _> = self
            .store
            .get_profiles(&ids)
            .await?
            .into_iter()
            .map(|p| (p.user_id, p))
            .collect();

        let mut user_rank = 0;
        let rankings = ranked
            .into_iter()
            .map(|r| {
                let is_current_user = r.member.user_id == user_id;
                if is_current_user {
                    user_rank = r.rank;
                }
                let profile = profiles.get(&r.member.user_id);
                let username = profile
                    .and_then(|p| p.username.clone())
                    .unwrap_or_else(|| "unknown".to_string());
                LeaderboardEntry {
                    rank: r.rank,
                    user_id: r.member.user_id,
                    display_name: profile
                        .and_then(|p| p.display_name.clone())
                        .unwrap_or_else(|| username.clone()),
                    username,
                    avatar_url: profile.and_then(|p| p.avatar_url.clone()),
                    weekly_score: r.member.weekly_score,
                    level: profile.map(|p| p.level).unwrap_or(1),
                    is_current_user,
                }
            })
            .collect();

        debug!(%user_id, tier = %membership.tier, group_id = %membership.group_id, "leaderboard read");

        Ok(GroupLeaderboard {
            tier: membership.tier,
            group_id: membership.group_id,
            user_rank,
            rankings,
        })
    }

    /// Promotion history, most recent first. `limit` defaults to
    /// [`DEFAULT_HISTORY_LIMIT`] and is capped at [`MAX_HISTORY_LIMIT`].
    pub async fn get_history(
        &self,
        user_id: Uuid,
        limit: Option<u64>,
    ) -> Result<Vec<crate::store::HistoryEntry>, DomainError> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        if limit == 0 {
            return Err(DomainError::validation("history limit must be positive"));
        }
        self.store
            .list_history(user_id, limit.min(MAX_HISTORY_LIMIT))
            .await
    }

    /// Public tier catalog in ladder order. No auth, no membership required.
    pub async fn get_all_tiers(&self) -> Result<Vec<TierInfo>, DomainError> {
        self.store.get_tier_catalog().await
    }

    async fn require_membership(&self, user_id: Uuid) -> Result<Membership, DomainError> {
        self.store.get_membership(user_id).await?.ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Membership,
                format!("user {user_id} has no league membership"),
            )
        })
    }

    async fn require_tier_info(&self, tier: LeagueTier) -> Result<TierInfo, DomainError> {
        self.store.find_tier_info(tier).await?.ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Tier,
                format!("tier {tier} missing from catalog"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::memory_store::MemoryStore;

    fn service(store: Arc<MemoryStore>) -> LeagueService {
        LeagueService::new(store, LeagueConfig::default())
    }

    #[tokio::test]
    async fn ensure_membership_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let user = Uuid::new_v4();

        let first = svc.ensure_membership(user).await.unwrap().unwrap();
        assert_eq!(first.tier, LeagueTier::Bronze);
        assert_eq!(first.group_id, "bronze-0");

        store.increment_score(user, 42).await.unwrap();

        // second call is a no-op: same group, score untouched
        let second = svc.ensure_membership(user).await.unwrap().unwrap();
        assert_eq!(second.group_id, "bronze-0");
        assert_eq!(second.weekly_score, 42);
    }

    #[tokio::test]
    async fn ensure_membership_without_seeded_tiers_yields_none() {
        let store = Arc::new(MemoryStore::without_catalog());
        let svc = service(store);

        let result = svc.ensure_membership(Uuid::new_v4()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn available_group_prefers_existing_capacity() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        // 29 members in bronze-0 leaves one seat
        for _ in 0..29 {
            store
                .upsert_membership(Uuid::new_v4(), LeagueTier::Bronze, "bronze-0")
                .await
                .unwrap();
        }
        assert_eq!(
            svc.available_group(LeagueTier::Bronze).await.unwrap(),
            "bronze-0"
        );

        // fill the last seat; the next assignment must mint a new group
        store
            .upsert_membership(Uuid::new_v4(), LeagueTier::Bronze, "bronze-0")
            .await
            .unwrap();
        assert_eq!(
            svc.available_group(LeagueTier::Bronze).await.unwrap(),
            "bronze-1"
        );
    }

    #[tokio::test]
    async fn record_xp_lazily_enrolls_and_keeps_amount() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store);
        let user = Uuid::new_v4();

        let membership = svc.record_xp(user, 150).await.unwrap().unwrap();
        assert_eq!(membership.tier, LeagueTier::Bronze);
        assert_eq!(membership.weekly_score, 150);
    }

    #[tokio::test]
    async fn record_xp_rejects_non_positive_amounts() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store);

        let err = svc.record_xp(Uuid::new_v4(), 0).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn league_info_reports_live_rank() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        svc.record_xp(alice, 100).await.unwrap();
        svc.record_xp(bob, 300).await.unwrap();

        let info = svc.get_user_league_info(alice).await.unwrap();
        assert_eq!(info.rank_in_group, 2);
        assert_eq!(info.group_size, 2);
        assert_eq!(info.weekly_score, 100);
        assert_eq!(info.name, "Bronze League");
    }

    #[tokio::test]
    async fn league_info_for_stranger_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store);

        let err = svc.get_user_league_info(Uuid::new_v4()).await.unwrap_err();
        assert!(err.is_not_found(&NotFoundKind::Membership));
    }

    #[tokio::test]
    async fn leaderboard_marks_current_user_and_enriches_profiles() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        store.add_profile(alice, "alice", Some("Alice A."), 7);
        svc.record_xp(alice, 500).await.unwrap();
        svc.record_xp(bob, 200).await.unwrap();

        let board = svc.get_group_leaderboard(alice).await.unwrap();
        assert_eq!(board.user_rank, 1);
        assert_eq!(board.rankings.len(), 2);

        let top = &board.rankings[0];
        assert!(top.is_current_user);
        assert_eq!(top.username, "alice");
        assert_eq!(top.display_name, "Alice A.");
        assert_eq!(top.level, 7);

        // bob has no profile row; placeholders instead of an error
        let second = &board.rankings[1];
        assert_eq!(second.username, "unknown");
        assert_eq!(second.level, 1);
    }

    #[tokio::test]
    async fn history_limit_zero_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store);

        let err = svc.get_history(Uuid::new_v4(), Some(0)).await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn tier_catalog_is_in_ladder_order() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store);

        let tiers = svc.get_all_tiers().await.unwrap();
        let order: Vec<LeagueTier> = tiers.iter().map(|t| t.tier).collect();
        assert_eq!(order, LeagueTier::ALL.to_vec());
    }
}
