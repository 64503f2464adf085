//! In-memory [`LeagueStore`] implementation.
//!
//! Mirrors the semantics of the SeaORM store closely enough for service and
//! route tests: upsert-by-user-id, atomic-looking increments, grouped counts
//! and append-only history. Supports per-user write-failure injection for
//! batch isolation tests.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::tier::LeagueTier;
use crate::errors::domain::{DomainError, InfraErrorKind, NotFoundKind};
use crate::store::{
    GroupCount, HistoryEntry, LeagueStore, Membership, NewHistoryEntry, TierInfo, UserProfile,
};

#[derive(Default)]
pub struct MemoryStore {
    memberships: RwLock<HashMap<Uuid, Membership>>,
    history: RwLock<Vec<HistoryEntry>>,
    catalog: RwLock<Vec<TierInfo>>,
    profiles: RwLock<HashMap<Uuid, UserProfile>>,
    failing_writes: Mutex<HashSet<Uuid>>,
}

impl MemoryStore {
    /// Store with the five-tier catalog pre-seeded, as the migration would.
    pub fn new() -> Self {
        let store = Self::without_catalog();
        {
            let mut catalog = store.catalog.write();
            for tier in LeagueTier::ALL {
                catalog.push(TierInfo {
                    tier,
                    name: format!("{} League", capitalize(tier.as_str())),
                    description: format!("The {} league tier", tier.as_str()),
                    icon_url: format!("/icons/leagues/{}.svg", tier.as_str()),
                });
            }
        }
        store
    }

    /// Store with no tiers seeded, for configuration-missing scenarios.
    pub fn without_catalog() -> Self {
        Self::default()
    }

    /// Register a profile row as the upstream platform would.
    pub fn add_profile(
        &self,
        user_id: Uuid,
        username: &str,
        display_name: Option<&str>,
        level: i32,
    ) {
        self.profiles.write().insert(
            user_id,
            UserProfile {
                user_id,
                username: Some(username.to_string()),
                display_name: display_name.map(|s| s.to_string()),
                avatar_url: None,
                level,
            },
        );
    }

    /// Make every subsequent write (upsert/increment) for this user fail.
    pub fn fail_writes_for(&self, user_id: Uuid) {
        self.failing_writes.lock().insert(user_id);
    }

    fn check_writable(&self, user_id: Uuid) -> Result<(), DomainError> {
        if self.failing_writes.lock().contains(&user_id) {
            return Err(DomainError::infra(
                InfraErrorKind::Other("Injected".into()),
                format!("injected write failure for user {user_id}"),
            ));
        }
        Ok(())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

#[async_trait]
impl LeagueStore for MemoryStore {
    async fn get_membership(&self, user_id: Uuid) -> Result<Option<Membership>, DomainError> {
        Ok(self.memberships.read().get(&user_id).cloned())
    }

    async fn upsert_membership(
        &self,
        user_id: Uuid,
        tier: LeagueTier,
        group_id: &str,
    ) -> Result<Membership, DomainError> {
        self.check_writable(user_id)?;
        let membership = Membership {
            user_id,
            tier,
            group_id: group_id.to_string(),
            weekly_score: 0,
            joined_at: OffsetDateTime::now_utc(),
        };
        self.memberships.write().insert(user_id, membership.clone());
        Ok(membership)
    }

    async fn increment_score(
        &self,
        user_id: Uuid,
        amount: i64,
    ) -> Result<Membership, DomainError> {
        self.check_writable(user_id)?;
        let mut memberships = self.memberships.write();
        let membership = memberships.get_mut(&user_id).ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Membership,
                format!("no membership for user {user_id}"),
            )
        })?;
        membership.weekly_score += amount;
        Ok(membership.clone())
    }

    async fn list_group_members(
        &self,
        tier: LeagueTier,
        group_id: &str,
    ) -> Result<Vec<Membership>, DomainError> {
        Ok(self
            .memberships
            .read()
            .values()
            .filter(|m| m.tier == tier && m.group_id == group_id)
            .cloned()
            .collect())
    }

    async fn list_distinct_groups(
        &self,
        tier: LeagueTier,
    ) -> Result<Vec<GroupCount>, DomainError> {
        let mut counts: HashMap<String, u32> = HashMap::new();
        for m in self.memberships.read().values() {
            if m.tier == tier {
                *counts.entry(m.group_id.clone()).or_default() += 1;
            }
        }
        let mut groups: Vec<GroupCount> = counts
            .into_iter()
            .map(|(group_id, members)| GroupCount { group_id, members })
            .collect();
        groups.sort_by(|a, b| a.group_id.cmp(&b.group_id));
        Ok(groups)
    }

    async fn reset_all_scores(&self) -> Result<u64, DomainError> {
        let mut memberships = self.memberships.write();
        for m in memberships.values_mut() {
            m.weekly_score = 0;
        }
        Ok(memberships.len() as u64)
    }

    async fn insert_history(&self, entry: NewHistoryEntry) -> Result<(), DomainError> {
        self.history.write().push(HistoryEntry {
            user_id: entry.user_id,
            from_tier: entry.from_tier,
            to_tier: entry.to_tier,
            action: entry.action,
            final_rank: entry.final_rank,
            weekly_xp: entry.weekly_xp,
            week_start: entry.week_start,
            week_end: entry.week_end,
            created_at: OffsetDateTime::now_utc(),
        });
        Ok(())
    }

    async fn list_history(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> Result<Vec<HistoryEntry>, DomainError> {
        let mut entries: Vec<HistoryEntry> = self
            .history
            .read()
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        // most recent first; insertion order breaks timestamp ties
        entries.reverse();
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        entries.truncate(limit as usize);
        Ok(entries)
    }

    async fn get_tier_catalog(&self) -> Result<Vec<TierInfo>, DomainError> {
        Ok(self.catalog.read().clone())
    }

    async fn find_tier_info(&self, tier: LeagueTier) -> Result<Option<TierInfo>, DomainError> {
        Ok(self
            .catalog
            .read()
            .iter()
            .find(|t| t.tier == tier)
            .cloned())
    }

    async fn get_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<UserProfile>, DomainError> {
        let profiles = self.profiles.read();
        Ok(user_ids
            .iter()
            .filter_map(|id| profiles.get(id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_replaces_and_resets_score() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();

        store
            .upsert_membership(user, LeagueTier::Bronze, "bronze-0")
            .await
            .unwrap();
        store.increment_score(user, 90).await.unwrap();

        let moved = store
            .upsert_membership(user, LeagueTier::Silver, "silver-0")
            .await
            .unwrap();
        assert_eq!(moved.weekly_score, 0);
        assert_eq!(moved.tier, LeagueTier::Silver);

        // still exactly one membership for the user
        assert_eq!(store.memberships.read().len(), 1);
    }

    #[tokio::test]
    async fn increment_without_membership_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .increment_score(Uuid::new_v4(), 10)
            .await
            .unwrap_err();
        assert!(err.is_not_found(&NotFoundKind::Membership));
    }

    #[tokio::test]
    async fn distinct_groups_counts_members() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            store
                .upsert_membership(Uuid::new_v4(), LeagueTier::Gold, "gold-0")
                .await
                .unwrap();
        }
        store
            .upsert_membership(Uuid::new_v4(), LeagueTier::Gold, "gold-1")
            .await
            .unwrap();

        let groups = store.list_distinct_groups(LeagueTier::Gold).await.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group_id, "gold-0");
        assert_eq!(groups[0].members, 3);
        assert_eq!(groups[1].members, 1);
    }
}
