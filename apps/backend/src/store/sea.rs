//! SeaORM-backed implementation of [`LeagueStore`].

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter, QueryOrder, QuerySelect,
    Set,
};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::tier::LeagueTier;
use crate::entities::{league_history, league_memberships, league_tiers, users};
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::infra::db_errors::map_db_err;
use crate::store::{
    GroupCount, HistoryEntry, LeagueStore, Membership, NewHistoryEntry, TierInfo, UserProfile,
};

/// Production store over a pooled database connection.
#[derive(Debug, Clone)]
pub struct SeaLeagueStore {
    db: DatabaseConnection,
}

impl SeaLeagueStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl From<league_memberships::Model> for Membership {
    fn from(model: league_memberships::Model) -> Self {
        Self {
            user_id: model.user_id,
            tier: model.tier,
            group_id: model.group_id,
            weekly_score: model.weekly_score,
            joined_at: model.joined_at,
        }
    }
}

impl From<league_history::Model> for HistoryEntry {
    fn from(model: league_history::Model) -> Self {
        Self {
            user_id: model.user_id,
            from_tier: model.from_tier,
            to_tier: model.to_tier,
            action: model.action,
            final_rank: model.final_rank.max(0) as u32,
            weekly_xp: model.weekly_xp,
            week_start: model.week_start,
            week_end: model.week_end,
            created_at: model.created_at,
        }
    }
}

impl From<league_tiers::Model> for TierInfo {
    fn from(model: league_tiers::Model) -> Self {
        Self {
            tier: model.tier,
            name: model.name,
            description: model.description,
            icon_url: model.icon_url,
        }
    }
}

impl From<users::Model> for UserProfile {
    fn from(model: users::Model) -> Self {
        Self {
            user_id: model.id,
            username: model.username,
            display_name: model.display_name,
            avatar_url: model.avatar_url,
            level: model.level,
        }
    }
}

#[async_trait]
impl LeagueStore for SeaLeagueStore {
    async fn get_membership(&self, user_id: Uuid) -> Result<Option<Membership>, DomainError> {
        let row = league_memberships::Entity::find()
            .filter(league_memberships::Column::UserId.eq(user_id))
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(row.map(Membership::from))
    }

    async fn upsert_membership(
        &self,
        user_id: Uuid,
        tier: LeagueTier,
        group_id: &str,
    ) -> Result<Membership, DomainError> {
        let now = OffsetDateTime::now_utc();
        let active = league_memberships::ActiveModel {
            id: NotSet,
            user_id: Set(user_id),
            tier: Set(tier),
            group_id: Set(group_id.to_string()),
            weekly_score: Set(0),
            joined_at: Set(now),
            created_at: Set(now),
            updated_at: Set(now),
        };

        // One row per user: conflicts on user_id replace the placement
        // in place instead of inserting a second membership.
        league_memberships::Entity::insert(active)
            .on_conflict(
                OnConflict::column(league_memberships::Column::UserId)
                    .update_columns([
                        league_memberships::Column::Tier,
                        league_memberships::Column::GroupId,
                        league_memberships::Column::WeeklyScore,
                        league_memberships::Column::JoinedAt,
                        league_memberships::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        self.get_membership(user_id).await?.ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Membership,
                format!("membership vanished after upsert for user {user_id}"),
            )
        })
    }

    async fn increment_score(
        &self,
        user_id: Uuid,
        amount: i64,
    ) -> Result<Membership, DomainError> {
        let now = OffsetDateTime::now_utc();
        let result = league_memberships::Entity::update_many()
            .col_expr(
                league_memberships::Column::WeeklyScore,
                Expr::col(league_memberships::Column::WeeklyScore).add(amount),
            )
            .col_expr(league_memberships::Column::UpdatedAt, Expr::value(now))
            .filter(league_memberships::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(DomainError::not_found(
                NotFoundKind::Membership,
                format!("no membership for user {user_id}"),
            ));
        }

        self.get_membership(user_id).await?.ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Membership,
                format!("no membership for user {user_id}"),
            )
        })
    }

    async fn list_group_members(
        &self,
        tier: LeagueTier,
        group_id: &str,
    ) -> Result<Vec<Membership>, DomainError> {
        let rows = league_memberships::Entity::find()
            .filter(league_memberships::Column::Tier.eq(tier))
            .filter(league_memberships::Column::GroupId.eq(group_id))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(rows.into_iter().map(Membership::from).collect())
    }

    async fn list_distinct_groups(
        &self,
        tier: LeagueTier,
    ) -> Result<Vec<GroupCount>, DomainError> {
        let rows: Vec<(String, i64)> = league_memberships::Entity::find()
            .select_only()
            .column(league_memberships::Column::GroupId)
            .column_as(league_memberships::Column::Id.count(), "member_count")
            .filter(league_memberships::Column::Tier.eq(tier))
            .group_by(league_memberships::Column::GroupId)
            .order_by_asc(league_memberships::Column::GroupId)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(rows
            .into_iter()
            .map(|(group_id, members)| GroupCount {
                group_id,
                members: members.max(0) as u32,
            })
            .collect())
    }

    async fn reset_all_scores(&self) -> Result<u64, DomainError> {
        let now = OffsetDateTime::now_utc();
        let result = league_memberships::Entity::update_many()
            .col_expr(league_memberships::Column::WeeklyScore, Expr::value(0i64))
            .col_expr(league_memberships::Column::UpdatedAt, Expr::value(now))
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(result.rows_affected)
    }

    async fn insert_history(&self, entry: NewHistoryEntry) -> Result<(), DomainError> {
        let active = league_history::ActiveModel {
            id: NotSet,
            user_id: Set(entry.user_id),
            from_tier: Set(entry.from_tier),
            to_tier: Set(entry.to_tier),
            action: Set(entry.action),
            final_rank: Set(entry.final_rank as i32),
            weekly_xp: Set(entry.weekly_xp),
            week_start: Set(entry.week_start),
            week_end: Set(entry.week_end),
            created_at: Set(OffsetDateTime::now_utc()),
        };
        league_history::Entity::insert(active)
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(())
    }

    async fn list_history(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> Result<Vec<HistoryEntry>, DomainError> {
        let rows = league_history::Entity::find()
            .filter(league_history::Column::UserId.eq(user_id))
            .order_by_desc(league_history::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(rows.into_iter().map(HistoryEntry::from).collect())
    }

    async fn get_tier_catalog(&self) -> Result<Vec<TierInfo>, DomainError> {
        let rows = league_tiers::Entity::find()
            .order_by_asc(league_tiers::Column::SortOrder)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(rows.into_iter().map(TierInfo::from).collect())
    }

    async fn find_tier_info(&self, tier: LeagueTier) -> Result<Option<TierInfo>, DomainError> {
        let row = league_tiers::Entity::find_by_id(tier)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(row.map(TierInfo::from))
    }

    async fn get_profiles(&self, user_ids: &[Uuid]) -> Result<Vec<UserProfile>, DomainError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(map_db_err)?;
        Ok(rows.into_iter().map(UserProfile::from).collect())
    }
}
