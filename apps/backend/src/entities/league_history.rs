use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::promotion::LeagueAction;
use crate::domain::tier::LeagueTier;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "league_history")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "user_id")]
    pub user_id: Uuid,
    #[sea_orm(column_name = "from_tier")]
    pub from_tier: LeagueTier,
    #[sea_orm(column_name = "to_tier")]
    pub to_tier: LeagueTier,
    pub action: LeagueAction,
    #[sea_orm(column_name = "final_rank")]
    pub final_rank: i32,
    #[sea_orm(column_name = "weekly_xp")]
    pub weekly_xp: i64,
    #[sea_orm(column_name = "week_start")]
    pub week_start: OffsetDateTime,
    #[sea_orm(column_name = "week_end")]
    pub week_end: OffsetDateTime,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
