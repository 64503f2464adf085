use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::tier::LeagueTier;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "league_tiers")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tier: LeagueTier,
    #[sea_orm(column_name = "sort_order")]
    pub sort_order: i32,
    pub name: String,
    pub description: String,
    #[sea_orm(column_name = "icon_url")]
    pub icon_url: String,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
