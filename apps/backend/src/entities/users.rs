use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub username: Option<String>,
    #[sea_orm(column_name = "display_name")]
    pub display_name: Option<String>,
    #[sea_orm(column_name = "avatar_url")]
    pub avatar_url: Option<String>,
    pub level: i32,
    #[sea_orm(column_name = "created_at")]
    pub created_at: OffsetDateTime,
    #[sea_orm(column_name = "updated_at")]
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::league_memberships::Entity")]
    LeagueMemberships,
}

impl Related<super::league_memberships::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LeagueMemberships.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
