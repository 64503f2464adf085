use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, Index, Query, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----
#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    DisplayName,
    AvatarUrl,
    Level,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum LeagueTiers {
    Table,
    Tier,
    SortOrder,
    Name,
    Description,
    IconUrl,
    CreatedAt,
}

#[derive(Iden)]
enum LeagueMemberships {
    Table,
    Id,
    UserId,
    Tier,
    GroupId,
    WeeklyScore,
    JoinedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum LeagueHistory {
    Table,
    Id,
    UserId,
    FromTier,
    ToTier,
    Action,
    FinalRank,
    WeeklyXp,
    WeekStart,
    WeekEnd,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // users (read-side profile data; rows are provisioned upstream)
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string().null())
                    .col(ColumnDef::new(Users::DisplayName).string().null())
                    .col(ColumnDef::new(Users::AvatarUrl).string().null())
                    .col(
                        ColumnDef::new(Users::Level)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // league_tiers (static catalog, seeded below)
        manager
            .create_table(
                Table::create()
                    .table(LeagueTiers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LeagueTiers::Tier)
                            .string_len(16)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LeagueTiers::SortOrder)
                            .integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(LeagueTiers::Name).string().not_null())
                    .col(
                        ColumnDef::new(LeagueTiers::Description)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LeagueTiers::IconUrl).string().not_null())
                    .col(
                        ColumnDef::new(LeagueTiers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // league_memberships (one active row per user)
        manager
            .create_table(
                Table::create()
                    .table(LeagueMemberships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LeagueMemberships::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(LeagueMemberships::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(LeagueMemberships::Tier)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeagueMemberships::GroupId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeagueMemberships::WeeklyScore)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(LeagueMemberships::JoinedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeagueMemberships::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeagueMemberships::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_league_memberships_user_unique")
                    .table(LeagueMemberships::Table)
                    .col(LeagueMemberships::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_league_memberships_tier_group")
                    .table(LeagueMemberships::Table)
                    .col(LeagueMemberships::Tier)
                    .col(LeagueMemberships::GroupId)
                    .to_owned(),
            )
            .await?;

        // league_history (append-only audit trail)
        manager
            .create_table(
                Table::create()
                    .table(LeagueHistory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LeagueHistory::Id)
                            .big_integer()
                            .not_null()
                            .primary_key()
                            .auto_increment(),
                    )
                    .col(ColumnDef::new(LeagueHistory::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(LeagueHistory::FromTier)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeagueHistory::ToTier)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeagueHistory::Action)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeagueHistory::FinalRank)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeagueHistory::WeeklyXp)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeagueHistory::WeekStart)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeagueHistory::WeekEnd)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LeagueHistory::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_league_history_user_created")
                    .table(LeagueHistory::Table)
                    .col(LeagueHistory::UserId)
                    .col(LeagueHistory::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // Seed the tier catalog. The engine treats a missing row as a
        // configuration problem, so the migration is the source of truth.
        let tiers: [(&str, i32, &str, &str, &str); 5] = [
            (
                "bronze",
                0,
                "Bronze League",
                "Where every journey begins. Earn XP to climb out.",
                "/icons/leagues/bronze.svg",
            ),
            (
                "silver",
                1,
                "Silver League",
                "Consistent learners sharpening their skills.",
                "/icons/leagues/silver.svg",
            ),
            (
                "gold",
                2,
                "Gold League",
                "Dedicated coders competing for the top spots.",
                "/icons/leagues/gold.svg",
            ),
            (
                "diamond",
                3,
                "Diamond League",
                "Elite performers one step from the summit.",
                "/icons/leagues/diamond.svg",
            ),
            (
                "champion",
                4,
                "Champion League",
                "The best of the best. There is nowhere higher.",
                "/icons/leagues/champion.svg",
            ),
        ];

        for (tier, sort_order, name, description, icon_url) in tiers {
            let insert = Query::insert()
                .into_table(LeagueTiers::Table)
                .columns([
                    LeagueTiers::Tier,
                    LeagueTiers::SortOrder,
                    LeagueTiers::Name,
                    LeagueTiers::Description,
                    LeagueTiers::IconUrl,
                    LeagueTiers::CreatedAt,
                ])
                .values_panic([
                    tier.into(),
                    sort_order.into(),
                    name.into(),
                    description.into(),
                    icon_url.into(),
                    Expr::current_timestamp().into(),
                ])
                .to_owned();
            manager.exec_stmt(insert).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LeagueHistory::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LeagueMemberships::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LeagueTiers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
