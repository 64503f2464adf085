pub mod league_history;
pub mod league_memberships;
pub mod league_tiers;
pub mod users;

pub use league_history::Entity as LeagueHistory;
pub use league_memberships::Entity as LeagueMemberships;
pub use league_tiers::Entity as LeagueTiers;
pub use users::Entity as Users;
