pub mod promotion;
pub mod ranking;
pub mod tier;

pub use promotion::{decide_outcome, LeagueAction, Outcome};
pub use ranking::{rank_members, RankedMember};
pub use tier::LeagueTier;
