//! Promotion/demotion cutoffs for a ranked group member.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::league::LeagueConfig;
use crate::domain::tier::LeagueTier;

/// What happened to a member at a cycle boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum LeagueAction {
    #[sea_orm(string_value = "promoted")]
    Promoted,
    #[sea_orm(string_value = "demoted")]
    Demoted,
    #[sea_orm(string_value = "stayed")]
    Stayed,
}

/// Resolved action plus the tier the member ends the cycle in.
/// `destination == tier` exactly when `action == Stayed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub action: LeagueAction,
    pub destination: LeagueTier,
}

/// Apply the cutoff rules to one ranked member.
///
/// The promotion band is checked first. In groups smaller than
/// `promotion_slots + demotion_slots` the two bands overlap and promotion
/// wins for every rank in the overlap; a group of 8 under the default
/// 10/5 split therefore promotes everyone. That shadowing is intentional
/// and covered by tests.
///
/// Champion has no next tier, so its promotion band is inert; Bronze has
/// no previous tier, so its demotion band is inert.
pub fn decide_outcome(
    tier: LeagueTier,
    rank: u32,
    group_size: u32,
    config: &LeagueConfig,
) -> Outcome {
    if rank <= config.promotion_slots {
        if let Some(next) = tier.next() {
            return Outcome {
                action: LeagueAction::Promoted,
                destination: next,
            };
        }
    }

    if rank > group_size.saturating_sub(config.demotion_slots) {
        if let Some(previous) = tier.previous() {
            return Outcome {
                action: LeagueAction::Demoted,
                destination: previous,
            };
        }
    }

    Outcome {
        action: LeagueAction::Stayed,
        destination: tier,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcomes(tier: LeagueTier, group_size: u32) -> Vec<Outcome> {
        let cfg = LeagueConfig::default();
        (1..=group_size)
            .map(|rank| decide_outcome(tier, rank, group_size, &cfg))
            .collect()
    }

    #[test]
    fn group_of_twelve_splits_ten_up_two_down() {
        // ranks 1-10 promote; 11 and 12 sit above 12 - 5 = 7, so they demote
        let out = outcomes(LeagueTier::Silver, 12);
        for o in &out[..10] {
            assert_eq!(o.action, LeagueAction::Promoted);
            assert_eq!(o.destination, LeagueTier::Gold);
        }
        for o in &out[10..] {
            assert_eq!(o.action, LeagueAction::Demoted);
            assert_eq!(o.destination, LeagueTier::Bronze);
        }
    }

    #[test]
    fn group_of_twenty_has_a_stay_band() {
        let out = outcomes(LeagueTier::Gold, 20);
        assert!(out[..10]
            .iter()
            .all(|o| o.action == LeagueAction::Promoted));
        assert!(out[10..15].iter().all(|o| o.action == LeagueAction::Stayed));
        assert!(out[15..].iter().all(|o| o.action == LeagueAction::Demoted));
    }

    #[test]
    fn small_group_promotion_band_shadows_demotion() {
        // 8 members, all within the promotion band; nobody demotes
        let out = outcomes(LeagueTier::Silver, 8);
        assert!(out.iter().all(|o| o.action == LeagueAction::Promoted));
    }

    #[test]
    fn champion_never_promotes() {
        let out = outcomes(LeagueTier::Champion, 12);
        assert!(out.iter().all(|o| o.action != LeagueAction::Promoted));
        // top ranks fall through: rank 1..=7 stay, 8..=12 demote
        assert_eq!(out[0].action, LeagueAction::Stayed);
        assert_eq!(out[11].action, LeagueAction::Demoted);
        assert_eq!(out[11].destination, LeagueTier::Diamond);
    }

    #[test]
    fn bronze_never_demotes() {
        let out = outcomes(LeagueTier::Bronze, 12);
        assert!(out.iter().all(|o| o.action != LeagueAction::Demoted));
        assert_eq!(out[11].action, LeagueAction::Stayed);
    }

    #[test]
    fn stayed_destination_is_current_tier() {
        let cfg = LeagueConfig::default();
        let o = decide_outcome(LeagueTier::Gold, 12, 20, &cfg);
        assert_eq!(o.action, LeagueAction::Stayed);
        assert_eq!(o.destination, LeagueTier::Gold);
    }

    #[test]
    fn tiny_group_does_not_underflow() {
        let cfg = LeagueConfig::default();
        // group_size 3 < demotion_slots 5; subtraction saturates to 0
        let o = decide_outcome(LeagueTier::Champion, 3, 3, &cfg);
        assert_eq!(o.action, LeagueAction::Demoted);
    }
}
