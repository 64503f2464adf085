//! Dense ranking of one group's members by weekly score.
//!
//! The backing store returns members unordered, so the sort here is the single
//! source of truth for standings. Ties break by `joined_at` ascending (earlier
//! members rank higher), then `user_id`, making cutoffs reproducible no matter
//! what order rows come back in.

use crate::store::Membership;

/// A membership paired with its 1-based rank within the group.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedMember {
    pub member: Membership,
    pub rank: u32,
}

/// Rank a group's members: weekly score descending, dense 1..=N ranks.
pub fn rank_members(mut members: Vec<Membership>) -> Vec<RankedMember> {
    members.sort_by(|a, b| {
        b.weekly_score
            .cmp(&a.weekly_score)
            .then_with(|| a.joined_at.cmp(&b.joined_at))
            .then_with(|| a.user_id.cmp(&b.user_id))
    });

    members
        .into_iter()
        .enumerate()
        .map(|(i, member)| RankedMember {
            member,
            rank: (i + 1) as u32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use time::{Duration, OffsetDateTime};
    use uuid::Uuid;

    use super::*;
    use crate::domain::tier::LeagueTier;

    fn member(score: i64, joined_offset_s: i64) -> Membership {
        Membership {
            user_id: Uuid::new_v4(),
            tier: LeagueTier::Bronze,
            group_id: "bronze-0".to_string(),
            weekly_score: score,
            joined_at: OffsetDateTime::UNIX_EPOCH + Duration::seconds(joined_offset_s),
        }
    }

    #[test]
    fn highest_score_takes_rank_one() {
        let ranked = rank_members(vec![member(10, 0), member(50, 0), member(30, 0)]);
        let scores: Vec<i64> = ranked.iter().map(|r| r.member.weekly_score).collect();
        assert_eq!(scores, vec![50, 30, 10]);
        assert_eq!(ranked[0].rank, 1);
        assert_eq!(ranked[2].rank, 3);
    }

    #[test]
    fn ties_break_by_earlier_join() {
        let older = member(40, 100);
        let newer = member(40, 200);
        let older_id = older.user_id;

        let ranked = rank_members(vec![newer, older]);
        assert_eq!(ranked[0].member.user_id, older_id);
    }

    #[test]
    fn full_tie_breaks_by_user_id() {
        let mut a = member(40, 100);
        let mut b = member(40, 100);
        a.user_id = Uuid::from_u128(1);
        b.user_id = Uuid::from_u128(2);

        let ranked = rank_members(vec![b.clone(), a.clone()]);
        assert_eq!(ranked[0].member.user_id, a.user_id);
        assert_eq!(ranked[1].member.user_id, b.user_id);
    }

    #[test]
    fn empty_group_ranks_to_empty() {
        assert!(rank_members(Vec::new()).is_empty());
    }

    proptest! {
        /// Ranks are exactly the dense permutation 1..=N.
        #[test]
        fn ranks_are_dense_permutation(scores in proptest::collection::vec(0i64..10_000, 0..40)) {
            let members: Vec<Membership> = scores
                .iter()
                .enumerate()
                .map(|(i, &s)| member(s, i as i64))
                .collect();
            let n = members.len() as u32;

            let ranked = rank_members(members);
            let ranks: Vec<u32> = ranked.iter().map(|r| r.rank).collect();
            prop_assert_eq!(ranks, (1..=n).collect::<Vec<u32>>());
        }

        /// Scores are non-increasing down the ranking.
        #[test]
        fn scores_never_increase(scores in proptest::collection::vec(0i64..10_000, 1..40)) {
            let members: Vec<Membership> = scores
                .iter()
                .enumerate()
                .map(|(i, &s)| member(s, i as i64))
                .collect();

            let ranked = rank_members(members);
            for pair in ranked.windows(2) {
                prop_assert!(pair[0].member.weekly_score >= pair[1].member.weekly_score);
            }
        }
    }
}
