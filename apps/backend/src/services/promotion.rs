//! The weekly promotion/demotion batch.
//!
//! One logical pass: snapshot rankings for every group in every tier, then
//! apply moves, append history, and finally reset all weekly scores. The
//! snapshot happens before any write so a partially applied run never ranks
//! against half-mutated groups. Failures are contained per group and per
//! member; the run always finishes and reports aggregate counts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::league::LeagueConfig;
use crate::domain::promotion::{decide_outcome, LeagueAction};
use crate::domain::ranking::rank_members;
use crate::domain::tier::LeagueTier;
use crate::errors::domain::{ConflictKind, DomainError};
use crate::services::league::LeagueService;
use crate::store::{LeagueStore, NewHistoryEntry};

/// Aggregate counts for one completed cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PromotionSummary {
    pub promoted: u64,
    pub demoted: u64,
    pub stayed: u64,
    /// Members or groups whose processing failed and was skipped.
    pub failed: u64,
}

/// One member's computed outcome, resolved during the snapshot phase.
#[derive(Debug, Clone)]
struct PlannedOutcome {
    user_id: Uuid,
    from_tier: LeagueTier,
    to_tier: LeagueTier,
    action: LeagueAction,
    final_rank: u32,
    weekly_xp: i64,
}

pub struct PromotionService {
    store: Arc<dyn LeagueStore>,
    league: LeagueService,
    config: LeagueConfig,
    running: AtomicBool,
}

/// Releases the run flag when a run exits, on success or error.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl PromotionService {
    pub fn new(store: Arc<dyn LeagueStore>, config: LeagueConfig) -> Self {
        Self {
            league: LeagueService::new(store.clone(), config),
            store,
            config,
            running: AtomicBool::new(false),
        }
    }

    /// Execute one promotion cycle.
    ///
    /// Callable from the weekly schedule, an admin endpoint, or any external
    /// scheduler. A second call while a run is in flight returns a
    /// `RunInProgress` conflict without touching the store; double execution
    /// would double-reset scores and duplicate history.
    pub async fn run_weekly_promotion(&self) -> Result<PromotionSummary, DomainError> {
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(DomainError::conflict(
                ConflictKind::RunInProgress,
                "a promotion run is already in progress",
            ));
        }
        let _guard = RunGuard(&self.running);

        let week_end = OffsetDateTime::now_utc();
        let week_start = week_end - Duration::days(7);
        let mut summary = PromotionSummary::default();

        let planned = self.snapshot_outcomes(&mut summary).await;
        info!(members = planned.len(), "promotion snapshot complete");

        for outcome in planned {
            self.apply_outcome(outcome, week_start, week_end, &mut summary)
                .await;
        }

        match self.store.reset_all_scores().await {
            Ok(rows) => info!(rows, "weekly scores reset"),
            Err(e) => {
                warn!(error = %e, "weekly score reset failed");
                summary.failed += 1;
            }
        }

        info!(
            promoted = summary.promoted,
            demoted = summary.demoted,
            stayed = summary.stayed,
            failed = summary.failed,
            "promotion cycle finished"
        );
        Ok(summary)
    }

    /// Read-only pass: rank every non-empty group and decide every member's
    /// outcome before anything is written.
    async fn snapshot_outcomes(&self, summary: &mut PromotionSummary) -> Vec<PlannedOutcome> {
        let mut planned = Vec::new();

        for tier in LeagueTier::ALL {
            let groups = match self.store.list_distinct_groups(tier).await {
                Ok(groups) => groups,
                Err(e) => {
                    warn!(%tier, error = %e, "skipping tier: could not list groups");
                    summary.failed += 1;
                    continue;
                }
            };

            for group in groups {
                let members = match self.store.list_group_members(tier, &group.group_id).await {
                    Ok(members) => members,
                    Err(e) => {
                        warn!(%tier, group_id = %group.group_id, error = %e, "skipping group");
                        summary.failed += 1;
                        continue;
                    }
                };
                if members.is_empty() {
                    continue;
                }

                let group_size = members.len() as u32;
                for ranked in rank_members(members) {
                    let outcome = decide_outcome(tier, ranked.rank, group_size, &self.config);
                    planned.push(PlannedOutcome {
                        user_id: ranked.member.user_id,
                        from_tier: tier,
                        to_tier: outcome.destination,
                        action: outcome.action,
                        final_rank: ranked.rank,
                        weekly_xp: ranked.member.weekly_score,
                    });
                }
            }
        }

        planned
    }

    /// Apply one member's outcome: move if needed, then record history.
    /// A failed member is logged and counted; it never aborts the run.
    async fn apply_outcome(
        &self,
        outcome: PlannedOutcome,
        week_start: OffsetDateTime,
        week_end: OffsetDateTime,
        summary: &mut PromotionSummary,
    ) {
        if outcome.action != LeagueAction::Stayed {
            let group_id = match self.league.available_group(outcome.to_tier).await {
                Ok(group_id) => group_id,
                Err(e) => {
                    warn!(user_id = %outcome.user_id, to_tier = %outcome.to_tier, error = %e,
                        "leaving member in place: destination group lookup failed");
                    summary.failed += 1;
                    return;
                }
            };
            if let Err(e) = self
                .store
                .upsert_membership(outcome.user_id, outcome.to_tier, &group_id)
                .await
            {
                warn!(user_id = %outcome.user_id, to_tier = %outcome.to_tier, error = %e,
                    "leaving member in place: move failed");
                summary.failed += 1;
                return;
            }
        }

        if let Err(e) = self
            .store
            .insert_history(NewHistoryEntry {
                user_id: outcome.user_id,
                from_tier: outcome.from_tier,
                to_tier: outcome.to_tier,
                action: outcome.action,
                final_rank: outcome.final_rank,
                weekly_xp: outcome.weekly_xp,
                week_start,
                week_end,
            })
            .await
        {
            warn!(user_id = %outcome.user_id, error = %e, "history append failed");
            summary.failed += 1;
            return;
        }

        match outcome.action {
            LeagueAction::Promoted => summary.promoted += 1,
            LeagueAction::Demoted => summary.demoted += 1,
            LeagueAction::Stayed => summary.stayed += 1,
        }
    }
}
