//! Weekly promotion trigger.
//!
//! The engine itself does not care who calls `run_weekly_promotion`; this
//! module provides the default in-process trigger (every Monday 00:00 UTC).
//! The same entry point is reachable through the admin route for external
//! schedulers and operators.

use std::sync::Arc;

use time::{Duration, OffsetDateTime, PrimitiveDateTime, Time};
use tracing::{error, info, warn};

use crate::errors::domain::{ConflictKind, DomainError};
use crate::services::promotion::PromotionService;

/// The next Monday 00:00 UTC strictly after `after`.
pub fn next_monday_midnight(after: OffsetDateTime) -> OffsetDateTime {
    let days_ahead = i64::from(after.date().weekday().number_days_from_monday());
    let monday = after.date() - Duration::days(days_ahead);
    let candidate = PrimitiveDateTime::new(monday, Time::MIDNIGHT).assume_utc();

    if candidate > after {
        candidate
    } else {
        candidate + Duration::weeks(1)
    }
}

/// Sleep-and-run loop. Spawned once at startup; runs until the process exits.
pub async fn run_weekly_schedule(service: Arc<PromotionService>) {
    loop {
        let now = OffsetDateTime::now_utc();
        let next = next_monday_midnight(now);
        let wait = next - now;
        info!(next_run = %next, "promotion schedule armed");

        let wait = std::time::Duration::try_from(wait)
            .unwrap_or_else(|_| std::time::Duration::from_secs(60));
        tokio::time::sleep(wait).await;

        match service.run_weekly_promotion().await {
            Ok(summary) => info!(
                promoted = summary.promoted,
                demoted = summary.demoted,
                stayed = summary.stayed,
                failed = summary.failed,
                "scheduled promotion cycle complete"
            ),
            Err(DomainError::Conflict(ConflictKind::RunInProgress, _)) => {
                warn!("scheduled promotion skipped: run already in progress");
            }
            Err(e) => error!(error = %e, "scheduled promotion cycle failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use time::Weekday;

    use super::*;

    #[test]
    fn mid_week_rolls_to_next_monday() {
        // 2026-08-27 is a Thursday
        let next = next_monday_midnight(datetime!(2026-08-27 15:30 UTC));
        assert_eq!(next, datetime!(2026-08-31 00:00 UTC));
        assert_eq!(next.weekday(), Weekday::Monday);
    }

    #[test]
    fn monday_midnight_exactly_waits_a_full_week() {
        let next = next_monday_midnight(datetime!(2026-08-31 00:00 UTC));
        assert_eq!(next, datetime!(2026-09-07 00:00 UTC));
    }

    #[test]
    fn late_sunday_rolls_to_the_imminent_monday() {
        let next = next_monday_midnight(datetime!(2026-08-30 23:59 UTC));
        assert_eq!(next, datetime!(2026-08-31 00:00 UTC));
    }
}
