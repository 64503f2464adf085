//! League HTTP routes.
//!
//! Thin serialization layer over `LeagueService` and `PromotionService`.
//! Auth is handled upstream at the gateway; these handlers only translate
//! domain results into JSON.

use actix_web::{web, HttpResponse, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::promotion::LeagueAction;
use crate::domain::tier::LeagueTier;
use crate::error::AppError;
use crate::events::XpAwarded;
use crate::state::app_state::AppState;
use crate::store::{HistoryEntry, TierInfo};

#[derive(Debug, Serialize)]
struct TierResponse {
    tier: LeagueTier,
    name: String,
    description: String,
    icon_url: String,
}

impl From<TierInfo> for TierResponse {
    fn from(info: TierInfo) -> Self {
        Self {
            tier: info.tier,
            name: info.name,
            description: info.description,
            icon_url: info.icon_url,
        }
    }
}

#[derive(Debug, Serialize)]
struct HistoryEntryResponse {
    from_tier: LeagueTier,
    to_tier: LeagueTier,
    action: LeagueAction,
    final_rank: u32,
    weekly_xp: i64,
    #[serde(with = "time::serde::rfc3339")]
    week_start: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    week_end: time::OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    created_at: time::OffsetDateTime,
}

impl From<HistoryEntry> for HistoryEntryResponse {
    fn from(entry: HistoryEntry) -> Self {
        Self {
            from_tier: entry.from_tier,
            to_tier: entry.to_tier,
            action: entry.action,
            final_rank: entry.final_rank,
            weekly_xp: entry.weekly_xp,
            week_start: entry.week_start,
            week_end: entry.week_end,
            created_at: entry.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    limit: Option<u64>,
}

/// GET /api/league/tiers
///
/// Public tier catalog in ladder order. No membership required.
async fn get_tiers(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let tiers = app_state.league.get_all_tiers().await?;
    let body: Vec<TierResponse> = tiers.into_iter().map(TierResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/league/users/{user_id}
///
/// Current tier, weekly score and live in-group rank for one user.
/// 404 when the user has never been placed in a league.
async fn get_user_league_info(
    path: web::Path<Uuid>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let info = app_state
        .league
        .get_user_league_info(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(info))
}

/// GET /api/league/users/{user_id}/leaderboard
///
/// Full standings for the group the user belongs to.
async fn get_group_leaderboard(
    path: web::Path<Uuid>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let board = app_state
        .league
        .get_group_leaderboard(path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(board))
}

/// GET /api/league/users/{user_id}/history?limit=N
///
/// Promotion history, most recent first.
async fn get_history(
    path: web::Path<Uuid>,
    query: web::Query<HistoryQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let entries = app_state
        .league
        .get_history(path.into_inner(), query.limit)
        .await?;
    let body: Vec<HistoryEntryResponse> = entries
        .into_iter()
        .map(HistoryEntryResponse::from)
        .collect();
    Ok(HttpResponse::Ok().json(body))
}

/// POST /api/league/events/xp
///
/// Ingestion endpoint for the upstream gamification emitter. Accepted
/// events are processed asynchronously; the emitter never waits on the
/// score write.
async fn post_xp_event(
    body: web::Json<XpAwarded>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let event = body.into_inner();
    if event.amount <= 0 {
        return Err(AppError::invalid(
            "INVALID_XP_AMOUNT",
            format!("xp amount must be positive, got {}", event.amount),
        ));
    }
    app_state.xp_bus.publish(event);
    Ok(HttpResponse::Accepted().finish())
}

/// POST /api/league/admin/promotions/run
///
/// Manual cycle trigger for operators and external schedulers. Returns the
/// aggregate summary, or 409 when a run is already in flight.
async fn run_promotion(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let summary = app_state.promotions.run_weekly_promotion().await?;
    Ok(HttpResponse::Ok().json(summary))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/tiers", web::get().to(get_tiers))
        .route("/users/{user_id}", web::get().to(get_user_league_info))
        .route(
            "/users/{user_id}/leaderboard",
            web::get().to(get_group_leaderboard),
        )
        .route("/users/{user_id}/history", web::get().to(get_history))
        .route("/events/xp", web::post().to(post_xp_event))
        .route("/admin/promotions/run", web::post().to(run_promotion));
}
