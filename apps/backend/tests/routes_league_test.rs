//! HTTP surface tests over the in-memory store.

mod common;

use std::time::Duration;

use actix_web::{test, web, App};
use league_backend::domain::tier::LeagueTier;
use league_backend::middleware::request_trace::RequestTrace;
use league_backend::routes;
use league_backend::store::LeagueStore;
use league_backend::test_support::memory_app_state;
use serde_json::{json, Value};
use uuid::Uuid;

macro_rules! league_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .wrap(RequestTrace)
                .app_data(web::Data::new($state))
                .configure(routes::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn tiers_endpoint_lists_the_full_ladder() {
    let store = common::memory_store();
    let app = league_app!(memory_app_state(store));

    let req = test::TestRequest::get().uri("/api/league/tiers").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = test::read_body_json(resp).await;
    let tiers = body.as_array().expect("tier list");
    assert_eq!(tiers.len(), 5);
    assert_eq!(tiers[0]["tier"].as_str(), Some("bronze"));
    assert_eq!(tiers[4]["tier"].as_str(), Some("champion"));
    assert!(tiers[0]["icon_url"].as_str().unwrap().ends_with(".svg"));
}

#[actix_web::test]
async fn unknown_user_league_info_is_a_problem_document() {
    let store = common::memory_store();
    let app = league_app!(memory_app_state(store));

    let uri = format!("/api/league/users/{}", Uuid::new_v4());
    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;

    common::assert_problem_details_structure(resp, 404, "MEMBERSHIP_NOT_FOUND").await;
}

#[actix_web::test]
async fn league_info_reflects_scores_and_rank() {
    let store = common::memory_store();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    store
        .upsert_membership(alice, LeagueTier::Bronze, "bronze-0")
        .await
        .unwrap();
    store
        .upsert_membership(bob, LeagueTier::Bronze, "bronze-0")
        .await
        .unwrap();
    store.increment_score(alice, 120).await.unwrap();
    store.increment_score(bob, 80).await.unwrap();

    let app = league_app!(memory_app_state(store));

    let uri = format!("/api/league/users/{alice}");
    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["tier"].as_str(), Some("bronze"));
    assert_eq!(body["weekly_score"].as_i64(), Some(120));
    assert_eq!(body["rank_in_group"].as_u64(), Some(1));
    assert_eq!(body["group_size"].as_u64(), Some(2));
    assert_eq!(body["group_id"].as_str(), Some("bronze-0"));
}

#[actix_web::test]
async fn leaderboard_marks_the_requesting_user() {
    let store = common::memory_store();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    store.add_profile(alice, "alice", Some("Alice A."), 9);
    store
        .upsert_membership(alice, LeagueTier::Gold, "gold-0")
        .await
        .unwrap();
    store
        .upsert_membership(bob, LeagueTier::Gold, "gold-0")
        .await
        .unwrap();
    store.increment_score(bob, 500).await.unwrap();
    store.increment_score(alice, 300).await.unwrap();

    let app = league_app!(memory_app_state(store));

    let uri = format!("/api/league/users/{alice}/leaderboard");
    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["tier"].as_str(), Some("gold"));
    assert_eq!(body["user_rank"].as_u64(), Some(2));

    let rankings = body["rankings"].as_array().unwrap();
    assert_eq!(rankings.len(), 2);
    assert_eq!(rankings[0]["is_current_user"].as_bool(), Some(false));
    assert_eq!(rankings[1]["is_current_user"].as_bool(), Some(true));
    assert_eq!(rankings[1]["username"].as_str(), Some("alice"));
    assert_eq!(rankings[1]["display_name"].as_str(), Some("Alice A."));
    assert_eq!(rankings[1]["level"].as_i64(), Some(9));
}

#[actix_web::test]
async fn xp_event_is_accepted_and_eventually_applied() {
    let store = common::memory_store();
    let app = league_app!(memory_app_state(store.clone()));
    let user = Uuid::new_v4();

    let req = test::TestRequest::post()
        .uri("/api/league/events/xp")
        .set_json(json!({ "user_id": user, "amount": 250 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 202);

    // the consumer applies the event asynchronously
    let mut applied = None;
    for _ in 0..50 {
        if let Some(m) = store.get_membership(user).await.unwrap() {
            applied = Some(m);
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    let membership = applied.expect("xp event should create a membership");
    assert_eq!(membership.tier, LeagueTier::Bronze);
    assert_eq!(membership.weekly_score, 250);
}

#[actix_web::test]
async fn non_positive_xp_amount_is_rejected() {
    let store = common::memory_store();
    let app = league_app!(memory_app_state(store));

    let req = test::TestRequest::post()
        .uri("/api/league/events/xp")
        .set_json(json!({ "user_id": Uuid::new_v4(), "amount": 0 }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    common::assert_problem_details_structure(resp, 400, "INVALID_XP_AMOUNT").await;
}

#[actix_web::test]
async fn admin_run_returns_summary_and_fills_history() {
    let store = common::memory_store();
    let user = Uuid::new_v4();
    store
        .upsert_membership(user, LeagueTier::Silver, "silver-0")
        .await
        .unwrap();
    store.increment_score(user, 999).await.unwrap();

    let app = league_app!(memory_app_state(store));

    let req = test::TestRequest::post()
        .uri("/api/league/admin/promotions/run")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let summary: Value = test::read_body_json(resp).await;
    assert_eq!(summary["promoted"].as_u64(), Some(1));
    assert_eq!(summary["failed"].as_u64(), Some(0));

    let uri = format!("/api/league/users/{user}/history");
    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let history: Value = test::read_body_json(resp).await;
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["action"].as_str(), Some("promoted"));
    assert_eq!(entries[0]["from_tier"].as_str(), Some("silver"));
    assert_eq!(entries[0]["to_tier"].as_str(), Some("gold"));
    assert_eq!(entries[0]["final_rank"].as_u64(), Some(1));
    assert_eq!(entries[0]["weekly_xp"].as_i64(), Some(999));
}

#[actix_web::test]
async fn history_limit_zero_is_rejected() {
    let store = common::memory_store();
    let app = league_app!(memory_app_state(store));

    let uri = format!("/api/league/users/{}/history?limit=0", Uuid::new_v4());
    let req = test::TestRequest::get().uri(&uri).to_request();
    let resp = test::call_service(&app, req).await;

    common::assert_problem_details_structure(resp, 400, "VALIDATION").await;
}

#[actix_web::test]
async fn health_endpoint_reports_ok_without_db() {
    let store = common::memory_store();
    let app = league_app!(memory_app_state(store));

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"].as_str(), Some("ok"));
    assert_eq!(body["db"].as_str(), Some("none"));
}
