use std::sync::Arc;

use actix_web::{web, App, HttpServer};
use league_backend::config::league::LeagueConfig;
use league_backend::events::spawn_consumer;
use league_backend::infra::db::connect_db;
use league_backend::middleware::cors::cors_middleware;
use league_backend::middleware::request_trace::RequestTrace;
use league_backend::routes;
use league_backend::scheduler::run_weekly_schedule;
use league_backend::state::app_state::AppState;
use league_backend::store::SeaLeagueStore;

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables must be set by the runtime environment:
    // - Docker: Set via docker-compose env_file or docker run --env-file
    // - Local dev: Source env files manually (e.g., set -a; . ./.env; set +a)
    let host = std::env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("BACKEND_PORT")
        .unwrap_or_else(|_| "3001".to_string())
        .parse::<u16>()
        .unwrap_or_else(|_| {
            eprintln!("❌ BACKEND_PORT must be a valid port number");
            std::process::exit(1);
        });

    let database_url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("❌ DATABASE_URL must be set");
            std::process::exit(1);
        }
    };

    println!("🚀 Starting League Backend on http://{}:{}", host, port);

    let conn = match connect_db(&database_url).await {
        Ok(conn) => conn,
        Err(e) => {
            eprintln!("❌ Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    println!("✅ Database connected");

    let config = LeagueConfig::from_env();
    let store = Arc::new(SeaLeagueStore::new(conn.clone()));
    let (app_state, xp_rx) = AppState::build(Some(conn), store, config);

    // Background tasks: XP event consumer and the weekly promotion trigger
    spawn_consumer(app_state.league.clone(), xp_rx);
    tokio::spawn(run_weekly_schedule(app_state.promotions.clone()));

    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .wrap(cors_middleware())
            .wrap(RequestTrace)
            .app_data(data.clone())
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
