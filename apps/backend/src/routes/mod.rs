use actix_web::web;

pub mod health;
pub mod league;

/// Configure application routes for both the HttpServer and test apps.
pub fn configure(cfg: &mut web::ServiceConfig) {
    // Health check routes: /health
    cfg.service(web::scope("/health").configure(health::configure_routes));

    // League routes: /api/league/**
    cfg.service(web::scope("/api/league").configure(league::configure_routes));
}
