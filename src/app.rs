use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/healthz", get(handlers::healthz))
        .route("/api/departments", get(handlers::get_departments))
        .route("/api/:dept/dashboard", get(handlers::get_dashboard))
        .route("/api/:dept/active-users", get(handlers::get_active_users))
        .route("/api/:dept/monthly-traffic/:stat", get(handlers::get_monthly_traffic))
        .route("/api/:dept/visits-today", get(handlers::get_visits_today))
        .route("/api/:dept/top-downloads", get(handlers::get_top_downloads))
        .route("/api/:dept/top-domains/:days", get(handlers::get_top_domains))
        .route("/api/:dept/top-pages", get(handlers::get_top_pages))
        .route("/api/:dept/visitor-locations", get(handlers::get_visitor_locations))
        .with_state(state)
}
