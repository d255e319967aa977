use axum::middleware::from_fn;
use axum::routing::{get, post};
use axum::Router;

use crate::config::{create_cors_layer, security_headers};
use crate::handlers::{
    bulk_tickets, checkin, create_registration, dashboard_stats, health_check,
    recent_registrations, search_registrations,
};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/registrations", post(create_registration))
        .route("/registrations/recent", get(recent_registrations))
        .route("/registrations/search", get(search_registrations))
        .route("/checkin", post(checkin))
        .route("/tickets/bulk", post(bulk_tickets))
        .route("/stats", get(dashboard_stats))
        .layer(from_fn(security_headers))
        .layer(create_cors_layer())
        .with_state(state)
}
