//! API route handlers

pub mod committees;
pub mod events;
pub mod health;

use axum::{Router, routing::get, routing::post};

use crate::state::AppState;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        // Committee endpoints
        .route(
            "/committees",
            get(committees::list_committees).post(committees::create_committee),
        )
        .route(
            "/committees/:id",
            get(committees::get_committee).delete(committees::delete_committee),
        )
        .route("/committees/:id/verify", post(committees::verify_access))
        .route("/committees/:id/portfolios", post(committees::replace_portfolios))
        // Event endpoints
        .route(
            "/committees/:id/events",
            get(events::list_events).post(events::add_event),
        )
        .route("/committees/:id/stats", get(events::committee_stats))
        .with_state(state)
}
