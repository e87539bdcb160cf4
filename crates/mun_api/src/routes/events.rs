//! Event log and analytics endpoints

use axum::{
    Json,
    extract::{Path, Query, State},
};
use mun_core::db;
use mun_core::schema::Event;
use mun_core::stats::{self, Analytics, SortDirection, SortField, SortOrder};
use tracing::info;

use crate::dto::{AddEventRequest, StatsQuery};
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::state::AppState;

/// Newest first. An unknown committee simply has no events.
pub async fn list_events(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Event>>> {
    let events = state
        .with_connection(move |conn| db::list_events(conn, &id))
        .await?;
    Ok(Json(events))
}

pub async fn add_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<AddEventRequest>,
) -> ApiResult<Json<Event>> {
    let event = req.into_new_event()?;

    let event = state
        .with_connection(move |conn| db::add_event(conn, &id, event))
        .await?;

    info!(
        committee_id = %event.committee_id,
        kind = %event.kind,
        portfolio = %event.portfolio,
        "Event recorded"
    );
    Ok(Json(event))
}

pub async fn committee_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<Analytics>> {
    let order = sort_order(&query)?;

    let analytics = state
        .with_connection(move |conn| {
            let Some(committee) = db::get_committee(conn, &id)? else {
                return Ok(None);
            };
            let events = db::list_events(conn, &id)?;
            Ok(Some(stats::analyze(&events, &committee.portfolios, order)))
        })
        .await?
        .ok_or_else(|| ApiError::NotFound("Committee not found".to_string()))?;

    Ok(Json(analytics))
}

fn sort_order(query: &StatsQuery) -> ApiResult<SortOrder> {
    let field = match query.sort.as_deref() {
        Some(raw) => raw
            .parse::<SortField>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => SortField::default(),
    };
    let direction = match query.direction.as_deref() {
        Some(raw) => raw
            .parse::<SortDirection>()
            .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        None => SortDirection::default(),
    };
    Ok(SortOrder::new(field, direction))
}
