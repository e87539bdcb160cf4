//! Committee management endpoints

use axum::{
    Json,
    extract::{Path, State},
};
use mun_core::db;
use mun_core::schema::{Committee, CommitteeSummary};
use tracing::info;

use crate::dto::{
    CreateCommitteeRequest, PasswordRequest, ReplacePortfoliosRequest, SuccessResponse,
};
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::state::AppState;

pub async fn list_committees(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CommitteeSummary>>> {
    let committees = state.with_connection(|conn| db::list_committees(conn)).await?;
    Ok(Json(committees))
}

pub async fn create_committee(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateCommitteeRequest>,
) -> ApiResult<Json<Committee>> {
    let input = req.validate()?;

    let committee = state
        .with_connection(move |conn| db::create_committee(conn, &input.name, &input.password))
        .await?;

    info!(committee_id = %committee.id, name = %committee.name, "Committee created");
    Ok(Json(committee))
}

pub async fn get_committee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Committee>> {
    state
        .with_connection(move |conn| db::get_committee(conn, &id))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Committee not found".to_string()))
}

/// Password-gated delete; a wrong password and an unknown id look the same.
pub async fn delete_committee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<PasswordRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let password = req.require()?;

    let target = id.clone();
    let deleted = state
        .with_connection(move |conn| db::delete_committee(conn, &target, &password))
        .await?;

    if !deleted {
        return Err(ApiError::Unauthorized(
            "Invalid password or committee not found".to_string(),
        ));
    }

    info!(committee_id = %id, "Committee deleted");
    Ok(Json(SuccessResponse::ok()))
}

pub async fn verify_access(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<PasswordRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let password = req.require()?;

    let granted = state
        .with_connection(move |conn| db::verify_access(conn, &id, &password))
        .await?;

    if !granted {
        return Err(ApiError::Unauthorized("Invalid password".to_string()));
    }
    Ok(Json(SuccessResponse::ok()))
}

pub async fn replace_portfolios(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<ReplacePortfoliosRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let names = req.validate()?;
    let count = names.len();

    let target = id.clone();
    state
        .with_connection(move |conn| db::replace_portfolios(conn, &target, &names))
        .await?;

    info!(committee_id = %id, count, "Portfolios replaced");
    Ok(Json(SuccessResponse::ok()))
}
