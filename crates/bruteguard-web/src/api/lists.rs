use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use bruteguard_core::{validate_subnet, ListKind};

use crate::dto::{AddressQuery, ContainsResponse, ListResponse, SubnetRequest};
use crate::error::AppError;
use crate::state::AppState;

pub async fn add(
    State(state): State<AppState>,
    Path(list): Path<ListKind>,
    Json(body): Json<SubnetRequest>,
) -> Result<StatusCode, AppError> {
    // The core stores any string; only CIDR is accepted over HTTP.
    validate_subnet(&body.subnet).map_err(|e| AppError::BadRequest(e.to_string()))?;
    state.authorizer.add(list, &body.subnet).await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove(
    State(state): State<AppState>,
    Path(list): Path<ListKind>,
    Json(body): Json<SubnetRequest>,
) -> Result<StatusCode, AppError> {
    state.authorizer.remove(list, &body.subnet).await?;
    Ok(StatusCode::OK)
}

pub async fn list(
    State(state): State<AppState>,
    Path(list): Path<ListKind>,
) -> Result<Json<ListResponse>, AppError> {
    let subnets = state.authorizer.list_entries(list).await?;
    Ok(Json(ListResponse { subnets }))
}

pub async fn check(
    State(state): State<AppState>,
    Path(list): Path<ListKind>,
    Query(query): Query<AddressQuery>,
) -> Result<Json<ContainsResponse>, AppError> {
    let contained = state.authorizer.contains(list, &query.address).await?;
    Ok(Json(ContainsResponse { contained }))
}
