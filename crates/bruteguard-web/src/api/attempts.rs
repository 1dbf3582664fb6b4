use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use bruteguard_core::AuthAttempt;

use crate::dto::DecisionResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Allowed attempts get 200, denied ones 429 whatever the reason.
pub async fn authorize(
    State(state): State<AppState>,
    Json(attempt): Json<AuthAttempt>,
) -> Result<(StatusCode, Json<DecisionResponse>), AppError> {
    let ok = state.authorizer.authorize(&attempt).await?;
    let status = if ok {
        StatusCode::OK
    } else {
        StatusCode::TOO_MANY_REQUESTS
    };
    Ok((status, Json(DecisionResponse { ok })))
}

pub async fn reset(
    State(state): State<AppState>,
    Json(attempt): Json<AuthAttempt>,
) -> StatusCode {
    state.authorizer.reset(&attempt);
    StatusCode::OK
}
