use axum::{extract::State, http::StatusCode, response::Json};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    error::{AppError, Result},
    models::{CreateUserRequest, SignInRequest, TokenResponse},
    services::user_service,
};

pub async fn signup(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateUserRequest>, AppError>,
) -> Result<StatusCode> {
    user_service::signup(&state, payload).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn signin(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<SignInRequest>, AppError>,
) -> Result<Json<TokenResponse>> {
    let token = user_service::signin(&state, payload).await?;
    Ok(Json(token))
}
