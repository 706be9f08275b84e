use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{Comment, CreateUserRequest, PageQuery, Role, User},
    services::{comment_service, user_service},
    utils::page_bounds,
};

#[derive(Debug, Deserialize)]
pub struct SearchUsersQuery {
    pub username: Option<String>,
    pub role: Option<String>,
    pub from: Option<i64>,
    pub size: Option<i64>,
}

pub async fn search_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(query): Query<SearchUsersQuery>,
) -> Result<Json<Vec<User>>> {
    let role = match query.role.as_deref() {
        Some(role) => role.parse::<Role>().map_err(AppError::Validation)?,
        None => Role::User,
    };
    let (from, size) = page_bounds(query.from, query.size);

    let users = user_service::search_users(
        &state,
        &auth_user,
        query.username.as_deref(),
        role,
        from,
        size,
    )
    .await?;

    Ok(Json(users))
}

pub async fn create_admin(
    State(state): State<AppState>,
    auth_user: AuthUser,
    WithRejection(Json(payload), _): WithRejection<Json<CreateUserRequest>, AppError>,
) -> Result<(StatusCode, Json<User>)> {
    let user = user_service::create_admin(&state, &auth_user, payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(username): Path<String>,
) -> Result<Json<User>> {
    let user = user_service::get_user(&state, &auth_user, &username).await?;
    Ok(Json(user))
}

pub async fn list_user_comments(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Comment>>> {
    let (from, size) = page_bounds(query.from, query.size);
    let comments = comment_service::list_user_comments(&state, &username, from, size).await?;
    Ok(Json(comments))
}

pub async fn deactivate_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(username): Path<String>,
) -> Result<StatusCode> {
    user_service::deactivate(&state, &auth_user, &username).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn delete_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(username): Path<String>,
) -> Result<StatusCode> {
    user_service::delete_account(&state, &auth_user, &username).await?;
    Ok(StatusCode::ACCEPTED)
}
