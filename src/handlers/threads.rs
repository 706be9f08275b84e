use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_extra::extract::WithRejection;

use crate::{
    AppState,
    auth::AuthUser,
    error::{AppError, Result},
    models::{CastVoteRequest, CreateThreadRequest, PageQuery, Thread},
    services::{
        thread_service,
        vote_service::{self, VotePath},
    },
    utils::page_bounds,
};

pub async fn create_thread(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(category): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateThreadRequest>, AppError>,
) -> Result<(StatusCode, Json<Thread>)> {
    let thread = thread_service::create_thread(&state, &auth_user, &category, payload).await?;
    Ok((StatusCode::CREATED, Json(thread)))
}

pub async fn list_threads(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(category): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Thread>>> {
    let (from, size) = page_bounds(query.from, query.size);
    let threads = thread_service::list_threads(&state, &category, from, size).await?;
    Ok(Json(threads))
}

pub async fn get_thread(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path((category, thread_id)): Path<(String, String)>,
) -> Result<Json<Thread>> {
    let thread = thread_service::get_thread(&state, &category, &thread_id).await?;
    Ok(Json(thread))
}

pub async fn delete_thread(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((category, thread_id)): Path<(String, String)>,
) -> Result<StatusCode> {
    thread_service::delete_thread(&state, &auth_user, &category, &thread_id).await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn vote_thread(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((category, thread_id)): Path<(String, String)>,
    WithRejection(Json(payload), _): WithRejection<Json<CastVoteRequest>, AppError>,
) -> Result<StatusCode> {
    vote_service::cast_vote(
        &state,
        &auth_user,
        &category,
        VotePath::Thread {
            thread_slug: &thread_id,
        },
        payload,
    )
    .await?;

    Ok(StatusCode::ACCEPTED)
}
