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
    models::{CastVoteRequest, Comment, CreateCommentRequest, PageQuery},
    services::{
        comment_service,
        vote_service::{self, VotePath},
    },
    utils::page_bounds,
};

pub async fn create_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((category, thread_id)): Path<(String, String)>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateCommentRequest>, AppError>,
) -> Result<(StatusCode, Json<Comment>)> {
    let comment =
        comment_service::create_comment(&state, &auth_user, &category, &thread_id, payload)
            .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn list_comments(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path((category, thread_id)): Path<(String, String)>,
    Query(query): Query<PageQuery>,
) -> Result<Json<Vec<Comment>>> {
    let (from, size) = page_bounds(query.from, query.size);
    let comments =
        comment_service::list_comments(&state, &category, &thread_id, from, size).await?;
    Ok(Json(comments))
}

pub async fn get_comment(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path((category, thread_id, comment_id)): Path<(String, String, String)>,
) -> Result<Json<Comment>> {
    let comment =
        comment_service::get_comment(&state, &category, &thread_id, &comment_id).await?;
    Ok(Json(comment))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((category, thread_id, comment_id)): Path<(String, String, String)>,
) -> Result<StatusCode> {
    comment_service::delete_comment(&state, &auth_user, &category, &thread_id, &comment_id)
        .await?;
    Ok(StatusCode::ACCEPTED)
}

pub async fn vote_comment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((category, thread_id, comment_id)): Path<(String, String, String)>,
    WithRejection(Json(payload), _): WithRejection<Json<CastVoteRequest>, AppError>,
) -> Result<StatusCode> {
    vote_service::cast_vote(
        &state,
        &auth_user,
        &category,
        VotePath::Comment {
            thread_slug: &thread_id,
            comment_slug: &comment_id,
        },
        payload,
    )
    .await?;

    Ok(StatusCode::ACCEPTED)
}
