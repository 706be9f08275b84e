use axum::{extract::State, response::Json};
use serde::Serialize;
use std::time::Instant;

use crate::{AppState, error::Result};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub time_taken: String,
    pub version: String,
    pub build_date: String,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub build_date: String,
}

pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    let started = Instant::now();
    state.users.ping().await?;

    Ok(Json(HealthResponse {
        status: "ok",
        time_taken: format!("{:?}", started.elapsed()),
        version: state.config.version.clone(),
        build_date: state.config.build_date.clone(),
    }))
}

pub async fn version(State(state): State<AppState>) -> Json<VersionResponse> {
    Json(VersionResponse {
        version: state.config.version.clone(),
        build_date: state.config.build_date.clone(),
    })
}
