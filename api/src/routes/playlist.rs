use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use shared::report::PipelineResult;

use super::{server_error, AppState};

const NOT_READY: &str =
    "First you need to log in and specify a nickname. Use /login and /set_lastfm.";

#[derive(Debug, Deserialize)]
pub struct CreatePlaylist {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatePlaylistResponse {
    #[serde(flatten)]
    pub result: PipelineResult,
    pub summary: String,
}

/// Runs one reconciliation for the user and answers once it is over. The run
/// finishes even if the caller goes away first.
pub async fn create_playlist(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<CreatePlaylist>,
) -> Result<Json<CreatePlaylistResponse>, (StatusCode, String)> {
    let credentials = state
        .store
        .get(&user_id)
        .await
        .map_err(server_error)?
        .unwrap_or_default();
    let handle = match (credentials.catalog_refresh_token, credentials.history_handle) {
        (Some(_), Some(handle)) => handle,
        _ => return Err((StatusCode::PRECONDITION_FAILED, NOT_READY.to_string())),
    };

    // Detached so a dropped connection cannot stop a run halfway through the adds.
    let pipeline = state.pipeline.clone();
    let run = tokio::spawn(async move {
        pipeline
            .run(&handle, &user_id, &body.start_date, &body.end_date)
            .await
    });
    let result = run.await.map_err(server_error)?;
    let summary = result.summary();

    Ok(Json(CreatePlaylistResponse { result, summary }))
}
