use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use scrobblist::CredentialUpdate;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{server_error, AppState};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UserStatus {
    pub spotify_connected: bool,
    pub lastfm_nickname: Option<String>,
}

pub async fn status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserStatus>, (StatusCode, String)> {
    let credentials = state
        .store
        .get(&user_id)
        .await
        .map_err(server_error)?
        .unwrap_or_default();

    Ok(Json(UserStatus {
        spotify_connected: credentials.catalog_refresh_token.is_some(),
        lastfm_nickname: credentials.history_handle,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SetLastfm {
    pub nickname: String,
}

pub async fn set_lastfm(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<SetLastfm>,
) -> Result<Json<UserStatus>, (StatusCode, String)> {
    let nickname = body.nickname.trim();
    if nickname.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Please, specify your nickname on Last.fm.".to_string(),
        ));
    }

    state
        .store
        .put(
            &user_id,
            CredentialUpdate {
                history_handle: Some(nickname.to_string()),
                ..Default::default()
            },
        )
        .await
        .map_err(server_error)?;
    info!("User {} set Last.fm nickname", user_id);

    status(State(state), Path(user_id)).await
}
