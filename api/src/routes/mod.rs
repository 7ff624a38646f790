use axum::{
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use scrobblist::{spotify::SpotifyClient, CredentialStore, ReconciliationPipeline};
use std::sync::Arc;
use tracing::error;

pub mod auth;
pub mod playlist;
pub mod user;

#[derive(Clone)]
pub struct AppState {
    pub spotify: Arc<SpotifyClient>,
    pub store: Arc<dyn CredentialStore>,
    pub pipeline: Arc<ReconciliationPipeline>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/login/{user_id}", get(auth::login))
        .route("/callback", get(auth::callback))
        .route("/users/{user_id}", get(user::status))
        .route("/users/{user_id}/lastfm", put(user::set_lastfm))
        .route("/users/{user_id}/playlists", post(playlist::create_playlist))
        .with_state(state)
}

pub fn server_error<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    error!("Request failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Something went wrong, please try again later.".to_string(),
    )
}
