use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use scrobblist::CredentialUpdate;
use serde::Deserialize;
use tracing::{error, info};

use super::{server_error, AppState};

const AUTH_FAILED: &str = "An authorization error occurred. Please try again.";
const EXCHANGE_FAILED: &str = "A critical error occurred while retrieving the token.";

const SUCCESS_PAGE: &str = r#"<html>
    <head><title>Success!</title></head>
    <body style="font-family: sans-serif; text-align: center; padding-top: 50px;">
        <h1>Authorization successful!</h1>
        <p>You can close this page. Set your Last.fm nickname if you haven't already.</p>
    </body>
</html>"#;

/// Sends the user to the Spotify consent page; `user_id` rides along as OAuth state.
pub async fn login(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Redirect, (StatusCode, String)> {
    let url = state.spotify.authorize_url(&user_id).map_err(server_error)?;
    Ok(Redirect::to(url.as_str()))
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    let (code, user_id) = match (params.code, params.state, params.error) {
        (Some(code), Some(user_id), None) if !code.is_empty() && !user_id.is_empty() => {
            (code, user_id)
        }
        (_, user_id, error) => {
            error!(
                "Authorization error or missing parameters: error={:?}, state={:?}",
                error, user_id
            );
            return (StatusCode::BAD_REQUEST, AUTH_FAILED).into_response();
        }
    };

    let grant = match state.spotify.exchange_code(&code).await {
        Ok(grant) => grant,
        Err(e) => {
            error!("Failed to get token for user {}: {}", user_id, e);
            return (StatusCode::INTERNAL_SERVER_ERROR, EXCHANGE_FAILED).into_response();
        }
    };

    if let Err(e) = state
        .store
        .put(&user_id, CredentialUpdate::from(&grant))
        .await
    {
        return server_error(e).into_response();
    }

    info!("User {} connected Spotify", user_id);
    Html(SUCCESS_PAGE).into_response()
}
