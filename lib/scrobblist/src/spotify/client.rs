use super::models::{
    AccountsError, AddItemsRequest, ApiErrorEnvelope, CreatePlaylistRequest, PlaylistObject,
    SearchResponse, SnapshotResponse, TokenResponse, UserObject,
};
use crate::{
    error::{Result, SyncError},
    traits::{CatalogProvider, CreatedPlaylist, PlaylistSpec, TokenGrant},
};
use async_trait::async_trait;
use reqwest::{Client, Method, Proxy, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use shared::{catalog::CatalogTrack, history::TrackKey};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

pub const SCOPE: &str = "playlist-modify-public playlist-modify-private";

const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1/";
const DEFAULT_ACCOUNTS_BASE: &str = "https://accounts.spotify.com/";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct SpotifyClient {
    api_base: Url,
    accounts_base: Url,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    client: Client,
}

#[derive(Default)]
pub struct SpotifyClientBuilder {
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
    api_base: Option<String>,
    accounts_base: Option<String>,
    proxy: Option<String>,
    timeout: Option<Duration>,
}

impl SpotifyClientBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn client_id(mut self, id: &str) -> Self {
        self.client_id = Some(id.to_string());
        self
    }

    pub fn client_secret(mut self, secret: &str) -> Self {
        self.client_secret = Some(secret.to_string());
        self
    }

    pub fn redirect_uri(mut self, uri: &str) -> Self {
        self.redirect_uri = Some(uri.to_string());
        self
    }

    pub fn api_base(mut self, url: &str) -> Self {
        self.api_base = Some(url.to_string());
        self
    }

    pub fn accounts_base(mut self, url: &str) -> Self {
        self.accounts_base = Some(url.to_string());
        self
    }

    pub fn proxy(mut self, proxy_url: Option<&str>) -> Self {
        self.proxy = proxy_url.map(String::from);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<SpotifyClient> {
        let client_id = self
            .client_id
            .ok_or(SyncError::NotConfigured("Spotify client id"))?;
        let client_secret = self
            .client_secret
            .ok_or(SyncError::NotConfigured("Spotify client secret"))?;
        let redirect_uri = self
            .redirect_uri
            .ok_or(SyncError::NotConfigured("Spotify redirect URI"))?;

        let mut client = Client::builder().timeout(
            self.timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        );
        if let Some(proxy) = &self.proxy {
            info!("Routing Spotify requests through proxy");
            client = client.proxy(Proxy::all(proxy.as_str())?);
        }

        Ok(SpotifyClient {
            api_base: with_trailing_slash(self.api_base.as_deref().unwrap_or(DEFAULT_API_BASE))?,
            accounts_base: with_trailing_slash(
                self.accounts_base
                    .as_deref()
                    .unwrap_or(DEFAULT_ACCOUNTS_BASE),
            )?,
            client_id,
            client_secret,
            redirect_uri,
            client: client.build()?,
        })
    }
}

// `Url::join` drops the last path segment unless the base ends with '/'.
fn with_trailing_slash(url: &str) -> Result<Url> {
    let url = if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    };
    Ok(Url::parse(&url)?)
}

/// Search query with separate field filters, as opposed to free text.
pub(crate) fn search_query(key: &TrackKey) -> String {
    format!("track:{} artist:{}", key.track_name, key.artist_name)
}

impl SpotifyClient {
    pub fn builder() -> SpotifyClientBuilder {
        SpotifyClientBuilder::new()
    }

    /// Consent page the user visits to grant playlist access. `state` comes
    /// back unchanged on the redirect and identifies the user.
    pub fn authorize_url(&self, state: &str) -> Result<Url> {
        let base = self.accounts_base.join("authorize")?;
        Ok(Url::parse_with_params(
            base.as_str(),
            &[
                ("client_id", self.client_id.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.redirect_uri.as_str()),
                ("scope", SCOPE),
                ("state", state),
            ],
        )?)
    }

    /// Trades the code from the OAuth redirect for a token pair.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        let response = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .await?;
        response
            .into_grant(None)
            .ok_or_else(|| SyncError::Auth("no refresh token in code exchange".to_string()))
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let url = self.accounts_base.join("api/token")?;
        debug!("Request: POST {}", url);
        let response = self
            .client
            .post(url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            return Ok(serde_json::from_str(&text)?);
        }

        let message = serde_json::from_str::<AccountsError>(&text)
            .map(|e| e.error_description.unwrap_or(e.error))
            .unwrap_or(text);
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            Err(SyncError::Auth(message))
        } else {
            Err(SyncError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn make_request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query: &[(&str, &str)],
        body: Option<B>,
    ) -> Result<T> {
        let url = self.api_base.join(endpoint)?;
        debug!("Request: {} {}", method, url);
        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(access_token)
            .query(query);
        if let Some(b) = body {
            request = request.json(&b);
        }
        let response = request.send().await?;
        Self::handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            return serde_json::from_str(&text).map_err(|e| SyncError::Api {
                status: status.as_u16(),
                message: format!("JSON parse error: {e}"),
            });
        }

        let message = serde_json::from_str::<ApiErrorEnvelope>(&text)
            .map(|e| e.error.message)
            .unwrap_or(text);
        if status == StatusCode::UNAUTHORIZED {
            Err(SyncError::Auth(message))
        } else {
            Err(SyncError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl CatalogProvider for SpotifyClient {
    fn id(&self) -> &'static str {
        "spotify"
    }

    fn name(&self) -> &'static str {
        "Spotify"
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant> {
        let response = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;
        response
            .into_grant(Some(refresh_token))
            .ok_or_else(|| SyncError::Auth("empty refresh response".to_string()))
    }

    async fn current_user_id(&self, access_token: &str) -> Result<String> {
        let user: UserObject = self
            .make_request(Method::GET, "me", access_token, &[], None::<()>)
            .await?;
        Ok(user.id)
    }

    async fn search_track(
        &self,
        access_token: &str,
        key: &TrackKey,
        limit: u32,
    ) -> Result<Vec<CatalogTrack>> {
        let query = search_query(key);
        let limit = limit.to_string();
        let response: SearchResponse = self
            .make_request(
                Method::GET,
                "search",
                access_token,
                &[("q", query.as_str()), ("type", "track"), ("limit", limit.as_str())],
                None::<()>,
            )
            .await?;
        Ok(response.tracks.items.into_iter().flatten().map(Into::into).collect())
    }

    async fn create_playlist(
        &self,
        access_token: &str,
        owner_id: &str,
        spec: &PlaylistSpec,
    ) -> Result<CreatedPlaylist> {
        let endpoint = format!("users/{owner_id}/playlists");
        let body = CreatePlaylistRequest {
            name: &spec.name,
            description: &spec.description,
            public: spec.public,
        };
        let playlist: PlaylistObject = self
            .make_request(Method::POST, &endpoint, access_token, &[], Some(&body))
            .await?;

        let url = match playlist.external_urls.spotify {
            Some(url) => url,
            None => {
                warn!("Playlist {} came back without a share link", playlist.id);
                format!("https://open.spotify.com/playlist/{}", playlist.id)
            }
        };
        info!("Created playlist '{}' ({})", spec.name, playlist.id);
        Ok(CreatedPlaylist {
            id: playlist.id,
            url,
        })
    }

    async fn add_items(
        &self,
        access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<()> {
        let endpoint = format!("playlists/{playlist_id}/tracks");
        let snapshot: SnapshotResponse = self
            .make_request(
                Method::POST,
                &endpoint,
                access_token,
                &[],
                Some(&AddItemsRequest { uris }),
            )
            .await?;
        debug!(
            "Added {} items to {} (snapshot {})",
            uris.len(),
            playlist_id,
            snapshot.snapshot_id
        );
        Ok(())
    }
}
