use serde::{Deserialize, Serialize};
use shared::catalog::CatalogTrack;

use crate::traits::TokenGrant;

#[derive(Deserialize, Debug)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub scope: Option<String>,
    pub expires_in: Option<u64>,
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    /// Spotify only sometimes rotates the refresh token; keep `previous` otherwise.
    pub fn into_grant(self, previous: Option<&str>) -> Option<TokenGrant> {
        let refresh_token = self.refresh_token.or_else(|| previous.map(String::from))?;
        Some(TokenGrant {
            access_token: self.access_token,
            refresh_token,
            expires_in: self.expires_in,
            scope: self.scope,
        })
    }
}

/// Error body of the accounts service (`/api/token`).
#[derive(Deserialize, Debug)]
pub(crate) struct AccountsError {
    pub error: String,
    pub error_description: Option<String>,
}

/// Error body of the Web API.
#[derive(Deserialize, Debug)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiError,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ApiError {
    pub message: String,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ArtistObject {
    pub name: String,
}

#[derive(Deserialize, Debug)]
pub(crate) struct TrackObject {
    pub id: String,
    pub uri: String,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<ArtistObject>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

impl From<TrackObject> for CatalogTrack {
    fn from(track: TrackObject) -> Self {
        CatalogTrack {
            id: track.id,
            uri: track.uri,
            title: track.name,
            artists: track.artists.into_iter().map(|a| a.name).collect(),
            url: track.external_urls.spotify,
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub(crate) struct Paging<T> {
    /// Spotify occasionally returns `null` in place of an unavailable item.
    #[serde(default)]
    pub items: Vec<Option<T>>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct SearchResponse {
    pub tracks: Paging<TrackObject>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct UserObject {
    pub id: String,
}

#[derive(Deserialize, Debug)]
pub(crate) struct PlaylistObject {
    pub id: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Serialize, Debug)]
pub(crate) struct CreatePlaylistRequest<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub public: bool,
}

#[derive(Serialize, Debug)]
pub(crate) struct AddItemsRequest<'a> {
    pub uris: &'a [String],
}

#[derive(Deserialize, Debug)]
pub(crate) struct SnapshotResponse {
    pub snapshot_id: String,
}
