use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::{
    catalog::CatalogTrack,
    history::{PlayEvent, TrackKey},
};

use crate::{error::Result, window::TimeWindow};

/// One page of scrobbles as reported by the history service.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub page: u32,
    pub total_pages: u32,
    pub events: Vec<PlayEvent>,
}

#[async_trait]
pub trait HistoryProvider: Send + Sync {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;

    async fn fetch_page(
        &self,
        handle: &str,
        window: &TimeWindow,
        page: u32,
        page_size: u32,
    ) -> Result<HistoryPage>;
}

/// Result of an OAuth code exchange or token refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlaylistSpec {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedPlaylist {
    pub id: String,
    pub url: String,
}

#[async_trait]
pub trait CatalogProvider: Send + Sync {
    fn id(&self) -> &'static str;
    fn name(&self) -> &'static str;

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant>;
    async fn current_user_id(&self, access_token: &str) -> Result<String>;

    /// Candidates in the provider's own relevance order.
    async fn search_track(
        &self,
        access_token: &str,
        key: &TrackKey,
        limit: u32,
    ) -> Result<Vec<CatalogTrack>>;

    async fn create_playlist(
        &self,
        access_token: &str,
        owner_id: &str,
        spec: &PlaylistSpec,
    ) -> Result<CreatedPlaylist>;

    async fn add_items(&self, access_token: &str, playlist_id: &str, uris: &[String])
        -> Result<()>;
}

/// The two opaque fields kept per user, plus the current access token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserCredentials {
    pub catalog_refresh_token: Option<String>,
    pub catalog_access_token: Option<String>,
    pub history_handle: Option<String>,
}

/// Partial upsert: `None` fields leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CredentialUpdate {
    pub catalog_refresh_token: Option<String>,
    pub catalog_access_token: Option<String>,
    pub history_handle: Option<String>,
}

impl From<&TokenGrant> for CredentialUpdate {
    fn from(grant: &TokenGrant) -> Self {
        Self {
            catalog_refresh_token: Some(grant.refresh_token.clone()),
            catalog_access_token: Some(grant.access_token.clone()),
            history_handle: None,
        }
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<UserCredentials>>;
    async fn put(&self, user_id: &str, update: CredentialUpdate) -> Result<()>;
}
