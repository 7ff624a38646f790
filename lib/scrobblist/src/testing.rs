//! In-memory providers that record every call, for driving the pipeline in tests.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use shared::{
    catalog::CatalogTrack,
    history::{PlayEvent, TrackKey},
};
use std::{
    collections::HashMap,
    sync::Mutex,
};
use tokio::time::Instant;

use crate::{
    error::{Result, SyncError},
    traits::{
        CatalogProvider, CreatedPlaylist, CredentialStore, CredentialUpdate, HistoryPage,
        HistoryProvider, PlaylistSpec, TokenGrant, UserCredentials,
    },
    window::TimeWindow,
};

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn serve(app: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}/")
}

pub fn event(artist: &str, title: &str) -> PlayEvent {
    PlayEvent {
        artist_name: artist.to_string(),
        track_name: title.to_string(),
        played_at: Utc.timestamp_opt(1_704_067_300, 0).unwrap(),
    }
}

pub fn window() -> TimeWindow {
    TimeWindow::from_dates("2024-01-01", "2024-01-31").unwrap()
}

pub struct FakeHistory {
    pages: Vec<Vec<PlayEvent>>,
    declared_total: u32,
    failing_page: Option<u32>,
    unknown_user: bool,
    pub calls: Mutex<Vec<(u32, Instant)>>,
}

impl FakeHistory {
    pub fn new(pages: Vec<Vec<PlayEvent>>) -> Self {
        let declared_total = pages.len() as u32;
        Self {
            pages,
            declared_total,
            failing_page: None,
            unknown_user: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn failing_on(mut self, page: u32) -> Self {
        self.failing_page = Some(page);
        self
    }

    /// Every request answers as if the handle does not exist.
    pub fn unknown_user(mut self) -> Self {
        self.unknown_user = true;
        self
    }

    pub fn requested_pages(&self) -> Vec<u32> {
        self.calls.lock().unwrap().iter().map(|(p, _)| *p).collect()
    }
}

#[async_trait]
impl HistoryProvider for FakeHistory {
    fn id(&self) -> &'static str {
        "fake-history"
    }

    fn name(&self) -> &'static str {
        "Fake history"
    }

    async fn fetch_page(
        &self,
        handle: &str,
        _window: &TimeWindow,
        page: u32,
        _page_size: u32,
    ) -> Result<HistoryPage> {
        self.calls.lock().unwrap().push((page, Instant::now()));
        if self.unknown_user {
            return Err(SyncError::UnknownUser(handle.to_string()));
        }
        if self.failing_page == Some(page) {
            return Err(SyncError::Api {
                status: 500,
                message: "Internal Server Error".to_string(),
            });
        }
        let events = self
            .pages
            .get(page.saturating_sub(1) as usize)
            .cloned()
            .unwrap_or_default();
        Ok(HistoryPage {
            page,
            total_pages: self.declared_total,
            events,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogCall {
    Refresh(String),
    CurrentUser,
    Search(TrackKey, Instant),
    Create(String, String),
    Add(String, Vec<String>),
}

#[derive(Default)]
pub struct FakeCatalog {
    matches: HashMap<TrackKey, String>,
    reject_refresh: bool,
    failing_search: Option<TrackKey>,
    failing_batch: Option<usize>,
    pub calls: Mutex<Vec<CatalogCall>>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_match(mut self, artist: &str, title: &str, uri: &str) -> Self {
        self.matches
            .insert(TrackKey::new(artist, title), uri.to_string());
        self
    }

    pub fn rejecting_refresh(mut self) -> Self {
        self.reject_refresh = true;
        self
    }

    pub fn failing_search_for(mut self, artist: &str, title: &str) -> Self {
        self.failing_search = Some(TrackKey::new(artist, title));
        self
    }

    /// Zero-based index of the add-items call that fails.
    pub fn failing_batch(mut self, index: usize) -> Self {
        self.failing_batch = Some(index);
        self
    }

    pub fn calls(&self) -> Vec<CatalogCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<TrackKey> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                CatalogCall::Search(key, _) => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn created(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                CatalogCall::Create(_, name) => Some(name),
                _ => None,
            })
            .collect()
    }

    pub fn batches(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                CatalogCall::Add(_, uris) => Some(uris),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl CatalogProvider for FakeCatalog {
    fn id(&self) -> &'static str {
        "fake-catalog"
    }

    fn name(&self) -> &'static str {
        "Fake catalog"
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant> {
        self.calls
            .lock()
            .unwrap()
            .push(CatalogCall::Refresh(refresh_token.to_string()));
        if self.reject_refresh {
            return Err(SyncError::Auth("invalid_grant".to_string()));
        }
        Ok(TokenGrant {
            access_token: "fresh-access".to_string(),
            refresh_token: refresh_token.to_string(),
            expires_in: Some(3600),
            scope: None,
        })
    }

    async fn current_user_id(&self, _access_token: &str) -> Result<String> {
        self.calls.lock().unwrap().push(CatalogCall::CurrentUser);
        Ok("spotify-user".to_string())
    }

    async fn search_track(
        &self,
        _access_token: &str,
        key: &TrackKey,
        limit: u32,
    ) -> Result<Vec<CatalogTrack>> {
        assert_eq!(limit, 1);
        self.calls
            .lock()
            .unwrap()
            .push(CatalogCall::Search(key.clone(), Instant::now()));
        if self.failing_search.as_ref() == Some(key) {
            return Err(SyncError::Api {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }
        Ok(self
            .matches
            .get(key)
            .map(|uri| CatalogTrack {
                id: uri.rsplit(':').next().unwrap_or_default().to_string(),
                uri: uri.clone(),
                title: key.track_name.clone(),
                artists: vec![key.artist_name.clone()],
                url: None,
            })
            .into_iter()
            .collect())
    }

    async fn create_playlist(
        &self,
        _access_token: &str,
        owner_id: &str,
        spec: &PlaylistSpec,
    ) -> Result<CreatedPlaylist> {
        self.calls
            .lock()
            .unwrap()
            .push(CatalogCall::Create(owner_id.to_string(), spec.name.clone()));
        Ok(CreatedPlaylist {
            id: "pl1".to_string(),
            url: "https://open.spotify.com/playlist/pl1".to_string(),
        })
    }

    async fn add_items(
        &self,
        _access_token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<()> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(CatalogCall::Add(playlist_id.to_string(), uris.to_vec()));
            calls
                .iter()
                .filter(|c| matches!(c, CatalogCall::Add(..)))
                .count()
                - 1
        };
        if self.failing_batch == Some(index) {
            return Err(SyncError::Api {
                status: 500,
                message: "add failed".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<String, UserCredentials>>,
}

impl MemoryStore {
    pub fn with_user(user_id: &str, refresh_token: Option<&str>, handle: Option<&str>) -> Self {
        let store = Self::default();
        store.rows.lock().unwrap().insert(
            user_id.to_string(),
            UserCredentials {
                catalog_refresh_token: refresh_token.map(String::from),
                catalog_access_token: None,
                history_handle: handle.map(String::from),
            },
        );
        store
    }

    pub fn row(&self, user_id: &str) -> Option<UserCredentials> {
        self.rows.lock().unwrap().get(user_id).cloned()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get(&self, user_id: &str) -> Result<Option<UserCredentials>> {
        Ok(self.row(user_id))
    }

    async fn put(&self, user_id: &str, update: CredentialUpdate) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows.entry(user_id.to_string()).or_default();
        if let Some(token) = update.catalog_refresh_token {
            row.catalog_refresh_token = Some(token);
        }
        if let Some(token) = update.catalog_access_token {
            row.catalog_access_token = Some(token);
        }
        if let Some(handle) = update.history_handle {
            row.history_handle = Some(handle);
        }
        Ok(())
    }
}
