use super::models::{RecentTracksReply, RecentTracksEnvelope};
use crate::{
    error::{Result, SyncError},
    traits::{HistoryPage, HistoryProvider},
    window::TimeWindow,
};
use async_trait::async_trait;
use reqwest::{Client, Proxy};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const DEFAULT_BASE_URL: &str = "http://ws.audioscrobbler.com/2.0/";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Last.fm error code for an unknown user name.
const USER_NOT_FOUND: u32 = 6;

#[derive(Debug, Clone)]
pub struct LastFmClient {
    base_url: Url,
    api_key: String,
    client: Client,
}

#[derive(Default)]
pub struct LastFmClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    proxy: Option<String>,
    timeout: Option<Duration>,
}

impl LastFmClientBuilder {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = Some(url.to_string());
        self
    }

    pub fn api_key(mut self, key: &str) -> Self {
        self.api_key = Some(key.to_string());
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

    pub fn build(self) -> Result<LastFmClient> {
        let api_key = self
            .api_key
            .filter(|k| !k.is_empty())
            .ok_or(SyncError::NotConfigured("Last.fm API key"))?;
        let base_url = Url::parse(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;

        let mut client = Client::builder().timeout(
            self.timeout
                .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        );
        if let Some(proxy) = &self.proxy {
            info!("Routing Last.fm requests through proxy");
            client = client.proxy(Proxy::all(proxy.as_str())?);
        }

        Ok(LastFmClient {
            base_url,
            api_key,
            client: client.build()?,
        })
    }
}

impl LastFmClient {
    pub fn builder() -> LastFmClientBuilder {
        LastFmClientBuilder::new()
    }

    async fn get_recent_tracks(
        &self,
        handle: &str,
        window: &TimeWindow,
        page: u32,
        page_size: u32,
    ) -> Result<String> {
        debug!("Last.fm user.getrecenttracks user={} page={}", handle, page);
        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[
                ("method", "user.getrecenttracks"),
                ("user", handle),
                ("api_key", self.api_key.as_str()),
                ("format", "json"),
            ])
            .query(&[
                ("from", window.from_timestamp()),
                ("to", window.to_timestamp()),
                ("limit", i64::from(page_size)),
                ("page", i64::from(page)),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if status.is_success() {
            Ok(text)
        } else {
            // Last.fm usually explains 4xx replies in the same error envelope.
            let message = match serde_json::from_str::<RecentTracksReply>(&text) {
                Ok(RecentTracksReply::Error(e)) if e.error == USER_NOT_FOUND => {
                    return Err(SyncError::UnknownUser(handle.to_string()));
                }
                Ok(RecentTracksReply::Error(e)) => e.message,
                _ => text,
            };
            Err(SyncError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Decodes one `user.getrecenttracks` body into a page of play events.
pub(crate) fn parse_recent_tracks(handle: &str, body: &str) -> Result<HistoryPage> {
    let envelope: RecentTracksEnvelope = match serde_json::from_str(body)? {
        RecentTracksReply::Error(e) if e.error == USER_NOT_FOUND => {
            return Err(SyncError::UnknownUser(handle.to_string()));
        }
        RecentTracksReply::Error(e) => {
            return Err(SyncError::History(format!("{} (code {})", e.message, e.error)));
        }
        RecentTracksReply::Tracks(envelope) => envelope,
    };

    let recent = envelope.recenttracks;
    let mut events = Vec::new();
    for raw in recent.track.into_vec() {
        if let Some(event) = raw.into_event()? {
            events.push(event);
        }
    }

    Ok(HistoryPage {
        page: recent.attr.page,
        total_pages: recent.attr.total_pages,
        events,
    })
}

#[async_trait]
impl HistoryProvider for LastFmClient {
    fn id(&self) -> &'static str {
        "lastfm"
    }

    fn name(&self) -> &'static str {
        "Last.fm"
    }

    async fn fetch_page(
        &self,
        handle: &str,
        window: &TimeWindow,
        page: u32,
        page_size: u32,
    ) -> Result<HistoryPage> {
        let body = self.get_recent_tracks(handle, window, page, page_size).await?;
        parse_recent_tracks(handle, &body)
    }
}
