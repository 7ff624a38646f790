use shared::history::PlayEvent;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    error::{Result, SyncError},
    pacing::{Pacer, HISTORY_PACING},
    traits::{HistoryPage, HistoryProvider},
    window::TimeWindow,
};

/// Scrobbles requested per page; the service's maximum.
pub const PAGE_SIZE: u32 = 200;

/// Walks every page of a user's history inside a time window.
pub struct HistorySource {
    provider: Arc<dyn HistoryProvider>,
}

impl HistorySource {
    pub fn new(provider: Arc<dyn HistoryProvider>) -> Self {
        Self { provider }
    }

    /// Fetches page 1, reads the declared page count, then fetches the
    /// remaining pages in order with [`HISTORY_PACING`] between requests.
    ///
    /// Any failing page aborts the whole fetch; earlier pages are dropped.
    pub async fn fetch_window(&self, handle: &str, window: &TimeWindow) -> Result<Vec<PlayEvent>> {
        let mut pacer = Pacer::new(HISTORY_PACING);

        pacer.wait().await;
        let first = self.fetch_page(handle, window, 1).await?;
        let total_pages = first.total_pages;
        if total_pages == 0 {
            info!("{} reports no plays for {} in window", self.provider.name(), handle);
            return Err(SyncError::NoData);
        }

        info!(
            "Fetching {} page(s) of {} history for {}",
            total_pages,
            self.provider.name(),
            handle
        );
        let mut events = first.events;
        for page in 2..=total_pages {
            pacer.wait().await;
            let next = self.fetch_page(handle, window, page).await?;
            events.extend(next.events);
        }

        debug!("Collected {} play events for {}", events.len(), handle);
        Ok(events)
    }

    async fn fetch_page(&self, handle: &str, window: &TimeWindow, page: u32) -> Result<HistoryPage> {
        self.provider
            .fetch_page(handle, window, page, PAGE_SIZE)
            .await
            .map_err(|e| {
                warn!("{} page {} failed: {}", self.provider.name(), page, e);
                match e {
                    SyncError::UnknownUser(_) => e,
                    e => SyncError::HistoryPage {
                        page,
                        message: e.to_string(),
                    },
                }
            })
    }
}
