//! End-to-end reconciliation: history → distinct keys → catalog matches → playlist.
//!
//! Every failure below this module is turned into a [`PipelineResult`] here;
//! raw provider errors are only logged.

use itertools::Itertools;
use shared::report::{FailureKind, PipelineResult, Provider};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    dedup,
    error::SyncError,
    history::HistorySource,
    playlist::{BuildOutcome, PlaylistBuilder},
    resolver::{self, CatalogResolver},
    services::Services,
    traits::{CatalogProvider, CredentialStore, HistoryProvider, PlaylistSpec},
    window::TimeWindow,
};

/// Unresolved keys listed in the result; the rest are only counted.
pub const NOT_FOUND_SAMPLE: usize = 10;

pub const MSG_INVALID_DATE: &str = "Error: invalid date format. Use YYYY-MM-DD, e.g. 2024-05-31.";
pub const MSG_NO_DATA: &str = "No plays found on Last.fm for the specified period.";
pub const MSG_HISTORY_DOWN: &str = "Last.fm is unreachable right now, please try again later.";
pub const MSG_CATALOG_DOWN: &str = "Spotify is unreachable right now, please try again later.";
pub const MSG_AUTH: &str =
    "Spotify authorization is missing or expired. Please log in again with /login.";
pub const MSG_STORE: &str = "Could not load your saved settings, please try again later.";
pub const MSG_NO_TRACKS: &str = "No unique tracks found to create a playlist.";
pub const MSG_NONE_MATCHED: &str = "None of the tracks were found on Spotify.";

const PLAYLIST_DESCRIPTION: &str = "All tracks from Last.fm for the specified period.";

struct StageError {
    error: SyncError,
    provider: Provider,
}

trait StageExt<T> {
    fn stage(self, provider: Provider) -> Result<T, StageError>;
}

impl<T> StageExt<T> for crate::error::Result<T> {
    fn stage(self, provider: Provider) -> Result<T, StageError> {
        self.map_err(|error| StageError { error, provider })
    }
}

pub struct ReconciliationPipeline {
    history: HistorySource,
    resolver: CatalogResolver,
    builder: PlaylistBuilder,
    catalog: Arc<dyn CatalogProvider>,
    store: Arc<dyn CredentialStore>,
}

impl ReconciliationPipeline {
    pub fn new(
        history: Arc<dyn HistoryProvider>,
        catalog: Arc<dyn CatalogProvider>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            history: HistorySource::new(history),
            resolver: CatalogResolver::new(catalog.clone(), store.clone()),
            builder: PlaylistBuilder::new(catalog.clone()),
            catalog,
            store,
        }
    }

    pub fn from_services(services: &Services) -> Self {
        Self::new(
            services.history().clone(),
            services.catalog().clone(),
            services.credentials().clone(),
        )
    }

    /// Runs one reconciliation for `owner_id` (the credential store key).
    ///
    /// `user_handle` is the history account; when blank, the handle saved for
    /// the owner is used. Dates are `YYYY-MM-DD`, both inclusive.
    pub async fn run(
        &self,
        user_handle: &str,
        owner_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> PipelineResult {
        info!(
            "Reconciliation for {} from {} to {} started",
            owner_id, start_date, end_date
        );
        match self.execute(user_handle, owner_id, start_date, end_date).await {
            Ok(result) => {
                info!(
                    "Reconciliation for {} finished: added={} not_found={} failure={:?}",
                    owner_id, result.added_count, result.not_found_count, result.failure
                );
                result
            }
            Err(StageError { error, provider }) => {
                warn!("Reconciliation for {} failed: {}", owner_id, error);
                translate(&error, provider)
            }
        }
    }

    async fn execute(
        &self,
        user_handle: &str,
        owner_id: &str,
        start_date: &str,
        end_date: &str,
    ) -> Result<PipelineResult, StageError> {
        let window = TimeWindow::from_dates(start_date, end_date).stage(Provider::History)?;

        let credentials = self
            .store
            .get(owner_id)
            .await
            .stage(Provider::Catalog)?
            .unwrap_or_default();
        let refresh_token = credentials
            .catalog_refresh_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SyncError::Auth(format!("no refresh token stored for {owner_id}")))
            .stage(Provider::Catalog)?;
        let handle = match user_handle.trim() {
            "" => credentials
                .history_handle
                .filter(|h| !h.trim().is_empty())
                .ok_or_else(|| SyncError::InvalidInput("no Last.fm nickname set".to_string()))
                .stage(Provider::History)?,
            handle => handle.to_string(),
        };

        let events = self
            .history
            .fetch_window(&handle, &window)
            .await
            .stage(Provider::History)?;

        let keys = dedup::reduce(&events);
        info!(
            "{} plays reduced to {} distinct tracks",
            events.len(),
            keys.len()
        );
        if keys.is_empty() {
            return Ok(PipelineResult::failure(FailureKind::NoMatch, MSG_NO_TRACKS));
        }

        let grant = self
            .resolver
            .authorize(owner_id, &refresh_token)
            .await
            .stage(Provider::Catalog)?;
        let resolved = self
            .resolver
            .resolve_all(&grant.access_token, &keys)
            .await
            .stage(Provider::Catalog)?;

        let (uris, missing) = resolver::partition(resolved);
        if !missing.is_empty() {
            info!(
                "Not found in catalog: {}",
                missing.iter().take(NOT_FOUND_SAMPLE).join("; ")
            );
        }
        if uris.is_empty() {
            return Ok(PipelineResult::failure(FailureKind::NoMatch, MSG_NONE_MATCHED));
        }

        let catalog_owner = self
            .catalog
            .current_user_id(&grant.access_token)
            .await
            .stage(Provider::Catalog)?;
        let spec = PlaylistSpec {
            name: playlist_name(start_date.trim(), end_date.trim()),
            description: PLAYLIST_DESCRIPTION.to_string(),
            public: false,
        };

        match self
            .builder
            .build(&grant.access_token, &catalog_owner, &spec, &uris)
            .await
            .stage(Provider::Catalog)?
        {
            BuildOutcome::Created(playlist) => Ok(PipelineResult::success(
                playlist.url,
                spec.name,
                uris.len(),
                &missing,
                NOT_FOUND_SAMPLE,
            )),
            BuildOutcome::NothingToAdd => {
                Ok(PipelineResult::failure(FailureKind::NoMatch, MSG_NONE_MATCHED))
            }
        }
    }
}

pub fn playlist_name(start_date: &str, end_date: &str) -> String {
    format!("Last.fm: {start_date} to {end_date}")
}

fn translate(error: &SyncError, provider: Provider) -> PipelineResult {
    let kind = error.kind(provider);
    let message = match (error, kind) {
        (SyncError::InvalidInput(reason), _) => format!("Error: {reason}."),
        (SyncError::UnknownUser(handle), _) => format!(
            "Error: there is no Last.fm user named '{handle}'. Check the nickname and set it again with /set_lastfm."
        ),
        (SyncError::Store(_), _) => MSG_STORE.to_string(),
        (_, FailureKind::Validation) => MSG_INVALID_DATE.to_string(),
        (_, FailureKind::NoData) => MSG_NO_DATA.to_string(),
        (_, FailureKind::Auth) => MSG_AUTH.to_string(),
        (_, FailureKind::Remote(Provider::History)) => MSG_HISTORY_DOWN.to_string(),
        (_, FailureKind::Remote(Provider::Catalog)) => MSG_CATALOG_DOWN.to_string(),
        (_, FailureKind::NoMatch) => MSG_NONE_MATCHED.to_string(),
    };
    PipelineResult::failure(kind, message)
}
