use shared::{catalog::ResolvedTrack, history::TrackKey};
use std::{collections::BTreeSet, sync::Arc};
use tracing::{debug, info, warn};

use crate::{
    error::Result,
    pacing::{Pacer, CATALOG_PACING},
    traits::{CatalogProvider, CredentialStore, CredentialUpdate, TokenGrant},
};

/// Looks up each distinct key in the streaming catalog.
pub struct CatalogResolver {
    catalog: Arc<dyn CatalogProvider>,
    store: Arc<dyn CredentialStore>,
}

impl CatalogResolver {
    pub fn new(catalog: Arc<dyn CatalogProvider>, store: Arc<dyn CredentialStore>) -> Self {
        Self { catalog, store }
    }

    /// Refreshes the user's access token once and writes the new grant back
    /// to the credential store. Must succeed before any search is issued.
    pub async fn authorize(&self, user_id: &str, refresh_token: &str) -> Result<TokenGrant> {
        let grant = self
            .catalog
            .refresh_access_token(refresh_token)
            .await
            .inspect_err(|e| {
                warn!("{} token refresh failed for {}: {}", self.catalog.name(), user_id, e)
            })?;

        // A lost write only costs the next run a refresh; this run already has a token.
        if let Err(e) = self.store.put(user_id, CredentialUpdate::from(&grant)).await {
            warn!("Could not persist refreshed token for {}: {}", user_id, e);
        }
        Ok(grant)
    }

    /// One search per key, first candidate wins, misses are kept as unresolved.
    ///
    /// Returns exactly one entry per input key, in the set's order. A transport
    /// or HTTP failure aborts the whole resolution.
    pub async fn resolve_all(
        &self,
        access_token: &str,
        keys: &BTreeSet<TrackKey>,
    ) -> Result<Vec<ResolvedTrack>> {
        let mut pacer = Pacer::new(CATALOG_PACING);
        let mut resolved = Vec::with_capacity(keys.len());

        info!("Resolving {} tracks against {}", keys.len(), self.catalog.name());
        for key in keys {
            pacer.wait().await;
            let candidates = self.catalog.search_track(access_token, key, 1).await?;
            let catalog_uri = candidates.into_iter().next().map(|track| track.uri);
            match &catalog_uri {
                Some(uri) => debug!("'{}' -> {}", key, uri),
                None => debug!("'{}' not found", key),
            }
            resolved.push(ResolvedTrack {
                key: key.clone(),
                catalog_uri,
            });
        }

        let found = resolved.iter().filter(|r| r.is_found()).count();
        info!("Resolved {}/{} tracks", found, resolved.len());
        Ok(resolved)
    }
}

/// Splits resolution output into catalog URIs to add and keys that had no match.
pub fn partition(resolved: Vec<ResolvedTrack>) -> (Vec<String>, Vec<TrackKey>) {
    let mut uris = Vec::new();
    let mut missing = Vec::new();
    for track in resolved {
        match track.catalog_uri {
            Some(uri) => uris.push(uri),
            None => missing.push(track.key),
        }
    }
    (uris, missing)
}
