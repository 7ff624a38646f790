use std::sync::Arc;
use tracing::{error, info};

use crate::{
    error::Result,
    traits::{CatalogProvider, CreatedPlaylist, PlaylistSpec},
};

/// Most items the catalog accepts in one add call.
pub const BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub enum BuildOutcome {
    Created(CreatedPlaylist),
    /// Nothing was resolved, so no playlist was created.
    NothingToAdd,
}

pub struct PlaylistBuilder {
    catalog: Arc<dyn CatalogProvider>,
}

impl PlaylistBuilder {
    pub fn new(catalog: Arc<dyn CatalogProvider>) -> Self {
        Self { catalog }
    }

    /// Creates one playlist and appends `uris` in order, [`BATCH_SIZE`] per call.
    ///
    /// If an add call fails the playlist is left in place, partially filled,
    /// and the error is returned.
    pub async fn build(
        &self,
        access_token: &str,
        owner_id: &str,
        spec: &PlaylistSpec,
        uris: &[String],
    ) -> Result<BuildOutcome> {
        if uris.is_empty() {
            info!("No resolved items, skipping playlist '{}'", spec.name);
            return Ok(BuildOutcome::NothingToAdd);
        }

        let playlist = self
            .catalog
            .create_playlist(access_token, owner_id, spec)
            .await?;

        for (index, batch) in uris.chunks(BATCH_SIZE).enumerate() {
            if let Err(e) = self
                .catalog
                .add_items(access_token, &playlist.id, batch)
                .await
            {
                error!(
                    "Adding batch {} to playlist {} failed, playlist left with {} of {} items: {}",
                    index + 1,
                    playlist.id,
                    index * BATCH_SIZE,
                    uris.len(),
                    e
                );
                return Err(e);
            }
        }

        info!("Playlist {} filled with {} items", playlist.id, uris.len());
        Ok(BuildOutcome::Created(playlist))
    }
}
