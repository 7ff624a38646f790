use serde::{Deserialize, Serialize};

use crate::history::TrackKey;

/// A search candidate returned by the streaming catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogTrack {
    pub id: String,
    pub uri: String,
    pub title: String,
    pub artists: Vec<String>,
    pub url: Option<String>,
}

/// Outcome of looking up one key. `catalog_uri` is `None` when the catalog had no match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedTrack {
    pub key: TrackKey,
    pub catalog_uri: Option<String>,
}

impl ResolvedTrack {
    pub fn is_found(&self) -> bool {
        self.catalog_uri.is_some()
    }
}
