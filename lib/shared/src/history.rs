use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One scrobble reported by the history service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayEvent {
    pub artist_name: String,
    pub track_name: String,
    pub played_at: DateTime<Utc>,
}

impl PlayEvent {
    pub fn key(&self) -> TrackKey {
        TrackKey {
            artist_name: self.artist_name.clone(),
            track_name: self.track_name.clone(),
        }
    }
}

/// Deduplication key. Compared verbatim: no case folding, no trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TrackKey {
    pub artist_name: String,
    pub track_name: String,
}

impl TrackKey {
    pub fn new(artist_name: impl Into<String>, track_name: impl Into<String>) -> Self {
        Self {
            artist_name: artist_name.into(),
            track_name: track_name.into(),
        }
    }
}

impl fmt::Display for TrackKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.artist_name, self.track_name)
    }
}
