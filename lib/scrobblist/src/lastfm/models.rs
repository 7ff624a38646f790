use chrono::{TimeZone, Utc};
use serde::{Deserialize, Deserializer};
use shared::history::PlayEvent;

use crate::error::{Result, SyncError};

// Raw `user.getrecenttracks` payloads. Last.fm encodes numbers as strings and
// collapses single-element lists into a bare object.

#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub(crate) enum RecentTracksReply {
    Error(ErrorReply),
    Tracks(RecentTracksEnvelope),
}

#[derive(Deserialize, Debug)]
pub(crate) struct ErrorReply {
    pub error: u32,
    pub message: String,
}

#[derive(Deserialize, Debug)]
pub(crate) struct RecentTracksEnvelope {
    pub recenttracks: RecentTracks,
}

#[derive(Deserialize, Debug)]
pub(crate) struct RecentTracks {
    #[serde(default)]
    pub track: OneOrMany<RawTrack>,
    #[serde(rename = "@attr")]
    pub attr: PageAttr,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PageAttr {
    #[serde(deserialize_with = "number_or_string")]
    pub page: u32,
    #[serde(deserialize_with = "number_or_string")]
    pub total_pages: u32,
}

#[derive(Deserialize, Debug)]
pub(crate) struct TextField {
    #[serde(rename = "#text")]
    pub text: String,
}

#[derive(Deserialize, Debug)]
pub(crate) struct RawDate {
    pub uts: String,
}

#[derive(Deserialize, Debug)]
pub(crate) struct RawTrack {
    pub artist: TextField,
    pub name: String,
    pub date: Option<RawDate>,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> Default for OneOrMany<T> {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

impl RawTrack {
    /// `None` for the now-playing entry, which has no scrobble date yet.
    pub fn into_event(self) -> Result<Option<PlayEvent>> {
        let Some(date) = self.date else {
            return Ok(None);
        };
        let seconds: i64 = date
            .uts
            .parse()
            .map_err(|_| SyncError::History(format!("malformed timestamp '{}'", date.uts)))?;
        let played_at = Utc
            .timestamp_opt(seconds, 0)
            .single()
            .ok_or_else(|| SyncError::History(format!("timestamp out of range: {seconds}")))?;

        Ok(Some(PlayEvent {
            artist_name: self.artist.text,
            track_name: self.name,
            played_at,
        }))
    }
}

fn number_or_string<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
