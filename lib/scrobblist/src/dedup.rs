use shared::history::{PlayEvent, TrackKey};
use std::collections::BTreeSet;

/// Distinct (artist, title) pairs among `events`.
///
/// The result is ordered, so every later stage visits keys in the same order
/// for the same input.
pub fn reduce<'a>(events: impl IntoIterator<Item = &'a PlayEvent>) -> BTreeSet<TrackKey> {
    events.into_iter().map(PlayEvent::key).collect()
}
