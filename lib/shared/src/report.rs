use serde::{Deserialize, Serialize};

use crate::history::TrackKey;

/// Which third party a remote failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    History,
    Catalog,
}

/// The user-visible failure taxonomy of a reconciliation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Validation,
    NoData,
    Remote(Provider),
    Auth,
    NoMatch,
}

/// Terminal outcome of one run, returned exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub created_playlist_url: Option<String>,
    pub playlist_name: Option<String>,
    pub added_count: usize,
    pub not_found_count: usize,
    pub not_found_sample: Vec<TrackKey>,
    pub error_message: Option<String>,
    pub failure: Option<FailureKind>,
}

impl PipelineResult {
    pub fn success(
        playlist_url: String,
        playlist_name: String,
        added_count: usize,
        not_found: &[TrackKey],
        sample_size: usize,
    ) -> Self {
        Self {
            created_playlist_url: Some(playlist_url),
            playlist_name: Some(playlist_name),
            added_count,
            not_found_count: not_found.len(),
            not_found_sample: not_found.iter().take(sample_size).cloned().collect(),
            error_message: None,
            failure: None,
        }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            created_playlist_url: None,
            playlist_name: None,
            added_count: 0,
            not_found_count: 0,
            not_found_sample: Vec::new(),
            error_message: Some(message.into()),
            failure: Some(kind),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Free text shown to the user once the run is over.
    pub fn summary(&self) -> String {
        if let Some(message) = &self.error_message {
            return message.clone();
        }

        let mut text = format!(
            "✅ Playlist '{}' successfully created!\nLink: {}\nFound and added: {} tracks.\nNot found on Spotify: {} tracks.",
            self.playlist_name.as_deref().unwrap_or_default(),
            self.created_playlist_url.as_deref().unwrap_or_default(),
            self.added_count,
            self.not_found_count,
        );
        if !self.not_found_sample.is_empty() {
            text.push_str("\nSome of the missing tracks:");
            for key in &self.not_found_sample {
                text.push_str("\n• ");
                text.push_str(&key.to_string());
            }
            if self.not_found_count > self.not_found_sample.len() {
                text.push_str(&format!(
                    "\n…and {} more.",
                    self.not_found_count - self.not_found_sample.len()
                ));
            }
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_bounds_the_sample() {
        let missing: Vec<TrackKey> = (0..15)
            .map(|i| TrackKey::new("Artist", format!("Song {i}")))
            .collect();
        let result = PipelineResult::success(
            "https://open.spotify.com/playlist/abc".to_string(),
            "Last.fm: 2024-01-01 to 2024-01-31".to_string(),
            3,
            &missing,
            10,
        );

        assert_eq!(result.not_found_count, 15);
        assert_eq!(result.not_found_sample.len(), 10);
        assert_eq!(result.not_found_sample[0], TrackKey::new("Artist", "Song 0"));
        assert!(result.is_success());
        assert!(result.summary().contains("…and 5 more."));
    }

    #[test]
    fn failure_leaves_counts_empty() {
        let result = PipelineResult::failure(FailureKind::NoData, "nothing here");
        assert_eq!(result.created_playlist_url, None);
        assert_eq!(result.added_count, 0);
        assert_eq!(result.not_found_count, 0);
        assert_eq!(result.summary(), "nothing here");
        assert!(!result.is_success());
    }

    #[test]
    fn summary_lists_link_and_counts() {
        let result = PipelineResult::success(
            "https://open.spotify.com/playlist/abc".to_string(),
            "Mix".to_string(),
            2,
            &[TrackKey::new("Artist Z", "Song C")],
            10,
        );
        let text = result.summary();
        assert!(text.contains("'Mix'"));
        assert!(text.contains("Link: https://open.spotify.com/playlist/abc"));
        assert!(text.contains("Found and added: 2 tracks."));
        assert!(text.contains("Not found on Spotify: 1 tracks."));
        assert!(text.contains("• Artist Z - Song C"));
        assert!(!text.contains("more."));
    }

    #[test]
    fn failure_kind_serializes_provider() {
        let json = serde_json::to_string(&FailureKind::Remote(Provider::History)).unwrap();
        assert_eq!(json, r#"{"remote":"history"}"#);
    }
}
