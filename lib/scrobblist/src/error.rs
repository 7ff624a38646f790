use shared::report::{FailureKind, Provider};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Last.fm error: {0}")]
    History(String),

    #[error("Last.fm page {page} failed: {message}")]
    HistoryPage { page: u32, message: String },

    #[error("Last.fm user '{0}' does not exist")]
    UnknownUser(String),

    #[error("No plays found in the requested window")]
    NoData,

    #[error("Authorization failed: {0}")]
    Auth(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Client not configured: {0}")]
    NotConfigured(&'static str),

    #[error("Credential store error: {0}")]
    Store(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl SyncError {
    /// Maps the error onto the user-visible taxonomy. `provider` tags transport
    /// failures whose origin is only known by the caller.
    pub fn kind(&self, provider: Provider) -> FailureKind {
        match self {
            SyncError::InvalidDate(_) | SyncError::InvalidInput(_) | SyncError::UnknownUser(_) => {
                FailureKind::Validation
            }
            SyncError::NoData => FailureKind::NoData,
            SyncError::Auth(_) => FailureKind::Auth,
            SyncError::History(_) | SyncError::HistoryPage { .. } => {
                FailureKind::Remote(Provider::History)
            }
            SyncError::Api { .. }
            | SyncError::NotConfigured(_)
            | SyncError::Store(_)
            | SyncError::Request(_)
            | SyncError::Url(_)
            | SyncError::Json(_) => FailureKind::Remote(provider),
        }
    }
}
