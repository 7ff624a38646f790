pub mod dedup;
pub mod error;
pub mod history;
pub mod lastfm;
pub mod pacing;
pub mod pipeline;
pub mod playlist;
pub mod resolver;
pub mod services;
pub mod spotify;
pub mod traits;
pub mod window;

#[cfg(test)]
mod testing;

pub use pipeline::ReconciliationPipeline;
pub use services::{Services, ServicesBuilder};
pub use traits::{
    CatalogProvider, CreatedPlaylist, CredentialStore, CredentialUpdate, HistoryPage,
    HistoryProvider, PlaylistSpec, TokenGrant, UserCredentials,
};
