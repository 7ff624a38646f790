use std::sync::Arc;
use tracing::info;

use crate::{CatalogProvider, CredentialStore, HistoryProvider};

/// The collaborators one deployment runs the pipeline against.
pub struct Services {
    history: Arc<dyn HistoryProvider>,
    catalog: Arc<dyn CatalogProvider>,
    credentials: Arc<dyn CredentialStore>,
}

impl Services {
    pub fn history(&self) -> &Arc<dyn HistoryProvider> {
        &self.history
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogProvider> {
        &self.catalog
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }
}

#[derive(Default)]
pub struct ServicesBuilder {
    history: Option<Arc<dyn HistoryProvider>>,
    catalog: Option<Arc<dyn CatalogProvider>>,
    credentials: Option<Arc<dyn CredentialStore>>,
}

impl ServicesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(mut self, provider: Arc<dyn HistoryProvider>) -> Self {
        self.history = Some(provider);
        self
    }

    pub fn catalog(mut self, provider: Arc<dyn CatalogProvider>) -> Self {
        self.catalog = Some(provider);
        self
    }

    pub fn credential_store(mut self, store: Arc<dyn CredentialStore>) -> Self {
        self.credentials = Some(store);
        self
    }

    pub fn build(self) -> Result<Services, &'static str> {
        let history = self.history.ok_or("a history provider is required")?;
        let catalog = self.catalog.ok_or("a catalog provider is required")?;
        let credentials = self.credentials.ok_or("a credential store is required")?;

        info!("Services ready: history={} catalog={}", history.id(), catalog.id());
        Ok(Services {
            history,
            catalog,
            credentials,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeCatalog, FakeHistory, MemoryStore};

    #[test]
    fn holds_the_registered_collaborators() {
        let services = ServicesBuilder::new()
            .history(Arc::new(FakeHistory::empty()))
            .catalog(Arc::new(FakeCatalog::new()))
            .credential_store(Arc::new(MemoryStore::default()))
            .build()
            .unwrap();

        assert_eq!(services.history().id(), "fake-history");
        assert_eq!(services.catalog().id(), "fake-catalog");
    }

    #[test]
    fn build_names_the_missing_collaborator() {
        let missing_store = ServicesBuilder::new()
            .history(Arc::new(FakeHistory::empty()))
            .catalog(Arc::new(FakeCatalog::new()))
            .build();
        assert_eq!(missing_store.err(), Some("a credential store is required"));

        let missing_catalog = ServicesBuilder::new()
            .history(Arc::new(FakeHistory::empty()))
            .build();
        assert_eq!(missing_catalog.err(), Some("a catalog provider is required"));
    }
}
