//! Builder for sessions with custom configuration.

use std::sync::Arc;

use super::EvaluationSession;
use crate::backend::RegexService;
use crate::config::{LabConfig, ShareConfig, StorageConfig};
use crate::error::Result;
use crate::gate::ValidationGate;
use crate::metrics::SessionMetrics;
use crate::share::{Clipboard, NoClipboard, ShareLinkResolver, TerminalClipboard};
use crate::store::SavedStore;

/// Builder for creating evaluation sessions.
pub struct SessionBuilder<S> {
    service: S,
    share: ShareConfig,
    storage: StorageConfig,
    store: Option<SavedStore>,
    clipboard: Option<Box<dyn Clipboard>>,
}

impl<S> std::fmt::Debug for SessionBuilder<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionBuilder")
            .field("share", &self.share)
            .field("storage", &self.storage)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

impl<S: RegexService> SessionBuilder<S> {
    /// Create a builder with default configuration.
    #[must_use]
    pub fn new(service: S) -> Self {
        Self {
            service,
            share: ShareConfig::default(),
            storage: StorageConfig::default(),
            store: None,
            clipboard: None,
        }
    }

    /// Take share and storage settings from a configuration.
    #[must_use]
    pub fn config(mut self, config: &LabConfig) -> Self {
        self.share = config.share.clone();
        self.storage = config.storage.clone();
        self
    }

    /// Set the origin share links are composed under.
    #[must_use]
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.share.origin = origin.into();
        self
    }

    /// Set where saved entries are stored.
    #[must_use]
    pub fn storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    /// Use an already loaded saved-entry list.
    #[must_use]
    pub fn store(mut self, store: SavedStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Copy created share links to this clipboard.
    #[must_use]
    pub fn clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Some(Box::new(clipboard));
        self
    }

    /// Build the session.
    ///
    /// Without an explicit clipboard, links go to the terminal clipboard
    /// when the share settings ask for it.
    pub fn build(self) -> Result<EvaluationSession<S>> {
        let store = match self.store {
            Some(store) => store,
            None => SavedStore::from_config(&self.storage)?,
        };
        let clipboard: Box<dyn Clipboard> = match self.clipboard {
            Some(clipboard) => clipboard,
            None if self.share.copy_to_clipboard => Box::new(TerminalClipboard),
            None => Box::new(NoClipboard),
        };

        let service = Arc::new(self.service);
        let metrics = Arc::new(SessionMetrics::new());
        let gate = Arc::new(ValidationGate::with_metrics(
            Arc::clone(&service),
            Arc::clone(&metrics),
        ));
        let mut resolver = ShareLinkResolver::new(
            Arc::clone(&gate),
            Arc::clone(&service),
            self.share.origin,
            Arc::clone(&metrics),
        );
        resolver.set_clipboard(clipboard);

        Ok(EvaluationSession::from_parts(
            service, gate, resolver, store, metrics,
        ))
    }

    /// Build the session and seed it from a share link fragment.
    ///
    /// A missing or unresolvable fragment leaves the session empty.
    pub async fn load(self, fragment: &str) -> Result<EvaluationSession<S>> {
        let session = self.build()?;
        session.load_fragment(fragment).await;
        Ok(session)
    }
}

#[cfg(feature = "http")]
impl SessionBuilder<crate::backend::HttpService> {
    /// Create a builder for the remote service described by a configuration.
    pub fn from_config(config: &LabConfig) -> Result<Self> {
        let service = crate::backend::HttpService::new(&config.service)?;
        Ok(Self::new(service).config(config))
    }
}
