//! Share links: creating them from a pattern+sample pair and resolving
//! them back on load.

use std::io;
use std::sync::{Arc, Mutex};

use crossterm::clipboard::CopyToClipboard;
use crossterm::execute;
use tracing::{debug, info, warn};

use crate::backend::RegexService;
use crate::error::{LabError, Result};
use crate::gate::ValidationGate;
use crate::metrics::SessionMetrics;
use crate::types::{RegexPair, ShareId, ShareLink};

/// Somewhere a created link can be copied to.
pub trait Clipboard: Send + Sync {
    /// Place text on the clipboard.
    fn copy(&self, text: &str) -> Result<()>;
}

/// Copies through the terminal with an OSC 52 escape sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalClipboard;

impl Clipboard for TerminalClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        let mut stdout = io::stdout();
        LabError::with_io_context(
            execute!(stdout, CopyToClipboard::to_clipboard_from(text)),
            "writing clipboard escape sequence",
        )
    }
}

/// Keeps the last copied text in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryClipboard {
    /// Create an empty clipboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The last copied text.
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn copy(&self, text: &str) -> Result<()> {
        *self
            .contents
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(text.to_string());
        Ok(())
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClipboard;

impl Clipboard for NoClipboard {
    fn copy(&self, _text: &str) -> Result<()> {
        Ok(())
    }
}

/// Creates and resolves share links.
pub struct ShareLinkResolver<S> {
    gate: Arc<ValidationGate<S>>,
    service: Arc<S>,
    origin: String,
    clipboard: Box<dyn Clipboard>,
    metrics: Arc<SessionMetrics>,
}

impl<S> std::fmt::Debug for ShareLinkResolver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShareLinkResolver")
            .field("origin", &self.origin)
            .finish_non_exhaustive()
    }
}

impl<S: RegexService> ShareLinkResolver<S> {
    /// Create a resolver composing links under `origin`.
    pub fn new(
        gate: Arc<ValidationGate<S>>,
        service: Arc<S>,
        origin: impl Into<String>,
        metrics: Arc<SessionMetrics>,
    ) -> Self {
        Self {
            gate,
            service,
            origin: origin.into(),
            clipboard: Box::new(NoClipboard),
            metrics,
        }
    }

    /// Copy created links to this clipboard.
    #[must_use]
    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.set_clipboard(Box::new(clipboard));
        self
    }

    /// Replace the clipboard.
    pub fn set_clipboard(&mut self, clipboard: Box<dyn Clipboard>) {
        self.clipboard = clipboard;
    }

    /// The origin links are composed under.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Store a pair with the service and return a link to it.
    ///
    /// The pattern is validated first and nothing is stored when it is
    /// rejected. The link is copied to the clipboard on a best-effort basis.
    pub async fn create_share_link(&self, pattern: &str, sample: &str) -> Result<ShareLink> {
        if !self.gate.validate(pattern).await {
            return Err(LabError::invalid_pattern(pattern));
        }

        let id = self.service.share(&RegexPair::new(pattern, sample)).await?;
        let link = ShareLink::compose(&self.origin, id);
        self.metrics.shares.inc();
        info!(share_id = %link.id, "created share link");

        if let Err(err) = self.clipboard.copy(link.as_str()) {
            warn!(error = %err, "could not copy share link to clipboard");
        }
        Ok(link)
    }

    /// Resolve a location fragment into the pair it names.
    ///
    /// A leading `#` is ignored. An empty fragment resolves to `None`
    /// without contacting the service.
    pub async fn resolve_share_link(&self, fragment: &str) -> Result<Option<RegexPair>> {
        let id = fragment.strip_prefix('#').unwrap_or(fragment);
        if id.is_empty() {
            return Ok(None);
        }

        debug!(share_id = id, "resolving share link");
        let record = self.service.resolve(&ShareId::new(id)).await?;
        Ok(Some(record))
    }
}
