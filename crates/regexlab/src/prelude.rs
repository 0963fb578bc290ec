//! Convenient re-exports for common regexlab usage.
//!
//! ```rust
//! use regexlab::prelude::*;
//!
//! let table = convert(r"\d+");
//! assert_eq!(table.get(Target::Go, Variant::Standard), Some(r"regexp.MustCompile(`\d+`)"));
//! ```

// Configuration
pub use crate::config::{LabConfig, LogFormat, LoggingConfig, ServiceConfig, ShareConfig, StorageConfig};

// Error handling
pub use crate::error::{FailureKind, LabError, Operation, Result};

// Common types
pub use crate::types::{MatchSet, RegexPair, SavedEntry, ShareId, ShareLink, ValidationState};

// Conversion
pub use crate::convert::{ConversionTable, Target, Variant, convert};

// Service backends
#[cfg(feature = "http")]
pub use crate::backend::HttpService;
pub use crate::backend::{BackendType, LocalService, RegexService};

// Session types
pub use crate::gate::ValidationGate;
pub use crate::session::{Evaluation, EvaluationSession, SessionBuilder};
pub use crate::share::{Clipboard, MemoryClipboard, NoClipboard, ShareLinkResolver, TerminalClipboard};
pub use crate::store::{FileStorage, MemoryStorage, SavedStore, Storage};
