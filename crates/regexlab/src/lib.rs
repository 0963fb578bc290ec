//! regexlab: a client for testing regular expressions against a remote
//! evaluation service.
//!
//! A session lets a user edit a pattern and a sample text, validate the
//! pattern, run it against the sample, and see the matches together with
//! ready-to-paste construction snippets for JavaScript, Rust, Java, Go and
//! Python. Patterns can be saved locally, exported as JSON, and shared
//! through short links that another session can load.
//!
//! # Features
//!
//! - **Async-first design** with the Tokio runtime
//! - **Last-issued-wins ordering** for validations and evaluations
//! - **Code generation** for five target ecosystems
//! - **HTTP backend** for the remote JSON API (feature: `http`)
//! - **Local backend** backed by the `regex` crate
//! - **Mock backend** for testing (feature: `mock`)
//!
//! # Example
//!
//! ```rust
//! use regexlab::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<()> {
//! let session = EvaluationSession::new(LocalService::new());
//! session.set_pattern(r"\d+").await;
//! session.set_sample("a12b345");
//!
//! let evaluation = session.run().await?;
//! assert_eq!(evaluation.match_count(), 2);
//! assert_eq!(
//!     evaluation.conversions.get(Target::JavaScript, Variant::Global),
//!     Some(r"/\d+/g"),
//! );
//! # Ok(())
//! # }
//! ```

// Core types
pub mod config;
pub mod convert;
pub mod error;
pub mod prelude;
pub mod types;

// Service and session layers
pub mod backend;
pub mod gate;
pub mod session;
pub mod share;
pub mod store;

// Ambient
pub mod logging;
pub mod metrics;

/// Mock backend for testing.
#[cfg(feature = "mock")]
pub mod mock;

#[cfg(feature = "http")]
pub use backend::HttpService;
pub use backend::{BackendType, LocalService, RegexService};
pub use config::{LabConfig, LogFormat, LoggingConfig, ServiceConfig, ShareConfig, StorageConfig};
pub use convert::{ConversionTable, Target, Variant, convert};
pub use error::{FailureKind, LabError, Operation, Result};
pub use gate::{Validation, ValidationGate};
pub use logging::init_logging;
pub use metrics::{MetricsSnapshot, SessionMetrics};
pub use session::{Evaluation, EvaluationSession, SessionBuilder, SessionState};
pub use share::{Clipboard, MemoryClipboard, NoClipboard, ShareLinkResolver, TerminalClipboard};
pub use store::{EXPORT_FILE_NAME, FileStorage, MemoryStorage, SavedStore, Storage};
pub use types::{
    MatchSet, RegexPair, SavedEntry, ShareId, ShareLink, ShareRecord, ValidationState,
    fragment_of,
};
